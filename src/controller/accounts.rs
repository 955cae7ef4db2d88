use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, get, post, web, HttpResponse, Responder};

use anyhow::Context;

use secrecy::{ExposeSecret, Secret};

use serde::Deserialize;

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::{hash_password, Administrator};
use crate::domain::Role;
use crate::error::{RestError, RestResult};
use crate::repo::{AccountRepo, NewAccount};
use crate::telemetry::spawn_blocking_with_tracing;

const MIN_PASSWORD_LEN: usize = 8;

/// Check a raw password against the storage rules
pub(crate) fn validate_new_password(
    password: &Secret<String>,
    confirmation: &Secret<String>,
) -> Result<(), String> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "password: must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if password.expose_secret() != confirmation.expose_secret() {
        return Err("password: passwords do not match".into());
    }
    Ok(())
}

/// JSON deserialization wrapper for parsing new staff accounts
#[derive(Debug, Deserialize)]
pub struct CreateAccountBody {
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    password: Secret<String>,
    password_confirm: Secret<String>,
}

/// Create a new staff account
#[tracing::instrument(name = "Create a staff account", skip(admin, pool, body))]
#[post("")]
async fn create(
    admin: Administrator, // Administrator guard
    pool: web::Data<PgPool>,
    body: web::Json<CreateAccountBody>,
) -> RestResult<impl Responder> {
    let body = body.into_inner();

    let email = body
        .email
        .parse()
        .map_err(|e| RestError::ParseError(format!("email: {}", e)))?;
    let first_name = body
        .first_name
        .parse()
        .map_err(|e| RestError::ParseError(format!("first_name: {}", e)))?;
    let last_name = body
        .last_name
        .parse()
        .map_err(|e| RestError::ParseError(format!("last_name: {}", e)))?;
    let role: Role = body
        .role
        .parse()
        .map_err(|e| RestError::ParseError(format!("role: {}", e)))?;

    validate_new_password(&body.password, &body.password_confirm)
        .map_err(RestError::ParseError)?;

    let password_hash = spawn_blocking_with_tracing(move || hash_password(body.password))
        .await
        .context("Failed to spawn blocking task")??;

    let new_account = NewAccount {
        email,
        first_name,
        last_name,
        role,
        password_hash,
    };
    let account = AccountRepo::insert(pool.get_ref(), &new_account).await?;

    Ok(HttpResponse::Created().json(account))
}

/// List all staff accounts
#[tracing::instrument(name = "List staff accounts", skip(admin, pool))]
#[get("")]
async fn list(
    admin: Administrator, // Administrator guard
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let accounts = AccountRepo::fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(accounts))
}

/// Fetch a single staff account by id
#[tracing::instrument(name = "Fetch a staff account", skip(admin, pool))]
#[get("/{id}")]
async fn detail(
    admin: Administrator, // Administrator guard
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();

    let account = AccountRepo::fetch_by_id(pool.get_ref(), id)
        .await?
        .ok_or(RestError::NotFound)?;

    Ok(HttpResponse::Ok().json(account))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    new_password: Secret<String>,
    confirm_password: Secret<String>,
}

/// Replace another account's password without knowing the old one
#[tracing::instrument(name = "Reset an account password", skip(admin, pool, body))]
#[post("/{id}/password")]
async fn reset_password(
    admin: Administrator, // Administrator guard
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
    body: web::Json<ResetPasswordBody>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();
    let body = body.into_inner();

    validate_new_password(&body.new_password, &body.confirm_password)
        .map_err(RestError::ParseError)?;

    let password_hash = spawn_blocking_with_tracing(move || hash_password(body.new_password))
        .await
        .context("Failed to spawn blocking task")??;

    let updated = AccountRepo::update_password_hash(pool.get_ref(), id, &password_hash).await?;
    if !updated {
        return Err(RestError::NotFound);
    }

    Ok(HttpResponse::Ok())
}

/// Delete a staff account.
/// The acting administrator may never delete the account they are
/// authenticated as.
#[tracing::instrument(name = "Delete a staff account", skip(admin, pool))]
#[delete("/{id}")]
async fn remove(
    admin: Administrator, // Administrator guard
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();

    if id == admin.account_id() {
        return Err(RestError::CannotDeleteSelf);
    }

    let deleted = AccountRepo::delete_by_id(pool.get_ref(), id).await?;
    if !deleted {
        return Err(RestError::NotFound);
    }

    Ok(HttpResponse::NoContent())
}

/// Staff account API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/accounts")
        .service(create)
        .service(list)
        .service(detail)
        .service(reset_password)
        .service(remove)
}
