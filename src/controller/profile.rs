use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use anyhow::Context;

use secrecy::Secret;

use serde::Deserialize;

use sqlx::PgPool;

use crate::auth::{hash_password, AuthenticatedAccount};
use crate::controller::accounts::validate_new_password;
use crate::error::{RestError, RestResult};
use crate::repo::AccountRepo;
use crate::telemetry::spawn_blocking_with_tracing;

/// Fetch the authenticated account's own record
#[tracing::instrument(name = "Fetch own profile", skip(staff, pool))]
#[get("")]
async fn me(
    staff: AuthenticatedAccount, // Staff guard, any role
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let account = AccountRepo::fetch_by_id(pool.get_ref(), staff.id())
        .await?
        .ok_or(RestError::NotFound)?;

    Ok(HttpResponse::Ok().json(account))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
    new_password: Secret<String>,
    confirm_password: Secret<String>,
}

/// Replace the authenticated account's own password.
/// Basic credentials embed the password, so every later request must carry
/// the new one — the old credentials stop verifying immediately.
#[tracing::instrument(name = "Change own password", skip(staff, pool, body))]
#[post("/password")]
async fn change_password(
    staff: AuthenticatedAccount, // Staff guard, any role
    pool: web::Data<PgPool>,
    body: web::Json<ChangePasswordBody>,
) -> RestResult<impl Responder> {
    let body = body.into_inner();

    validate_new_password(&body.new_password, &body.confirm_password)
        .map_err(RestError::ParseError)?;

    let password_hash = spawn_blocking_with_tracing(move || hash_password(body.new_password))
        .await
        .context("Failed to spawn blocking task")??;

    let updated =
        AccountRepo::update_password_hash(pool.get_ref(), staff.id(), &password_hash).await?;
    if !updated {
        return Err(RestError::NotFound);
    }

    Ok(HttpResponse::Ok())
}

/// Own-profile API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/me").service(me).service(change_password)
}
