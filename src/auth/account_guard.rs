use std::future::Future;
use std::pin::Pin;

use actix_web::{dev, web, FromRequest, HttpRequest};

use anyhow::Context;

use secrecy::Secret;

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::password::verify_password_hash;
use crate::auth::Credentials;
use crate::domain::{EmailAddress, Role};
use crate::error::{RestError, RestResult};
use crate::repo::AccountRepo;
use crate::telemetry::spawn_blocking_with_tracing;

/// An authenticated staff account, carrying the caller's identity and role
/// into every handler that requires one.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedAccount {
    id: Uuid,
    role: Role,
}

impl AuthenticatedAccount {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl FromRequest for AuthenticatedAccount {
    type Error = RestError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            // NOTE: Must be registered with the application at startup
            let pool: &PgPool = req
                .app_data::<web::Data<PgPool>>()
                .expect("PgPool not registered for application");
            // Pull the credentials from the headers
            let creds = Credentials::from_headers(req.headers())
                .map_err(RestError::FailedToAuthenticate)?;
            // Get the account and verify the credentials
            validate_credentials(pool, creds).await
        })
    }
}

/// Guard extractor for endpoints restricted to the Administrator role
#[derive(Debug, Clone, Copy)]
pub struct Administrator(AuthenticatedAccount);

impl Administrator {
    pub fn account_id(&self) -> Uuid {
        self.0.id()
    }
}

impl FromRequest for Administrator {
    type Error = RestError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut dev::Payload) -> Self::Future {
        let account_future = AuthenticatedAccount::from_request(req, payload);
        Box::pin(async move {
            let account = account_future.await?;
            if !account.role().is_administrator() {
                return Err(RestError::Forbidden(
                    "This operation requires the Administrator role".into(),
                ));
            }
            Ok(Administrator(account))
        })
    }
}

#[tracing::instrument("Validate credentials", skip(pool, credentials))]
async fn validate_credentials(
    pool: &PgPool,
    credentials: Credentials,
) -> RestResult<AuthenticatedAccount> {
    let email: EmailAddress = credentials
        .email
        .parse()
        .map_err(RestError::ParseError)?;
    let password = credentials.password;

    let account = AccountRepo::fetch_credentials_by_email(pool, &email)
        .await?
        .context("No account stored for email")
        .map_err(RestError::FailedToAuthenticate)?;

    let password_hash = Secret::new(account.password_hash);
    spawn_blocking_with_tracing(move || verify_password_hash(password, password_hash))
        .await
        .context("Failed to spawn blocking task")??;

    if !account.is_active {
        return Err(RestError::FailedToAuthenticate(anyhow::anyhow!(
            "Account is deactivated"
        )));
    }

    Ok(AuthenticatedAccount {
        id: account.id,
        role: account.role,
    })
}
