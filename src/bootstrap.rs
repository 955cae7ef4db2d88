use anyhow::Context;

use sqlx::PgPool;

use crate::auth::hash_password;
use crate::domain::{EmailAddress, Role};
use crate::repo::{AccountRepo, InsertAccountError, NewAccount};
use crate::settings::BootstrapSettings;

/// Create the initial administrator account when no account exists under the
/// configured email. Safe to run on every startup.
#[tracing::instrument(name = "Ensure initial administrator", skip(pool, settings))]
pub async fn ensure_admin_account(
    pool: &PgPool,
    settings: &BootstrapSettings,
) -> anyhow::Result<()> {
    let email: EmailAddress = settings
        .admin_email
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bootstrap admin email: {}", e))?;

    if AccountRepo::fetch_credentials_by_email(pool, &email)
        .await
        .context("Failed to look up bootstrap admin account")?
        .is_some()
    {
        tracing::debug!("Bootstrap admin account already present");
        return Ok(());
    }

    let password_hash = hash_password(settings.admin_password.clone())?;

    let new_account = NewAccount {
        email,
        first_name: "Administrador".parse().expect("Invalid bootstrap name"),
        last_name: "Sistema".parse().expect("Invalid bootstrap name"),
        role: Role::Administrator,
        password_hash,
    };

    match AccountRepo::insert(pool, &new_account).await {
        Ok(account) => {
            tracing::info!("Created bootstrap admin account {}", account.email);
            Ok(())
        }
        // Lost a race against another instance starting up
        Err(InsertAccountError::DuplicateEmail) => Ok(()),
        Err(InsertAccountError::Database(e)) => {
            Err(e).context("Failed to insert bootstrap admin account")
        }
    }
}
