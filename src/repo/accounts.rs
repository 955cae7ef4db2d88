use uuid::Uuid;

use chrono::{DateTime, Utc};

use serde::Serialize;

use sqlx::PgExecutor;

use thiserror::Error;

use crate::domain::{EmailAddress, PersonName, Role};

/// New staff account, password already hashed
#[derive(Debug)]
pub struct NewAccount {
    pub email: EmailAddress,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub role: Role,
    pub password_hash: String,
}

/// Stored staff account record, without credential material
#[derive(Debug, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Credential state fetched for authentication
#[derive(Debug)]
pub struct AccountCredentials {
    pub id: Uuid,
    pub role: Role,
    pub password_hash: String,
    pub is_active: bool,
}

#[derive(Debug, Error)]
pub enum InsertAccountError {
    #[error("An account with this email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    Database(sqlx::Error),
}

/// Repository for interfacing with the accounts table
pub struct AccountRepo;

impl AccountRepo {
    #[tracing::instrument(name = "Insert staff account", skip(executor, new_account))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        new_account: &NewAccount,
    ) -> Result<Account, InsertAccountError> {
        sqlx::query_as!(
            Account,
            r#"insert into accounts(email, first_name, last_name, role, password_hash)
               values ($1, $2, $3, $4, $5)
               returning id, email, first_name, last_name, role as "role: Role", is_active, created_at"#,
            new_account.email.as_ref(),
            new_account.first_name.as_ref(),
            new_account.last_name.as_ref(),
            new_account.role.as_ref(),
            new_account.password_hash.as_str(),
        )
        .fetch_one(executor)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                InsertAccountError::DuplicateEmail
            }
            _ => InsertAccountError::Database(e),
        })
    }

    #[tracing::instrument(name = "Fetch all staff accounts", skip(executor))]
    pub async fn fetch_all<'con>(executor: impl PgExecutor<'con>) -> sqlx::Result<Vec<Account>> {
        sqlx::query_as!(
            Account,
            r#"select id, email, first_name, last_name, role as "role: Role", is_active, created_at
               from accounts
               order by first_name"#
        )
        .fetch_all(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch a staff account by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<Account>> {
        sqlx::query_as!(
            Account,
            r#"select id, email, first_name, last_name, role as "role: Role", is_active, created_at
               from accounts
               where id=$1"#,
            id,
        )
        .fetch_optional(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch account credentials by email", skip(executor))]
    pub async fn fetch_credentials_by_email<'con>(
        executor: impl PgExecutor<'con>,
        email: &EmailAddress,
    ) -> sqlx::Result<Option<AccountCredentials>> {
        sqlx::query_as!(
            AccountCredentials,
            r#"select id, role as "role: Role", password_hash, is_active
               from accounts
               where email=$1"#,
            email.as_ref(),
        )
        .fetch_optional(executor)
        .await
    }

    /// Replace an account's password hash unconditionally
    #[tracing::instrument(name = "Replace account password hash", skip(executor, password_hash))]
    pub async fn update_password_hash<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
        password_hash: &str,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query!(
            "update accounts set password_hash=$2 where id=$1",
            id,
            password_hash,
        )
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Delete a staff account by id", skip(executor))]
    pub async fn delete_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query!("delete from accounts where id=$1", id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
