use uuid::Uuid;

use chrono::{DateTime, Utc};

use serde::Serialize;

use sqlx::PgExecutor;

use thiserror::Error;

use crate::domain::{PersonName, PhoneNumber, RequestStatus, Rut};

/// New discount request, fields already validated
#[derive(Debug)]
pub struct NewRequest {
    pub rut: Rut,
    pub name: PersonName,
    pub paternal_surname: PersonName,
    pub maternal_surname: PersonName,
    pub address: String,
    pub phone: PhoneNumber,
    pub commune: String,
}

/// Stored discount request record
#[derive(Debug, Serialize)]
pub struct DiscountRequest {
    /// ID of the request
    pub id: Uuid,
    /// Canonical-form RUT, unique across all requests
    pub rut: String,
    pub name: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub address: String,
    pub phone: String,
    pub commune: String,
    /// Set once by the database at insert, immutable afterwards
    pub submitted_at: DateTime<Utc>,
    /// Present iff `status` is `Accepted`
    pub accepted_at: Option<DateTime<Utc>>,
    pub status: RequestStatus,
}

#[derive(Debug, Error)]
pub enum InsertRequestError {
    #[error("A request with this RUT already exists")]
    DuplicateRut,
    #[error(transparent)]
    Database(sqlx::Error),
}

/// Repository for interfacing with the requests table
pub struct RequestRepo;

impl RequestRepo {
    #[tracing::instrument(name = "Insert discount request", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        new_request: &NewRequest,
    ) -> Result<DiscountRequest, InsertRequestError> {
        sqlx::query_as!(
            DiscountRequest,
            r#"insert into requests(rut, name, paternal_surname, maternal_surname, address, phone, commune)
               values ($1, $2, $3, $4, $5, $6, $7)
               returning id, rut, name, paternal_surname, maternal_surname, address, phone, commune,
                         submitted_at, accepted_at, status as "status: RequestStatus""#,
            new_request.rut.as_ref(),
            new_request.name.as_ref(),
            new_request.paternal_surname.as_ref(),
            new_request.maternal_surname.as_ref(),
            new_request.address.as_str(),
            new_request.phone.as_ref(),
            new_request.commune.as_str(),
        )
        .fetch_one(executor)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                InsertRequestError::DuplicateRut
            }
            _ => InsertRequestError::Database(e),
        })
    }

    #[tracing::instrument(name = "Fetch all requests", skip(executor))]
    pub async fn fetch_all<'con>(
        executor: impl PgExecutor<'con>,
    ) -> sqlx::Result<Vec<DiscountRequest>> {
        sqlx::query_as!(
            DiscountRequest,
            r#"select id, rut, name, paternal_surname, maternal_surname, address, phone, commune,
                      submitted_at, accepted_at, status as "status: RequestStatus"
               from requests
               order by submitted_at desc"#
        )
        .fetch_all(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch a request by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<DiscountRequest>> {
        sqlx::query_as!(
            DiscountRequest,
            r#"select id, rut, name, paternal_surname, maternal_surname, address, phone, commune,
                      submitted_at, accepted_at, status as "status: RequestStatus"
               from requests
               where id=$1"#,
            id,
        )
        .fetch_optional(executor)
        .await
    }

    /// Fetch every request stored under a RUT.
    ///
    /// The unique index keeps new duplicates out, but legacy rows may still
    /// share a RUT, so callers get a list rather than at most one record.
    #[tracing::instrument(name = "Fetch requests by RUT", skip(executor))]
    pub async fn fetch_by_rut<'con>(
        executor: impl PgExecutor<'con>,
        rut: &Rut,
    ) -> sqlx::Result<Vec<DiscountRequest>> {
        sqlx::query_as!(
            DiscountRequest,
            r#"select id, rut, name, paternal_surname, maternal_surname, address, phone, commune,
                      submitted_at, accepted_at, status as "status: RequestStatus"
               from requests
               where rut=$1
               order by submitted_at"#,
            rut.as_ref(),
        )
        .fetch_all(executor)
        .await
    }

    /// Assign a new status to a request.
    ///
    /// `accepted_at` mirrors the status: set to now when the new status is
    /// `Accepted`, cleared otherwise — even when the status does not change.
    #[tracing::instrument(name = "Set request status", skip(executor))]
    pub async fn set_status<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
        new_status: RequestStatus,
    ) -> sqlx::Result<Option<DiscountRequest>> {
        let accepted_at = new_status.is_accepted().then(Utc::now);
        sqlx::query_as!(
            DiscountRequest,
            r#"update requests set status=$2, accepted_at=$3
               where id=$1
               returning id, rut, name, paternal_surname, maternal_surname, address, phone, commune,
                         submitted_at, accepted_at, status as "status: RequestStatus""#,
            id,
            new_status.as_ref(),
            accepted_at,
        )
        .fetch_optional(executor)
        .await
    }

    #[tracing::instrument(name = "Delete a request by id", skip(executor))]
    pub async fn delete_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query!("delete from requests where id=$1", id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete duplicated requests, keeping the earliest per RUT.
    ///
    /// For every RUT with more than one row, the row with the smallest
    /// `(submitted_at, id)` survives; ties on the timestamp keep the lowest
    /// id. Returns the number of deleted rows; a store without duplicates is
    /// left untouched.
    #[tracing::instrument(name = "Delete duplicated requests", skip(executor))]
    pub async fn delete_duplicates<'con>(executor: impl PgExecutor<'con>) -> sqlx::Result<u64> {
        let result = sqlx::query!(
            r#"delete from requests as dup
               using requests as keep
               where dup.rut = keep.rut
                 and (keep.submitted_at, keep.id) < (dup.submitted_at, dup.id)"#
        )
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
