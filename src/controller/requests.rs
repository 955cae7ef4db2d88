use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};

use serde::{Deserialize, Serialize};

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::{Administrator, AuthenticatedAccount};
use crate::domain::{RequestStatus, Rut};
use crate::error::{RestError, RestResult};
use crate::repo::{NewRequest, RequestRepo};

/// JSON deserialization wrapper for parsing new discount requests
#[derive(Debug, Deserialize)]
pub struct SubmitRequestBody {
    rut: String,
    name: String,
    paternal_surname: String,
    maternal_surname: String,
    address: String,
    phone: String,
    commune: String,
}

impl TryInto<NewRequest> for SubmitRequestBody {
    type Error = String;

    fn try_into(self) -> Result<NewRequest, Self::Error> {
        let rut = self.rut.parse().map_err(|e| format!("rut: {}", e))?;
        let name = self.name.parse().map_err(|e| format!("name: {}", e))?;
        let paternal_surname = self
            .paternal_surname
            .parse()
            .map_err(|e| format!("paternal_surname: {}", e))?;
        let maternal_surname = self
            .maternal_surname
            .parse()
            .map_err(|e| format!("maternal_surname: {}", e))?;
        let phone = self.phone.parse().map_err(|e| format!("phone: {}", e))?;

        if self.address.trim().is_empty() {
            return Err("address: cannot be empty".into());
        }
        if self.commune.trim().is_empty() {
            return Err("commune: cannot be empty".into());
        }

        Ok(NewRequest {
            rut,
            name,
            paternal_surname,
            maternal_surname,
            address: self.address.trim().to_string(),
            phone,
            commune: self.commune.trim().to_string(),
        })
    }
}

/// Public submission endpoint: any citizen may file a request
#[tracing::instrument(name = "Submit a discount request", skip(pool))]
#[post("")]
async fn submit(
    pool: web::Data<PgPool>,
    body: web::Json<SubmitRequestBody>,
) -> RestResult<impl Responder> {
    let new_request: NewRequest = body.0.try_into().map_err(RestError::ParseError)?;

    let request = RequestRepo::insert(pool.get_ref(), &new_request).await?;

    Ok(HttpResponse::Created().json(request))
}

/// List all requests, newest submission first
#[tracing::instrument(name = "List discount requests", skip(staff, pool))]
#[get("")]
async fn list(
    staff: AuthenticatedAccount, // Staff guard, any role
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let requests = RequestRepo::fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(requests))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    rut: String,
}

/// Search requests by RUT.
/// Responds with a list: the unique index keeps new duplicates out, but
/// legacy rows may still share a RUT.
#[tracing::instrument(name = "Search requests by RUT", skip(staff, pool))]
#[get("/search")]
async fn search(
    staff: AuthenticatedAccount, // Staff guard, any role
    pool: web::Data<PgPool>,
    query: web::Query<SearchQuery>,
) -> RestResult<impl Responder> {
    let rut: Rut = query
        .rut
        .parse()
        .map_err(|e| RestError::ParseError(format!("rut: {}", e)))?;

    let requests = RequestRepo::fetch_by_rut(pool.get_ref(), &rut).await?;

    Ok(HttpResponse::Ok().json(requests))
}

#[derive(Debug, Serialize)]
struct DeduplicateResponse {
    removed: u64,
}

/// Remove duplicated requests, keeping the earliest per RUT
#[tracing::instrument(name = "Deduplicate requests", skip(admin, pool))]
#[delete("/duplicates")]
async fn deduplicate(
    admin: Administrator, // Administrator guard
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let removed = RequestRepo::delete_duplicates(pool.get_ref()).await?;

    tracing::info!("Removed {} duplicated requests", removed);

    Ok(HttpResponse::Ok().json(DeduplicateResponse { removed }))
}

/// Fetch a single request by id
#[tracing::instrument(name = "Fetch a discount request", skip(staff, pool))]
#[get("/{id}")]
async fn detail(
    staff: AuthenticatedAccount, // Staff guard, any role
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();

    let request = RequestRepo::fetch_by_id(pool.get_ref(), id)
        .await?
        .ok_or(RestError::NotFound)?;

    Ok(HttpResponse::Ok().json(request))
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusBody {
    status: String,
}

/// Assign a new review status to a request.
/// Accepting stamps `accepted_at`; every other status clears it.
#[tracing::instrument(name = "Change request status", skip(admin, pool))]
#[patch("/{id}/status")]
async fn change_status(
    admin: Administrator, // Administrator guard
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
    body: web::Json<ChangeStatusBody>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();

    let new_status: RequestStatus = body
        .status
        .parse()
        .map_err(|e| RestError::ParseError(format!("status: {}", e)))?;

    let request = RequestRepo::set_status(pool.get_ref(), id, new_status)
        .await?
        .ok_or(RestError::NotFound)?;

    Ok(HttpResponse::Ok().json(request))
}

/// Delete a single request by id
#[tracing::instrument(name = "Delete a discount request", skip(admin, pool))]
#[delete("/{id}")]
async fn remove(
    admin: Administrator, // Administrator guard
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();

    let deleted = RequestRepo::delete_by_id(pool.get_ref(), id).await?;
    if !deleted {
        return Err(RestError::NotFound);
    }

    Ok(HttpResponse::NoContent())
}

/// Discount request API endpoints
pub fn scope() -> impl HttpServiceFactory {
    // NOTE: literal routes registered before the parametric ones
    web::scope("/requests")
        .service(submit)
        .service(list)
        .service(search)
        .service(deduplicate)
        .service(detail)
        .service(change_status)
        .service(remove)
}
