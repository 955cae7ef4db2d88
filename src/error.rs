use actix_web::http::StatusCode;
use actix_web::ResponseError;

use thiserror::Error;

use crate::repo::{InsertAccountError, InsertRequestError};

pub type RestResult<T> = Result<T, RestError>;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Parse Error: {0}")]
    ParseError(String),

    #[error("A request with this RUT already exists")]
    DuplicateRut,

    #[error("An account with this email already exists")]
    DuplicateEmail,

    #[error("Unauthorized Access")]
    FailedToAuthenticate(#[source] anyhow::Error),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found")]
    NotFound,

    #[error("You cannot delete your own account")]
    CannotDeleteSelf,

    #[error("Internal Server Error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for RestError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database failure: {}", e);
        Self::InternalError("Database error".into())
    }
}

impl From<InsertRequestError> for RestError {
    fn from(e: InsertRequestError) -> Self {
        match e {
            InsertRequestError::DuplicateRut => Self::DuplicateRut,
            InsertRequestError::Database(e) => e.into(),
        }
    }
}

impl From<InsertAccountError> for RestError {
    fn from(e: InsertAccountError) -> Self {
        match e {
            InsertAccountError::DuplicateEmail => Self::DuplicateEmail,
            InsertAccountError::Database(e) => e.into(),
        }
    }
}

impl ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ParseError(_) | Self::CannotDeleteSelf => StatusCode::BAD_REQUEST,
            Self::FailedToAuthenticate(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::DuplicateRut | Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::InternalError(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
