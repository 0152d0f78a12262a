// teamcal-service/src/models/mod.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub mod schedule;
pub use schedule::*;

pub mod team;
pub use team::*;

pub mod user;
pub use user::*;

// JWT claims carried in the session cookie
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: i64, // Subject (user ID)
    pub email: String,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
}

// Custom error types
#[derive(Debug, Display)]
pub enum ServiceError {
    #[display(fmt = "Internal Server Error")]
    InternalServerError,
    #[display(fmt = "Unauthorized: {}", _0)]
    Unauthorized(String),
    #[display(fmt = "Forbidden: {}", _0)]
    Forbidden(String),
    #[display(fmt = "Not Found: {}", _0)]
    NotFound(String),
    #[display(fmt = "Validation failed")]
    ValidationFailed(Vec<String>),
}

impl ServiceError {
    // Messages rendered into the `errors` array of the response body
    pub fn messages(&self) -> Vec<String> {
        match self {
            ServiceError::InternalServerError => vec!["Internal Server Error".to_string()],
            ServiceError::Unauthorized(msg)
            | ServiceError::Forbidden(msg)
            | ServiceError::NotFound(msg) => vec![msg.clone()],
            ServiceError::ValidationFailed(msgs) => msgs.clone(),
        }
    }
}

impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "errors": self.messages() }))
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        error!("❌ Storage error: {}", err);
        ServiceError::InternalServerError
    }
}
