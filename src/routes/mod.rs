// teamcal-service/src/routes/mod.rs
use crate::models::ServiceError;
use crate::utils::auth_middleware::Authentication;
use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{web, HttpRequest};
use log::error;

pub mod auth_routes;
pub mod schedule_routes;
pub mod team_routes;

// Mount the public /users scope and the session-protected /api scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(web::scope("/users").configure(auth_routes::init_public_routes))
        .service(
            web::scope("/api")
                .wrap(Authentication)
                .configure(auth_routes::init_routes)
                .configure(team_routes::init_routes)
                .configure(schedule_routes::init_routes),
        );
}

// Extractor failures answer with the same `{"errors": [..]}` body as handlers
fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    error!("❌ Rejected request body for {}: {}", req.path(), err);
    ServiceError::ValidationFailed(vec![format!("Request body is invalid: {}", err)]).into()
}

fn path_error(err: PathError, req: &HttpRequest) -> actix_web::Error {
    error!("❌ Unmatched path parameter in {}: {}", req.path(), err);
    ServiceError::NotFound(format!("Nothing found at {}.", req.path())).into()
}
