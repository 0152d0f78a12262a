// teamcal-service/src/utils/mod.rs
use crate::config::Config;
use crate::models::{Claims, ServiceError, User, TIME_FORMAT};
use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::http::header;
use actix_web::{dev::ServiceRequest, web, HttpMessage, HttpRequest};
use bcrypt::{hash, verify};
use chrono::{Duration, Local, NaiveDateTime, Timelike, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::error;
use rusqlite::{Connection, ErrorCode, Row};

pub mod schedule_storage;
pub mod team_storage;
pub mod user_storage;

pub const SESSION_COOKIE: &str = "teamcal_session";

// Current naive local time, truncated to whole seconds
pub fn now_local() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

// Read a TEXT column written with TIME_FORMAT
pub fn parse_stored_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

// Extract the authenticated user id placed in the request by the middleware
pub fn get_user_id_from_request(req: &HttpRequest) -> Result<i64, ServiceError> {
    req.extensions()
        .get::<Claims>()
        .map(|claims| claims.sub)
        .ok_or_else(|| ServiceError::Unauthorized("You need to sign in first.".to_string()))
}

// Load the authenticated user; a token for a deleted account is rejected
pub fn current_user(conn: &Connection, req: &HttpRequest) -> Result<User, ServiceError> {
    let user_id = get_user_id_from_request(req)?;
    user_storage::find_user_by_id(conn, user_id)?.ok_or_else(|| {
        error!("❌ Session refers to missing user: {}", user_id);
        ServiceError::Unauthorized("You need to sign in first.".to_string())
    })
}

// JWT utility functions
pub mod jwt {
    use super::*;

    // Generate a new JWT token for a user
    pub fn generate_token(user: &User, config: &Config) -> Result<String, ServiceError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::days(config.session_days))
            .ok_or(ServiceError::InternalServerError)?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: expiration,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_ref()),
        )
        .map_err(|e| {
            error!("❌ Failed to sign session token: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    // Validate and decode a JWT token
    pub fn decode_token(token: &str, config: &Config) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthorized("Your session has expired.".to_string()))
    }

    // Extract JWT from Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Option<&str> {
        auth_header.strip_prefix("Bearer ").map(str::trim)
    }
}

// Session cookie helpers
pub mod session {
    use super::*;

    pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(config.secure_cookies)
            .max_age(time::Duration::days(config.session_days))
            .finish()
    }

    pub fn removal_cookie() -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
        cookie.make_removal();
        cookie
    }

    // Token from the session cookie, or from a bearer header for API clients
    pub fn token_from_request(req: &ServiceRequest) -> Option<String> {
        if let Some(cookie) = req.cookie(SESSION_COOKIE) {
            if !cookie.value().is_empty() {
                return Some(cookie.value().to_string());
            }
        }

        req.headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(jwt::extract_token_from_header)
            .map(str::to_string)
    }
}

// Password utility functions
pub mod password {
    use super::*;

    // Hash a password using bcrypt
    pub fn hash_password(password: &str, cost: u32) -> Result<String, ServiceError> {
        hash(password, cost).map_err(|_| ServiceError::InternalServerError)
    }

    // Verify a password against a hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
        verify(password, hash).map_err(|_| ServiceError::InternalServerError)
    }
}

// Middleware for session authentication
pub mod auth_middleware {
    use super::*;
    use actix_web::body::EitherBody;
    use actix_web::dev::{forward_ready, Service, ServiceResponse, Transform};
    use actix_web::Error;
    use futures::future::{ok, Ready};
    use log::debug;
    use std::future::Future;
    use std::pin::Pin;

    pub struct Authentication;

    impl<S, B> Transform<S, ServiceRequest> for Authentication
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<EitherBody<B>>;
        type Error = Error;
        type Transform = AuthenticationMiddleware<S>;
        type InitError = ();
        type Future = Ready<Result<Self::Transform, Self::InitError>>;

        fn new_transform(&self, service: S) -> Self::Future {
            ok(AuthenticationMiddleware { service })
        }
    }

    pub struct AuthenticationMiddleware<S> {
        service: S,
    }

    impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<EitherBody<B>>;
        type Error = Error;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

        forward_ready!(service);

        fn call(&self, req: ServiceRequest) -> Self::Future {
            let claims = match (
                session::token_from_request(&req),
                req.app_data::<web::Data<Config>>(),
            ) {
                (Some(token), Some(config)) => jwt::decode_token(&token, config),
                (None, _) => Err(ServiceError::Unauthorized(
                    "You need to sign in first.".to_string(),
                )),
                (_, None) => {
                    error!("❌ Config missing from app data");
                    Err(ServiceError::InternalServerError)
                }
            };

            match claims {
                Ok(claims) => {
                    // Add the claims to the request extensions
                    req.extensions_mut().insert(claims);
                    let fut = self.service.call(req);
                    Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
                }
                Err(err) => {
                    debug!("Rejected unauthenticated request to {}", req.path());
                    let response = req.error_response(err).map_into_right_body();
                    Box::pin(async move { Ok(response) })
                }
            }
        }
    }
}

// Field validation shared by registration
pub mod validation {
    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        static ref EMAIL_REGEX: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email pattern is valid");
    }

    pub const PASSWORD_MIN: usize = 6;
    pub const PASSWORD_MAX: usize = 128;

    pub fn is_valid_email(email: &str) -> bool {
        EMAIL_REGEX.is_match(email)
    }

}
