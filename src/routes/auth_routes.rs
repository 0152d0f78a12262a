// teamcal-service/src/routes/auth_routes.rs
use crate::config::Config;
use crate::db::Database;
use crate::models::{AccountInfo, CredentialsBody, CurrentIdentity, RegisterBody, ServiceError};
use crate::utils::validation::{is_valid_email, PASSWORD_MAX, PASSWORD_MIN};
use crate::utils::{
    current_user, is_unique_violation, jwt, password, session, team_storage, user_storage,
};
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use log::{debug, error, info};
use serde_json::json;

const EMAIL_TAKEN: &str = "Email has already been taken";

// Register a new user and start a session
#[post("")]
async fn register(
    db: web::Data<Database>,
    config: web::Data<Config>,
    data: web::Json<RegisterBody>,
) -> Result<HttpResponse, ServiceError> {
    let data = data.into_inner().into_inner();
    let name = data.name.trim().to_string();
    let email = data.email.trim().to_string();

    info!("📝 Register request for email: {}", email);

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push("Name can't be blank".to_string());
    }
    if email.is_empty() {
        errors.push("Email can't be blank".to_string());
    } else if !is_valid_email(&email) {
        errors.push("Email is invalid".to_string());
    } else if user_storage::find_user_by_email(&*db.lock()?, &email)?.is_some() {
        errors.push(EMAIL_TAKEN.to_string());
    }
    let password_len = data.password.chars().count();
    if password_len < PASSWORD_MIN {
        errors.push(format!(
            "Password is too short (minimum is {} characters)",
            PASSWORD_MIN
        ));
    } else if password_len > PASSWORD_MAX {
        errors.push(format!(
            "Password is too long (maximum is {} characters)",
            PASSWORD_MAX
        ));
    }
    if let Some(confirmation) = &data.password_confirmation {
        if confirmation != &data.password {
            errors.push("Password confirmation doesn't match Password".to_string());
        }
    }
    if !errors.is_empty() {
        error!("❌ Registration rejected for email: {}", email);
        return Err(ServiceError::ValidationFailed(errors));
    }

    let password_hash = password::hash_password(&data.password, config.bcrypt_cost)?;
    let user = {
        let conn = db.lock()?;
        match user_storage::create_user(&conn, &name, &email, &password_hash) {
            Ok(user) => user,
            Err(err) if is_unique_violation(&err) => {
                return Err(ServiceError::ValidationFailed(vec![EMAIL_TAKEN.to_string()]));
            }
            Err(err) => return Err(err.into()),
        }
    };

    let token = jwt::generate_token(&user, &config)?;

    info!("✅ User registered successfully: {}", user.id);

    Ok(HttpResponse::Created()
        .cookie(session::session_cookie(token, &config))
        .json(json!({
            "message": "Registration complete",
            "user": AccountInfo::from(&user)
        })))
}

// Sign in and set the session cookie
#[post("/sign_in")]
async fn login(
    db: web::Data<Database>,
    config: web::Data<Config>,
    credentials: web::Json<CredentialsBody>,
) -> Result<HttpResponse, ServiceError> {
    let credentials = credentials.into_inner().into_inner();
    info!("🔑 Login request for email: {}", credentials.email);

    let invalid = || ServiceError::Unauthorized("Invalid email or password.".to_string());

    let user = match user_storage::find_user_by_email(&*db.lock()?, &credentials.email)? {
        Some(user) => user,
        None => {
            error!("❌ User not found: {}", credentials.email);
            return Err(invalid());
        }
    };

    if !password::verify_password(&credentials.password, &user.password_hash)? {
        error!("❌ Invalid password for user: {}", user.id);
        return Err(invalid());
    }

    let token = jwt::generate_token(&user, &config)?;

    info!("✅ User logged in successfully: {}", user.id);

    Ok(HttpResponse::Ok()
        .cookie(session::session_cookie(token, &config))
        .json(json!({
            "message": "Signed in",
            "user": AccountInfo::from(&user)
        })))
}

// Sign out by clearing the session cookie
#[delete("/sign_out")]
async fn logout() -> HttpResponse {
    debug!("👋 Sign out request");
    HttpResponse::Ok()
        .cookie(session::removal_cookie())
        .json(json!({ "message": "Signed out" }))
}

// Get current identity (requires authentication)
#[get("/me")]
async fn me(req: HttpRequest, db: web::Data<Database>) -> Result<HttpResponse, ServiceError> {
    let conn = db.lock()?;
    let user = current_user(&conn, &req)?;

    debug!("👤 Identity request for user: {}", user.id);

    let team_name = match user.team_id {
        Some(team_id) => team_storage::find_team_by_id(&conn, team_id)?.map(|team| team.name),
        None => None,
    };

    Ok(HttpResponse::Ok().json(CurrentIdentity {
        id: user.id,
        email: user.email,
        name: user.name,
        team_id: user.team_id,
        team_name,
    }))
}

// Cancel the account, removing the schedules it created
#[delete("/me")]
async fn delete_account(req: HttpRequest, db: web::Data<Database>) -> Result<HttpResponse, ServiceError> {
    let mut conn = db.lock()?;
    let user = current_user(&conn, &req)?;

    info!("🗑️ Account deletion requested by user: {}", user.id);

    let tx = conn.transaction()?;
    user_storage::delete_user(&tx, user.id)?;
    tx.commit()?;

    Ok(HttpResponse::Ok()
        .cookie(session::removal_cookie())
        .json(json!({ "message": "Account deleted" })))
}

// Routes reachable without a session, mounted under /users
pub fn init_public_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login).service(logout);
}

// Session routes, mounted under the authenticated /api scope
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(me).service(delete_account);
}
