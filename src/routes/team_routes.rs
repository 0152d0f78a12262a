// teamcal-service/src/routes/team_routes.rs
use crate::db::Database;
use crate::models::{JoinTeamRequest, ServiceError, TeamBody};
use crate::utils::{current_user, team_storage, user_storage};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use log::{error, info};
use serde_json::json;

// Create a new team and move the caller onto it
#[post("/teams")]
async fn create_team(
    req: HttpRequest,
    db: web::Data<Database>,
    team_data: web::Json<TeamBody>,
) -> Result<HttpResponse, ServiceError> {
    let mut conn = db.lock()?;
    let user = current_user(&conn, &req)?;
    let team_data = team_data.into_inner().into_inner();
    let name = team_data.name.trim();

    info!("📝 Creating new team for user: {}", user.id);

    if name.is_empty() {
        error!("❌ Team name missing in request from user: {}", user.id);
        return Err(ServiceError::ValidationFailed(vec![
            "Name can't be blank".to_string(),
        ]));
    }

    let tx = conn.transaction()?;
    let team = team_storage::create_team(&tx, name)?;
    user_storage::set_team(&tx, user.id, team.id)?;
    tx.commit()?;

    info!("✅ Team created successfully: {}", team.id);

    Ok(HttpResponse::Created().json(json!({
        "message": "Team created and joined",
        "team": team,
        "user_team_id": team.id
    })))
}

// Join an existing team, leaving any previous one
#[post("/teams/join")]
async fn join_team(
    req: HttpRequest,
    db: web::Data<Database>,
    data: web::Json<JoinTeamRequest>,
) -> Result<HttpResponse, ServiceError> {
    let conn = db.lock()?;
    let user = current_user(&conn, &req)?;

    info!("👥 User: {} joining team: {:?}", user.id, data.team_id);

    let team = match data.team_id.as_id() {
        Some(team_id) => team_storage::find_team_by_id(&conn, team_id)?,
        None => None,
    };
    let team = match team {
        Some(team) => team,
        None => {
            error!("❌ Team not found: {:?}", data.team_id);
            return Err(ServiceError::NotFound(
                "No team exists with that team ID.".to_string(),
            ));
        }
    };

    user_storage::set_team(&conn, user.id, team.id)?;

    info!("✅ User: {} joined team: {}", user.id, team.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Joined team {}", team.name),
        "team": team,
        "user_team_id": team.id
    })))
}

// Get the members of the caller's own team
#[get("/teams/{team_id}/members")]
async fn get_team_members(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let conn = db.lock()?;
    let user = current_user(&conn, &req)?;
    let team_id = path.into_inner();

    info!("📋 Fetching members for team: {}", team_id);

    let own_team = match user.team_id {
        Some(own_team) => own_team,
        None => {
            error!("❌ User: {} is not on a team", user.id);
            return Err(ServiceError::Forbidden("You are not on a team.".to_string()));
        }
    };

    if own_team != team_id || team_storage::find_team_by_id(&conn, team_id)?.is_none() {
        error!("❌ User: {} doesn't have access to team: {}", user.id, team_id);
        return Err(ServiceError::Unauthorized(
            "You do not have access to this team's members.".to_string(),
        ));
    }

    let members = team_storage::get_team_members(&conn, team_id)?;

    info!("✅ Found {} team members", members.len());

    Ok(HttpResponse::Ok().json(members))
}

// Register all team routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_team)
        .service(join_team)
        .service(get_team_members);
}
