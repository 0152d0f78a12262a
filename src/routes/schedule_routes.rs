// teamcal-service/src/routes/schedule_routes.rs
use crate::db::Database;
use crate::models::{LoadedSchedule, ScheduleBody, ScheduleDetail, ScheduleRequest, ServiceError, User};
use crate::policy::project;
use crate::services::schedule_service;
use crate::utils::current_user;
use actix_web::{delete, get, post, route, web, HttpRequest, HttpResponse};
use log::info;
use rusqlite::Connection;

// Get all schedules of the caller's team
#[get("/schedules")]
async fn list_schedules(req: HttpRequest, db: web::Data<Database>) -> Result<HttpResponse, ServiceError> {
    let conn = db.lock()?;
    let user = current_user(&conn, &req)?;

    info!("📋 Fetching schedules for user: {}", user.id);

    let schedules = schedule_service::list_schedules(&conn, &user)?;

    info!("✅ Found {} schedules for user: {}", schedules.len(), user.id);

    Ok(HttpResponse::Ok().json(schedules))
}

// Create a schedule with its participants
#[post("/schedules")]
async fn create_schedule(
    req: HttpRequest,
    db: web::Data<Database>,
    data: web::Json<ScheduleBody>,
) -> Result<HttpResponse, ServiceError> {
    let data = data.into_inner().into_inner();
    let mut conn = db.lock()?;
    let user = current_user(&conn, &req)?;

    info!("📝 Creating schedule for user: {}", user.id);

    let loaded = schedule_service::create_schedule(&mut conn, &user, &data)?;
    let detail = detail_for(&conn, &user, &loaded, "Schedule created", &data)?;

    Ok(HttpResponse::Created().json(detail))
}

// Update a schedule and replace its participants
#[route("/schedules/{schedule_id}", method = "PATCH", method = "PUT")]
async fn update_schedule(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<i64>,
    data: web::Json<ScheduleBody>,
) -> Result<HttpResponse, ServiceError> {
    let data = data.into_inner().into_inner();
    let mut conn = db.lock()?;
    let user = current_user(&conn, &req)?;
    let schedule_id = path.into_inner();

    info!("🔄 Updating schedule: {} for user: {}", schedule_id, user.id);

    let loaded = schedule_service::update_schedule(&mut conn, &user, schedule_id, &data)?;
    let detail = detail_for(&conn, &user, &loaded, "Schedule updated", &data)?;

    Ok(HttpResponse::Ok().json(detail))
}

#[delete("/schedules/{schedule_id}")]
async fn delete_schedule(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let mut conn = db.lock()?;
    let user = current_user(&conn, &req)?;
    let schedule_id = path.into_inner();

    info!("🗑️ Deleting schedule: {} for user: {}", schedule_id, user.id);

    schedule_service::delete_schedule(&mut conn, &user, schedule_id)?;

    Ok(HttpResponse::NoContent().finish())
}

fn detail_for(
    conn: &Connection,
    user: &User,
    loaded: &LoadedSchedule,
    message: &str,
    request: &ScheduleRequest,
) -> Result<ScheduleDetail, ServiceError> {
    Ok(ScheduleDetail {
        message: message.to_string(),
        schedule: project(loaded, user.id),
        participants: schedule_service::participant_summaries(conn, loaded)?,
        creator_personal_note: request.personal_note.clone(),
    })
}

// Register all schedule routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_schedules)
        .service(create_schedule)
        .service(update_schedule)
        .service(delete_schedule);
}
