// teamcal-service/src/services/schedule_service.rs
//
// Create/update/delete of a schedule together with its participant rows.
// Every mutation runs in one IMMEDIATE transaction: permission check, core row
// write and participant replacement either all commit or all roll back.

use crate::models::{
    parse_local_time, LoadedSchedule, Schedule, ScheduleFields, ScheduleRequest, ScheduleView,
    ServiceError, User, UserSummary,
};
use crate::policy::{authorize, project, Action};
use crate::utils::{is_unique_violation, schedule_storage, user_storage};
use log::{debug, info, warn};
use rusqlite::{Connection, TransactionBehavior};

pub const DEFAULT_TITLE: &str = "New event";

// List the actor's team schedules, projected for the actor, earliest first
pub fn list_schedules(conn: &Connection, actor: &User) -> Result<Vec<ScheduleView>, ServiceError> {
    authorize(Action::Index, None, actor).into_result(Action::Index)?;
    let team_id = actor.team_id.ok_or(ServiceError::InternalServerError)?;

    let schedules = schedule_storage::list_team_schedules(conn, team_id)?;
    Ok(schedules.iter().map(|s| project(s, actor.id)).collect())
}

pub fn create_schedule(
    conn: &mut Connection,
    actor: &User,
    request: &ScheduleRequest,
) -> Result<LoadedSchedule, ServiceError> {
    if let Err(err) = authorize(Action::Create, None, actor).into_result(Action::Create) {
        warn!("⚠️ User {} tried to create a schedule without a team", actor.id);
        return Err(err);
    }
    let team_id = actor.team_id.ok_or(ServiceError::InternalServerError)?;
    let fields = build_fields(request, None).map_err(ServiceError::ValidationFailed)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let schedule_id = schedule_storage::insert_schedule(&tx, team_id, actor.id, &fields)?;
    let errors = insert_participants(
        &tx,
        schedule_id,
        actor.id,
        &request.participants,
        request.personal_note.as_deref(),
    )?;
    if !errors.is_empty() {
        tx.rollback()?;
        warn!("⚠️ Schedule creation by user {} rolled back", actor.id);
        return Err(ServiceError::ValidationFailed(errors));
    }
    tx.commit()?;

    info!("✅ Schedule {} created by user {}", schedule_id, actor.id);
    schedule_storage::load_schedule(conn, schedule_id)?.ok_or(ServiceError::InternalServerError)
}

// Update core fields and replace the whole participant set
pub fn update_schedule(
    conn: &mut Connection,
    actor: &User,
    schedule_id: i64,
    request: &ScheduleRequest,
) -> Result<LoadedSchedule, ServiceError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let existing = load_permitted(&tx, Action::Update, schedule_id, actor)?;
    let fields =
        build_fields(request, Some(&existing.schedule)).map_err(ServiceError::ValidationFailed)?;

    schedule_storage::update_schedule_fields(&tx, schedule_id, &fields)?;
    let removed = schedule_storage::delete_participants(&tx, schedule_id)?;
    debug!("Cleared {} participants of schedule {}", removed, schedule_id);

    let errors = insert_participants(
        &tx,
        schedule_id,
        actor.id,
        &request.participants,
        request.personal_note.as_deref(),
    )?;
    if !errors.is_empty() {
        tx.rollback()?;
        warn!("⚠️ Update of schedule {} by user {} rolled back", schedule_id, actor.id);
        return Err(ServiceError::ValidationFailed(errors));
    }
    tx.commit()?;

    info!("✅ Schedule {} updated by user {}", schedule_id, actor.id);
    schedule_storage::load_schedule(conn, schedule_id)?.ok_or(ServiceError::InternalServerError)
}

pub fn delete_schedule(conn: &mut Connection, actor: &User, schedule_id: i64) -> Result<(), ServiceError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    load_permitted(&tx, Action::Destroy, schedule_id, actor)?;
    schedule_storage::delete_schedule(&tx, schedule_id)?;
    tx.commit()?;

    info!("🗑️ Schedule {} deleted by user {}", schedule_id, actor.id);
    Ok(())
}

// `{id, name}` of each participant, in insertion order
pub fn participant_summaries(
    conn: &Connection,
    loaded: &LoadedSchedule,
) -> Result<Vec<UserSummary>, ServiceError> {
    let mut summaries = Vec::with_capacity(loaded.participants.len());
    for participant in &loaded.participants {
        if let Some(user) = user_storage::find_user_by_id(conn, participant.user_id)? {
            summaries.push(user.summary());
        }
    }
    Ok(summaries)
}

fn load_permitted(
    conn: &Connection,
    action: Action,
    schedule_id: i64,
    actor: &User,
) -> Result<LoadedSchedule, ServiceError> {
    let existing = schedule_storage::load_schedule(conn, schedule_id)?;
    if let Err(err) = authorize(action, existing.as_ref(), actor).into_result(action) {
        warn!(
            "⚠️ User {} denied {:?} on schedule {}",
            actor.id, action, schedule_id
        );
        return Err(err);
    }
    existing.ok_or(ServiceError::InternalServerError)
}

// Insert one participant row per resolvable id. Only the actor's own row gets
// the submitted personal note. Unknown ids are skipped; uniqueness failures are
// collected so the caller can roll back with every message at once.
fn insert_participants(
    conn: &Connection,
    schedule_id: i64,
    actor_id: i64,
    participant_ids: &[i64],
    personal_note: Option<&str>,
) -> Result<Vec<String>, ServiceError> {
    let mut errors = Vec::new();

    for &user_id in participant_ids {
        if !user_storage::user_exists(conn, user_id)? {
            debug!("Skipping unknown participant {} for schedule {}", user_id, schedule_id);
            continue;
        }

        let note = if user_id == actor_id { personal_note } else { None };
        match schedule_storage::insert_participant(conn, schedule_id, user_id, note) {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                errors.push(format!("Participant {} has already been taken", user_id));
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(errors)
}

// Merge the request over the stored schedule (if any) and validate the result
fn build_fields(
    request: &ScheduleRequest,
    existing: Option<&Schedule>,
) -> Result<ScheduleFields, Vec<String>> {
    let mut errors = Vec::new();

    let title = match (request.title.as_deref().map(str::trim), existing) {
        (Some(title), _) if !title.is_empty() => title.to_string(),
        (None, Some(schedule)) => schedule.title.clone(),
        (_, None) => DEFAULT_TITLE.to_string(),
        (Some(_), Some(_)) => {
            errors.push("Title can't be blank".to_string());
            String::new()
        }
    };

    let start_time = resolve_time(
        "Start time",
        request.start_time.as_deref(),
        existing.map(|s| s.start_time),
        &mut errors,
    );
    let end_time = resolve_time(
        "End time",
        request.end_time.as_deref(),
        existing.map(|s| s.end_time),
        &mut errors,
    );
    let all_day = request
        .all_day
        .or(existing.map(|s| s.all_day))
        .unwrap_or(false);
    let visibility = request
        .visibility
        .or(existing.map(|s| s.visibility))
        .unwrap_or(true);
    let note = match &request.note {
        Some(note) => Some(note.clone()),
        None => existing.and_then(|s| s.note.clone()),
    };

    if let (Some(start), Some(end)) = (start_time, end_time) {
        if start > end {
            errors.push("End time must be after start time".to_string());
        } else if !all_day && start.date() != end.date() {
            errors.push("Timed events must start and end on the same day".to_string());
        }
    }

    match (start_time, end_time) {
        (Some(start_time), Some(end_time)) if errors.is_empty() => Ok(ScheduleFields {
            title,
            start_time,
            end_time,
            all_day,
            visibility,
            note,
        }),
        _ => Err(errors),
    }
}

fn resolve_time(
    label: &str,
    submitted: Option<&str>,
    stored: Option<chrono::NaiveDateTime>,
    errors: &mut Vec<String>,
) -> Option<chrono::NaiveDateTime> {
    match submitted {
        Some(raw) if !raw.trim().is_empty() => {
            let parsed = parse_local_time(raw);
            if parsed.is_none() {
                errors.push(format!("{} is invalid", label));
            }
            parsed
        }
        _ => {
            if stored.is_none() {
                errors.push(format!("{} can't be blank", label));
            }
            stored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_db_in_memory;
    use crate::policy::PRIVATE_SENTINEL;
    use crate::utils::{team_storage, user_storage};

    struct Fixture {
        conn: Connection,
        a: User,
        b: User,
        c: User,
    }

    // A and B share a team; C is on another team
    fn fixture() -> Fixture {
        let conn = open_db_in_memory().unwrap();
        let blue = team_storage::create_team(&conn, "Blue").unwrap();
        let red = team_storage::create_team(&conn, "Red").unwrap();
        let make = |name: &str, team: i64| {
            let user = user_storage::create_user(&conn, name, &format!("{}@example.com", name), "h").unwrap();
            user_storage::set_team(&conn, user.id, team).unwrap();
            user_storage::find_user_by_id(&conn, user.id).unwrap().unwrap()
        };
        let a = make("a", blue.id);
        let b = make("b", blue.id);
        let c = make("c", red.id);
        Fixture { conn, a, b, c }
    }

    fn request(participants: Vec<i64>, visibility: bool) -> ScheduleRequest {
        ScheduleRequest {
            title: Some("Design sync".to_string()),
            start_time: Some("2025-08-01T10:00".to_string()),
            end_time: Some("2025-08-01T11:00".to_string()),
            all_day: Some(false),
            visibility: Some(visibility),
            note: Some("Agenda in doc".to_string()),
            personal_note: Some("prep questions".to_string()),
            participants,
        }
    }

    fn schedule_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM schedules", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn blank_title_gets_default() {
        let mut f = fixture();
        let mut req = request(vec![], true);
        req.title = Some("   ".to_string());

        let created = create_schedule(&mut f.conn, &f.a, &req).unwrap();
        assert_eq!(created.schedule.title, DEFAULT_TITLE);
        assert_eq!(created.schedule.team_id, f.a.team_id.unwrap());
    }

    #[test]
    fn user_without_team_cannot_create() {
        let mut f = fixture();
        let loner = user_storage::create_user(&f.conn, "l", "l@example.com", "h").unwrap();

        let err = create_schedule(&mut f.conn, &loner, &request(vec![], true)).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(matches!(list_schedules(&f.conn, &loner), Err(ServiceError::Forbidden(_))));
    }

    #[test]
    fn personal_note_only_attaches_to_actor() {
        let mut f = fixture();
        let created = create_schedule(&mut f.conn, &f.a, &request(vec![f.a.id, f.b.id], true)).unwrap();

        let a_row = created.participant(f.a.id).unwrap();
        let b_row = created.participant(f.b.id).unwrap();
        assert_eq!(a_row.personal_note.as_deref(), Some("prep questions"));
        assert_eq!(b_row.personal_note, None);
    }

    #[test]
    fn unknown_participants_are_skipped() {
        let mut f = fixture();
        let created = create_schedule(&mut f.conn, &f.a, &request(vec![f.a.id, 9999], true)).unwrap();
        assert_eq!(created.member_ids(), vec![f.a.id]);
    }

    #[test]
    fn duplicate_participant_rolls_back_creation() {
        let mut f = fixture();
        let err = create_schedule(&mut f.conn, &f.a, &request(vec![f.b.id, f.b.id], true)).unwrap_err();

        match err {
            ServiceError::ValidationFailed(messages) => {
                assert_eq!(messages, vec![format!("Participant {} has already been taken", f.b.id)]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(schedule_count(&f.conn), 0);
        assert!(list_schedules(&f.conn, &f.a).unwrap().is_empty());
    }

    #[test]
    fn invalid_time_ranges_are_rejected() {
        let mut f = fixture();

        let mut backwards = request(vec![], true);
        backwards.start_time = Some("2025-08-01T12:00".to_string());
        let err = create_schedule(&mut f.conn, &f.a, &backwards).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationFailed(ref m) if m == &vec!["End time must be after start time".to_string()]));

        let mut overnight = request(vec![], true);
        overnight.end_time = Some("2025-08-02T09:00".to_string());
        let err = create_schedule(&mut f.conn, &f.a, &overnight).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationFailed(_)));

        overnight.all_day = Some(true);
        assert!(create_schedule(&mut f.conn, &f.a, &overnight).is_ok());

        let mut missing = request(vec![], true);
        missing.start_time = None;
        missing.end_time = Some("soon".to_string());
        match create_schedule(&mut f.conn, &f.a, &missing).unwrap_err() {
            ServiceError::ValidationFailed(messages) => assert_eq!(
                messages,
                vec!["Start time can't be blank".to_string(), "End time is invalid".to_string()]
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn private_schedule_scenario_across_teams() {
        let mut f = fixture();
        create_schedule(&mut f.conn, &f.a, &request(vec![f.a.id], false)).unwrap();

        let seen_by_b = list_schedules(&f.conn, &f.b).unwrap();
        assert_eq!(seen_by_b.len(), 1);
        assert_eq!(seen_by_b[0].title, PRIVATE_SENTINEL);
        assert_eq!(seen_by_b[0].note.as_deref(), Some(PRIVATE_SENTINEL));
        assert_eq!(seen_by_b[0].members, vec![f.a.id]);
        assert_eq!(seen_by_b[0].personal_note, None);

        let seen_by_a = list_schedules(&f.conn, &f.a).unwrap();
        assert_eq!(seen_by_a[0].title, "Design sync");
        assert_eq!(seen_by_a[0].personal_note.as_deref(), Some("prep questions"));

        assert!(list_schedules(&f.conn, &f.c).unwrap().is_empty());
    }

    #[test]
    fn update_replaces_participants_and_drops_other_notes() {
        let mut f = fixture();
        let created = create_schedule(&mut f.conn, &f.a, &request(vec![f.a.id, f.b.id], true)).unwrap();
        let id = created.schedule.id;

        // B updates with its own note; A's note is not resubmitted so it is lost
        let mut by_b = request(vec![f.a.id, f.b.id], true);
        by_b.personal_note = Some("b's reminder".to_string());
        let updated = update_schedule(&mut f.conn, &f.b, id, &by_b).unwrap();
        assert_eq!(updated.participant(f.a.id).unwrap().personal_note, None);
        assert_eq!(
            updated.participant(f.b.id).unwrap().personal_note.as_deref(),
            Some("b's reminder")
        );

        // B removes itself; B is no longer permitted afterwards
        let only_a = request(vec![f.a.id], true);
        let updated = update_schedule(&mut f.conn, &f.b, id, &only_a).unwrap();
        assert_eq!(updated.member_ids(), vec![f.a.id]);
        assert!(matches!(
            update_schedule(&mut f.conn, &f.b, id, &only_a),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn partial_update_keeps_stored_fields() {
        let mut f = fixture();
        let created = create_schedule(&mut f.conn, &f.a, &request(vec![f.a.id], false)).unwrap();

        let patch = ScheduleRequest {
            visibility: Some(true),
            participants: vec![f.a.id],
            ..ScheduleRequest::default()
        };
        let updated = update_schedule(&mut f.conn, &f.a, created.schedule.id, &patch).unwrap();
        assert!(updated.schedule.visibility);
        assert_eq!(updated.schedule.title, "Design sync");
        assert_eq!(updated.schedule.note.as_deref(), Some("Agenda in doc"));
        assert_eq!(updated.schedule.start_time, created.schedule.start_time);

        let blank = ScheduleRequest {
            title: Some(String::new()),
            ..ScheduleRequest::default()
        };
        assert!(matches!(
            update_schedule(&mut f.conn, &f.a, created.schedule.id, &blank),
            Err(ServiceError::ValidationFailed(_))
        ));
    }

    #[test]
    fn failed_update_leaves_schedule_untouched() {
        let mut f = fixture();
        let created = create_schedule(&mut f.conn, &f.a, &request(vec![f.a.id], true)).unwrap();
        let id = created.schedule.id;

        let mut bad = request(vec![f.a.id, f.b.id, f.b.id], false);
        bad.title = Some("Renamed".to_string());
        assert!(matches!(
            update_schedule(&mut f.conn, &f.a, id, &bad),
            Err(ServiceError::ValidationFailed(_))
        ));

        let reloaded = schedule_storage::load_schedule(&f.conn, id).unwrap().unwrap();
        assert_eq!(reloaded.schedule.title, "Design sync");
        assert!(reloaded.schedule.visibility);
        assert_eq!(reloaded.member_ids(), vec![f.a.id]);
        assert_eq!(
            reloaded.participant(f.a.id).unwrap().personal_note.as_deref(),
            Some("prep questions")
        );
    }

    #[test]
    fn delete_by_outsider_is_denied_and_schedule_survives() {
        let mut f = fixture();
        let created = create_schedule(&mut f.conn, &f.a, &request(vec![f.a.id], true)).unwrap();
        let id = created.schedule.id;

        assert!(matches!(
            delete_schedule(&mut f.conn, &f.b, id),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            delete_schedule(&mut f.conn, &f.b, id + 100),
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(list_schedules(&f.conn, &f.b).unwrap().len(), 1);

        delete_schedule(&mut f.conn, &f.a, id).unwrap();
        assert_eq!(schedule_count(&f.conn), 0);
    }

    #[test]
    fn participant_may_delete() {
        let mut f = fixture();
        let created = create_schedule(&mut f.conn, &f.a, &request(vec![f.b.id], true)).unwrap();

        delete_schedule(&mut f.conn, &f.b, created.schedule.id).unwrap();
        assert!(list_schedules(&f.conn, &f.a).unwrap().is_empty());
    }
}
