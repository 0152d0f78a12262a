// teamcal-service/src/utils/schedule_storage.rs
use crate::models::{
    LoadedSchedule, Schedule, ScheduleFields, ScheduleParticipant, UserSummary, TIME_FORMAT,
};
use crate::utils::{now_local, parse_stored_time};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const SCHEDULE_SELECT_SQL: &str = "SELECT
    s.id,
    s.team_id,
    s.creator_id,
    s.title,
    s.start_time,
    s.end_time,
    s.all_day,
    s.visibility,
    s.note,
    s.created_at,
    s.updated_at,
    u.name
FROM schedules s
JOIN users u ON u.id = s.creator_id";

fn parse_schedule_row(row: &Row<'_>) -> rusqlite::Result<(Schedule, UserSummary)> {
    let schedule = Schedule {
        id: row.get(0)?,
        team_id: row.get(1)?,
        creator_id: row.get(2)?,
        title: row.get(3)?,
        start_time: parse_stored_time(row, 4)?,
        end_time: parse_stored_time(row, 5)?,
        all_day: row.get(6)?,
        visibility: row.get(7)?,
        note: row.get(8)?,
        created_at: parse_stored_time(row, 9)?,
        updated_at: parse_stored_time(row, 10)?,
    };
    let creator = UserSummary {
        id: schedule.creator_id,
        name: row.get(11)?,
    };
    Ok((schedule, creator))
}

fn parse_participant_row(row: &Row<'_>) -> rusqlite::Result<ScheduleParticipant> {
    Ok(ScheduleParticipant {
        id: row.get(0)?,
        schedule_id: row.get(1)?,
        user_id: row.get(2)?,
        personal_note: row.get(3)?,
    })
}

pub fn insert_schedule(
    conn: &Connection,
    team_id: i64,
    creator_id: i64,
    fields: &ScheduleFields,
) -> rusqlite::Result<i64> {
    let now = now_local().format(TIME_FORMAT).to_string();
    conn.execute(
        "INSERT INTO schedules (
            team_id, creator_id, title, start_time, end_time,
            all_day, visibility, note, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            team_id,
            creator_id,
            fields.title,
            fields.start_time.format(TIME_FORMAT).to_string(),
            fields.end_time.format(TIME_FORMAT).to_string(),
            fields.all_day,
            fields.visibility,
            fields.note,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_schedule_fields(
    conn: &Connection,
    schedule_id: i64,
    fields: &ScheduleFields,
) -> rusqlite::Result<()> {
    let now = now_local().format(TIME_FORMAT).to_string();
    conn.execute(
        "UPDATE schedules SET
            title = ?1,
            start_time = ?2,
            end_time = ?3,
            all_day = ?4,
            visibility = ?5,
            note = ?6,
            updated_at = ?7
        WHERE id = ?8",
        params![
            fields.title,
            fields.start_time.format(TIME_FORMAT).to_string(),
            fields.end_time.format(TIME_FORMAT).to_string(),
            fields.all_day,
            fields.visibility,
            fields.note,
            now,
            schedule_id,
        ],
    )?;
    Ok(())
}

// Load a schedule with its creator and participant rows
pub fn load_schedule(conn: &Connection, schedule_id: i64) -> rusqlite::Result<Option<LoadedSchedule>> {
    let row = conn
        .query_row(
            &format!("{} WHERE s.id = ?1", SCHEDULE_SELECT_SQL),
            params![schedule_id],
            parse_schedule_row,
        )
        .optional()?;

    let Some((schedule, creator)) = row else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT id, schedule_id, user_id, personal_note
         FROM schedule_participants
         WHERE schedule_id = ?1
         ORDER BY id",
    )?;
    let participants = stmt
        .query_map(params![schedule_id], parse_participant_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Some(LoadedSchedule {
        schedule,
        creator,
        participants,
    }))
}

// Every schedule owned by a team, earliest first. Other teams' rows are never read.
pub fn list_team_schedules(conn: &Connection, team_id: i64) -> rusqlite::Result<Vec<LoadedSchedule>> {
    let mut stmt = conn.prepare(
        "SELECT sp.id, sp.schedule_id, sp.user_id, sp.personal_note
         FROM schedule_participants sp
         JOIN schedules s ON s.id = sp.schedule_id
         WHERE s.team_id = ?1
         ORDER BY sp.id",
    )?;
    let mut participants_by_schedule: HashMap<i64, Vec<ScheduleParticipant>> = HashMap::new();
    for participant in stmt.query_map(params![team_id], parse_participant_row)? {
        let participant = participant?;
        participants_by_schedule
            .entry(participant.schedule_id)
            .or_default()
            .push(participant);
    }

    let mut stmt = conn.prepare(&format!(
        "{} WHERE s.team_id = ?1 ORDER BY s.start_time ASC, s.id ASC",
        SCHEDULE_SELECT_SQL
    ))?;
    let schedules = stmt
        .query_map(params![team_id], parse_schedule_row)?
        .map(|row| {
            row.map(|(schedule, creator)| {
                let participants = participants_by_schedule
                    .remove(&schedule.id)
                    .unwrap_or_default();
                LoadedSchedule {
                    schedule,
                    creator,
                    participants,
                }
            })
        })
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!("Loaded {} schedules for team {}", schedules.len(), team_id);
    Ok(schedules)
}

pub fn insert_participant(
    conn: &Connection,
    schedule_id: i64,
    user_id: i64,
    personal_note: Option<&str>,
) -> rusqlite::Result<i64> {
    let now = now_local().format(TIME_FORMAT).to_string();
    conn.execute(
        "INSERT INTO schedule_participants (schedule_id, user_id, personal_note, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![schedule_id, user_id, personal_note, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_participants(conn: &Connection, schedule_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM schedule_participants WHERE schedule_id = ?1",
        params![schedule_id],
    )
}

// Remove a schedule and its participant rows. Callers run this inside a transaction.
pub fn delete_schedule(conn: &Connection, schedule_id: i64) -> rusqlite::Result<()> {
    let removed = delete_participants(conn, schedule_id)?;
    conn.execute("DELETE FROM schedules WHERE id = ?1", params![schedule_id])?;
    debug!("Deleted schedule {} and {} participant rows", schedule_id, removed);
    Ok(())
}
