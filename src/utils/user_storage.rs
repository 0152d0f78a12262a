// teamcal-service/src/utils/user_storage.rs
use crate::models::{User, TIME_FORMAT};
use crate::utils::{now_local, parse_stored_time};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str =
    "SELECT id, email, encrypted_password, name, team_id, created_at FROM users";

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        team_id: row.get(4)?,
        created_at: parse_stored_time(row, 5)?,
    })
}

// Save a new user and return the stored row
pub fn create_user(
    conn: &Connection,
    name: &str,
    email: &str,
    password_hash: &str,
) -> rusqlite::Result<User> {
    let now = now_local().format(TIME_FORMAT).to_string();
    conn.execute(
        "INSERT INTO users (email, encrypted_password, name, team_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, NULL, ?4, ?4)",
        params![email, password_hash, name, now],
    )?;
    let id = conn.last_insert_rowid();
    info!("✅ Saved user: {}", id);

    find_user_by_id(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

// Find a user by email, ignoring case
pub fn find_user_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("{} WHERE email = ?1 COLLATE NOCASE", USER_SELECT_SQL),
        params![email.trim()],
        parse_user_row,
    )
    .optional()
}

pub fn find_user_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("{} WHERE id = ?1", USER_SELECT_SQL),
        params![id],
        parse_user_row,
    )
    .optional()
}

pub fn user_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

// Move a user onto a team, leaving any previous one
pub fn set_team(conn: &Connection, user_id: i64, team_id: i64) -> rusqlite::Result<()> {
    let now = now_local().format(TIME_FORMAT).to_string();
    conn.execute(
        "UPDATE users SET team_id = ?1, updated_at = ?2 WHERE id = ?3",
        params![team_id, now, user_id],
    )?;
    debug!("User {} now on team {}", user_id, team_id);
    Ok(())
}

// Delete a user together with the schedules they created and every participant
// row that points at either. Callers run this inside a transaction.
pub fn delete_user(conn: &Connection, user_id: i64) -> rusqlite::Result<()> {
    let created_participants = conn.execute(
        "DELETE FROM schedule_participants
         WHERE schedule_id IN (SELECT id FROM schedules WHERE creator_id = ?1)",
        params![user_id],
    )?;
    let created_schedules = conn.execute(
        "DELETE FROM schedules WHERE creator_id = ?1",
        params![user_id],
    )?;
    let own_participants = conn.execute(
        "DELETE FROM schedule_participants WHERE user_id = ?1",
        params![user_id],
    )?;
    conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;

    info!(
        "🗑️ Deleted user {} ({} schedules, {} participant rows)",
        user_id,
        created_schedules,
        created_participants + own_participants
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_db_in_memory;

    #[test]
    fn email_lookup_is_case_insensitive() {
        let conn = open_db_in_memory().unwrap();
        let user = create_user(&conn, "Aki", "aki@example.com", "hash").unwrap();

        let found = find_user_by_email(&conn, "AKI@Example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.team_id, None);
    }

    #[test]
    fn duplicate_email_violates_unique_index() {
        let conn = open_db_in_memory().unwrap();
        create_user(&conn, "Aki", "aki@example.com", "hash").unwrap();

        let err = create_user(&conn, "Other", "Aki@example.com", "hash").unwrap_err();
        assert!(crate::utils::is_unique_violation(&err));
    }

    #[test]
    fn missing_user_is_none() {
        let conn = open_db_in_memory().unwrap();
        assert!(find_user_by_id(&conn, 42).unwrap().is_none());
        assert!(!user_exists(&conn, 42).unwrap());
    }
}
