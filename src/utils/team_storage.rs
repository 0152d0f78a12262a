// teamcal-service/src/utils/team_storage.rs
use crate::models::{Team, UserSummary, TIME_FORMAT};
use crate::utils::{now_local, parse_stored_time};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

// Save a new team
pub fn create_team(conn: &Connection, name: &str) -> rusqlite::Result<Team> {
    let now = now_local();
    let stamp = now.format(TIME_FORMAT).to_string();
    conn.execute(
        "INSERT INTO teams (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
        params![name, stamp],
    )?;
    let id = conn.last_insert_rowid();
    info!("✅ Saved team: {}", id);

    Ok(Team {
        id,
        name: name.to_string(),
        created_at: now,
    })
}

pub fn find_team_by_id(conn: &Connection, team_id: i64) -> rusqlite::Result<Option<Team>> {
    conn.query_row(
        "SELECT id, name, created_at FROM teams WHERE id = ?1",
        params![team_id],
        |row| {
            Ok(Team {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: parse_stored_time(row, 2)?,
            })
        },
    )
    .optional()
}

// Members of a team as `{id, name}`
pub fn get_team_members(conn: &Connection, team_id: i64) -> rusqlite::Result<Vec<UserSummary>> {
    let mut stmt = conn.prepare("SELECT id, name FROM users WHERE team_id = ?1 ORDER BY id")?;
    let members = stmt
        .query_map(params![team_id], |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_db_in_memory;
    use crate::utils::user_storage;

    #[test]
    fn members_follow_user_team_assignment() {
        let conn = open_db_in_memory().unwrap();
        let team = create_team(&conn, "Blue").unwrap();
        let other = create_team(&conn, "Red").unwrap();
        let a = user_storage::create_user(&conn, "A", "a@example.com", "h").unwrap();
        let b = user_storage::create_user(&conn, "B", "b@example.com", "h").unwrap();

        user_storage::set_team(&conn, a.id, team.id).unwrap();
        user_storage::set_team(&conn, b.id, team.id).unwrap();
        assert_eq!(get_team_members(&conn, team.id).unwrap().len(), 2);

        user_storage::set_team(&conn, b.id, other.id).unwrap();
        let members = get_team_members(&conn, team.id).unwrap();
        assert_eq!(members, vec![UserSummary { id: a.id, name: "A".to_string() }]);
    }

    #[test]
    fn unknown_team_is_none() {
        let conn = open_db_in_memory().unwrap();
        assert!(find_team_by_id(&conn, 7).unwrap().is_none());
    }
}
