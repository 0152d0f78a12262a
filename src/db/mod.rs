// teamcal-service/src/db/mod.rs
// SQLite bootstrap for the schedule store.
//
// Connections returned from here have `foreign_keys=ON` and every migration
// applied. Foreign keys never cascade; dependent rows are removed explicitly
// by the storage helpers inside the caller's transaction.

use crate::models::ServiceError;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

pub mod migrations;

// Shared handle kept in actix `web::Data`
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>, ServiceError> {
        self.conn.lock().map_err(|e| {
            error!("❌ Database lock poisoned: {:?}", e);
            ServiceError::InternalServerError
        })
    }
}

pub fn open_db(path: impl AsRef<Path>) -> rusqlite::Result<Connection> {
    let path = path.as_ref();
    let mut conn = Connection::open(path)?;
    bootstrap_connection(&mut conn)?;
    info!("✅ Opened database at {}", path.display());
    Ok(conn)
}

pub fn open_db_in_memory() -> rusqlite::Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    bootstrap_connection(&mut conn)?;
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    migrations::apply_migrations(conn)
}
