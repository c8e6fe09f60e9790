use std::fs;
use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version. Increment when adding migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// How long a statement waits on a lock held by another process before
/// giving up with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS movie (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS actor (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS movie_actor (
    movie_id INTEGER NOT NULL,
    actor_id INTEGER NOT NULL,
    PRIMARY KEY (movie_id, actor_id),
    FOREIGN KEY(movie_id) REFERENCES movie(id) ON DELETE CASCADE,
    FOREIGN KEY(actor_id) REFERENCES actor(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS movie_actor_actor_idx ON movie_actor(actor_id);
";

/// Open (or create) the catalog database at `path` and make sure the schema is
/// in place. Parent directories are created on demand.
///
/// Foreign keys are enabled on the connection so the cascade rules on
/// `movie_actor` behave the same in tests and production runs.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")?;
    ensure_schema(&conn)?;
    log::info!("opened catalog database at {}", path.display());
    Ok(conn)
}

/// Open an in-memory database with the full schema. Used by the tests.
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create every table if missing and record the schema version. Idempotent.
/// A database stamped by a newer build is refused instead of being modified.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    let found: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    if found > SCHEMA_VERSION {
        return Err(StoreError::Schema {
            expected: SCHEMA_VERSION,
            found,
        });
    }
    if found < SCHEMA_VERSION {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [SCHEMA_VERSION],
        )?;
        log::debug!("schema stamped at version {SCHEMA_VERSION}");
    }

    Ok(())
}
