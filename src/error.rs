//! Error taxonomy shared by the persistence layer and the view-model.
//!
//! SQLite errors are classified on the way in so callers can tell a rejected
//! write (bad input, constraint) apart from a store that can no longer be used.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The record is missing a required field and was never sent to the store.
    #[error("{0}")]
    Invalid(String),
    /// SQLite rejected the write because of a key or foreign-key constraint.
    #[error("constraint violated: {0}")]
    Constraint(String),
    /// The database cannot be used any more (I/O failure, corruption, lock
    /// poisoned, runtime gone). Fatal to the session.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("database schema version {found} is newer than supported version {expected}")]
    Schema { expected: i32, found: i32 },
    #[error("SQLite error: {0}")]
    Sqlite(#[source] rusqlite::Error),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

impl StoreError {
    /// True when the session cannot continue against this store.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Schema { .. })
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => StoreError::Constraint(err.to_string()),
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::NotADatabase
                | ErrorCode::DiskFull
                | ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied,
            ) => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Sqlite(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Reject blank names before they reach the store so no half-formed entity is
/// ever persisted.
pub(crate) fn require_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        Err(StoreError::Invalid(format!("{kind} name is required.")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn foreign_key_failure_maps_to_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (parent_id INTEGER NOT NULL REFERENCES parent(id));",
        )
        .unwrap();

        let err: StoreError = conn
            .execute("INSERT INTO child (parent_id) VALUES (42)", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn blank_names_are_invalid() {
        assert!(require_name("Movie", "Inception").is_ok());
        let err = require_name("Movie", "   ").unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert_eq!(err.to_string(), "Movie name is required.");
    }
}
