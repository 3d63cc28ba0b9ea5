//! Trigon Storage Layer
//!
//! SQLite persistence for the knowledge base the engine reads (questions,
//! multipliers, theorems, statistics) and for the history of finished
//! sessions.
//!
//! # Examples
//!
//! ```no_run
//! use trigon_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Import a seed, then hand the store to the engine
//! ```

#![warn(missing_docs)]

pub mod calibrate;
pub mod history;
pub mod knowledge;
pub mod seed;

pub use calibrate::CalibrationReport;
pub use knowledge::FeedbackOption;
pub use seed::{ImportSummary, KnowledgeSeed};

use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;
use trigon_domain::{Feedback, TriangleCategory};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a seed file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data does not map onto the domain model
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-backed knowledge base and session history
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store between threads
/// behind a mutex, or open one store per thread.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database and make sure the schema exists
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;

        for feedback in Feedback::ALL {
            self.conn.execute(
                "INSERT OR IGNORE INTO feedback_options (feedback_id, text) VALUES (?1, ?2)",
                params![feedback.code(), feedback.description()],
            )?;
        }

        Ok(())
    }
}

/// Decode a stored triangle id inside a row mapper
pub(crate) fn triangle_from_sql(column: usize, raw: i64) -> rusqlite::Result<TriangleCategory> {
    u8::try_from(raw)
        .ok()
        .and_then(TriangleCategory::from_id)
        .ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Integer,
                Box::new(StoreError::InvalidData(format!("Unknown triangle id: {}", raw))),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_seeds_lookup_tables() {
        let store = SqliteStore::new(":memory:").unwrap();

        let triangles: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM triangles", [], |row| row.get(0))
            .unwrap();
        let feedback: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM feedback_options", [], |row| row.get(0))
            .unwrap();

        assert_eq!(triangles, 4);
        assert_eq!(feedback, 4);
    }

    #[test]
    fn test_reopening_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trigon.db");

        SqliteStore::new(&path).unwrap();
        let store = SqliteStore::new(&path).unwrap();

        let answers: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM answer_options", [], |row| row.get(0))
            .unwrap();
        assert_eq!(answers, 4);
    }

    #[test]
    fn test_triangle_from_sql() {
        assert_eq!(triangle_from_sql(0, 3).unwrap(), TriangleCategory::Right);
        assert!(triangle_from_sql(0, 9).is_err());
        assert!(triangle_from_sql(0, -1).is_err());
    }
}
