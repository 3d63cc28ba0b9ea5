//! Session history persistence

use crate::{SqliteStore, StoreError};
use rusqlite::params;
use trigon_domain::session::unix_now;
use trigon_domain::{HistoryStatistics, SessionRecord};

impl SqliteStore {
    /// Save a finished session, replacing any earlier save with the same id
    pub fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let data = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT INTO sessions (session_id, data, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(session_id) DO UPDATE SET data = excluded.data",
            params![record.session_id, data, unix_now() as i64],
        )?;
        Ok(())
    }

    /// Saved sessions, most recent first
    pub fn load_sessions(&self, limit: Option<usize>, offset: usize) -> Result<Vec<SessionRecord>, StoreError> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let mut stmt = self
            .conn
            .prepare("SELECT data FROM sessions ORDER BY id DESC LIMIT ?1 OFFSET ?2")?;
        let rows = stmt
            .query_map(params![limit, offset as i64], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.iter()
            .map(|data| serde_json::from_str(data).map_err(StoreError::from))
            .collect()
    }

    /// Every saved session, oldest first
    pub fn all_sessions(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let mut records = self.load_sessions(None, 0)?;
        records.reverse();
        Ok(records)
    }

    /// Number of saved sessions
    pub fn session_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Aggregate statistics over every saved session
    pub fn statistics(&self) -> Result<HistoryStatistics, StoreError> {
        Ok(HistoryStatistics::from_records(&self.all_sessions()?))
    }
}
