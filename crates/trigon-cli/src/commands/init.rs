//! Init command implementation.

use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;
use trigon_store::SqliteStore;

/// Create (or upgrade) the database schema.
pub fn execute_init(db: &Path, formatter: &Formatter) -> Result<()> {
    SqliteStore::new(db)?;
    tracing::info!(path = %db.display(), "Database initialized");
    println!("{}", formatter.success(&format!("Database ready at {}", db.display())));
    Ok(())
}
