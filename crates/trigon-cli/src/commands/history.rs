//! History command implementation.

use crate::cli::HistoryArgs;
use crate::error::Result;
use crate::output::Formatter;
use trigon_store::SqliteStore;

/// Show saved sessions or their statistics.
pub fn execute_history(args: HistoryArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    if args.stats {
        println!("{}", formatter.format_statistics(&store.statistics()?)?);
        return Ok(());
    }

    let sessions = store.load_sessions(Some(args.limit), args.offset)?;
    println!("{}", formatter.format_sessions(&sessions)?);

    let total = store.session_count()?;
    if total > args.offset + sessions.len() {
        println!(
            "{}",
            formatter.info(&format!(
                "Showing {} of {} sessions (use --offset to page)",
                sessions.len(),
                total
            ))
        );
    }
    Ok(())
}
