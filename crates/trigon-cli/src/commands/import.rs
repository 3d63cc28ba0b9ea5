//! Import command implementation.

use crate::cli::ImportArgs;
use crate::error::Result;
use crate::output::Formatter;
use trigon_store::{KnowledgeSeed, SqliteStore};

/// Load a seed file into the database.
pub fn execute_import(args: ImportArgs, store: &mut SqliteStore, formatter: &Formatter) -> Result<()> {
    let seed = KnowledgeSeed::from_file(&args.seed)?;
    let summary = store.import_seed(&seed)?;

    println!("{}", formatter.format_import(&summary)?);
    println!(
        "{}",
        formatter.success(&format!("Imported {}", args.seed.display()))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use trigon_domain::traits::KnowledgeBase;

    #[test]
    fn test_import_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "answers": [{{"id": 1, "text": "Yes"}}],
                "questions": [{{"id": 1, "text": "Is one angle 90 degrees?", "difficulty": 1}}]
            }}"#
        )
        .unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let formatter = Formatter::new(OutputFormat::Json, false);
        let args = ImportArgs {
            seed: file.path().to_path_buf(),
        };

        execute_import(args, &mut store, &formatter).unwrap();
        assert_eq!(store.active_questions().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_seed_file() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let formatter = Formatter::new(OutputFormat::Table, false);
        let args = ImportArgs {
            seed: "/nonexistent/seed.json".into(),
        };

        assert!(execute_import(args, &mut store, &formatter).is_err());
    }
}
