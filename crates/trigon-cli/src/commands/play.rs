//! Play command implementation.

use crate::cli::PlayArgs;
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::Formatter;
use crate::play::{EditorSource, PlaySession};
use rand::rngs::StdRng;
use rand::SeedableRng;
use trigon_domain::{Engine, EngineConfig};
use trigon_store::SqliteStore;

/// Engine settings for this run, with command-line overrides applied
pub fn engine_config(args: &PlayArgs, config: &CliConfig) -> EngineConfig {
    let mut engine = config.engine.clone();
    if let Some(size) = args.recent_window {
        engine = engine.with_recent_window(size);
    }
    if args.lenient {
        engine = engine.lenient_multipliers();
    }
    engine
}

/// Run an interactive session in the terminal.
pub fn execute_play(
    args: PlayArgs,
    store: &SqliteStore,
    config: &CliConfig,
    formatter: &Formatter,
) -> Result<()> {
    let engine = Engine::new(engine_config(&args, config));
    let answers = store.answer_options()?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut input = EditorSource::new()?;
    let session_id = uuid::Uuid::now_v7().to_string();

    println!(
        "{}",
        formatter.info("Answer by number or text; 'q' stops and asks for feedback")
    );

    let record = PlaySession::new(&engine, store, &answers, formatter, std::io::stdout())
        .run(&session_id, &mut input, &mut rng)?;

    if args.no_save {
        println!("{}", formatter.info("Session not saved"));
    } else {
        store.save_session(&record)?;
        println!("{}", formatter.success(&format!("Session {} saved", record.session_id)));
    }

    Ok(())
}
