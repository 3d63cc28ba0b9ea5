//! Calibrate command implementation.

use crate::cli::CalibrateArgs;
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use trigon_domain::CalibrationConfig;
use trigon_store::SqliteStore;

/// Calibration settings for this run, with command-line overrides applied
pub fn calibration_config(args: &CalibrateArgs, config: &CliConfig) -> Result<CalibrationConfig> {
    let mut calibration = config.calibration;
    if let Some(min_sessions) = args.min_sessions {
        calibration.min_sessions = min_sessions;
    }
    if let Some(rate) = args.learning_rate {
        if !(0.0..=1.0).contains(&rate) {
            return Err(CliError::InvalidInput(
                "Learning rate must be between 0.0 and 1.0".to_string(),
            ));
        }
        calibration.learning_rate = rate;
    }
    Ok(calibration)
}

/// Recompute multiplier overrides and theorem statistics from history.
pub fn execute_calibrate(
    args: CalibrateArgs,
    store: &mut SqliteStore,
    config: &CliConfig,
    formatter: &Formatter,
) -> Result<()> {
    let calibration = calibration_config(&args, config)?;
    let report = store.recalibrate(&calibration)?;

    println!("{}", formatter.format_calibration(&report)?);
    if report.sessions == 0 {
        println!("{}", formatter.warning("No saved sessions to learn from"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[test]
    fn test_overrides() {
        let args = CalibrateArgs {
            min_sessions: Some(2),
            learning_rate: Some(0.5),
        };
        let calibration = calibration_config(&args, &CliConfig::default()).unwrap();
        assert_eq!(calibration.min_sessions, 2);
        assert_eq!(calibration.learning_rate, 0.5);
        assert_eq!(calibration.scale_factor, 1.5);
    }

    #[test]
    fn test_learning_rate_out_of_range() {
        let args = CalibrateArgs {
            min_sessions: None,
            learning_rate: Some(1.5),
        };
        assert!(matches!(
            calibration_config(&args, &CliConfig::default()),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_calibrate_empty_history() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let formatter = Formatter::new(OutputFormat::Table, false);
        let args = CalibrateArgs {
            min_sessions: None,
            learning_rate: None,
        };

        execute_calibrate(args, &mut store, &CliConfig::default(), &formatter).unwrap();
    }
}
