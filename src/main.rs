#![allow(dead_code)]

mod application;
mod domain;
mod data;
mod ml;
mod infra;

use anyhow::{Context, Result};
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use application::{
    config::PipelineConfig,
    train_use_case::{models_summary, TrainUseCase},
};
use domain::{error::render_chain, stage::PipelineOutcome};
use infra::logging::{self, LogGuard};

/// Exit status when every stage trained
const EXIT_SUCCESS: u8 = 0;

/// Exit status on any failure, including setup errors
const EXIT_FAILURE: u8 = 1;

/// Exit status when a dataset archive is absent
const EXIT_MISSING_INPUT: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run() -> Result<ExitCode> {
    // Held until the end of this function, then flushed and closed
    let (config, _log) = load_config(&base_dir()?)?;

    let report = TrainUseCase::new(config).execute();

    match &report.outcome {
        PipelineOutcome::Completed { models } => {
            println!("{}", models_summary(models));
        }
        PipelineOutcome::MissingInput { stage, path } => {
            eprintln!("{stage} dataset file missing at {}", path.display());
        }
        PipelineOutcome::Failed { error } => {
            eprintln!("Model training failed: {}", render_chain(error));
        }
    }
    Ok(ExitCode::from(exit_status(&report.outcome)))
}

/// Load the pipeline config and open its log sink.
///
/// A config that cannot be loaded is still written to the durable
/// log, using the default `logs/` directory under `base_dir`.
fn load_config(base_dir: &Path) -> Result<(PipelineConfig, LogGuard)> {
    match PipelineConfig::load(base_dir) {
        Ok(config) => {
            let log = logging::init(&config.log_dir(), &config.log_file)?;
            Ok((config, log))
        }
        Err(e) => {
            let fallback = PipelineConfig::for_base_dir(base_dir);
            let _log = logging::init(&fallback.log_dir(), &fallback.log_file)?;
            tracing::error!("Cannot load pipeline configuration: {e:#}");
            Err(e)
        }
    }
}

/// Process exit status for a finished run
fn exit_status(outcome: &PipelineOutcome) -> u8 {
    match outcome {
        PipelineOutcome::Completed { .. }    => EXIT_SUCCESS,
        PipelineOutcome::Failed { .. }       => EXIT_FAILURE,
        PipelineOutcome::MissingInput { .. } => EXIT_MISSING_INPUT,
    }
}

/// Directory containing the running executable
fn base_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Cannot locate the running executable")?;
    exe.parent()
        .map(|p| p.to_path_buf())
        .with_context(|| format!("Executable '{}' has no parent directory", exe.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use application::config::CONFIG_FILE_NAME;
    use domain::error::PipelineError;
    use std::{fs, io};

    #[test]
    fn test_completed_run_exits_zero() {
        let outcome = PipelineOutcome::Completed {
            models: vec![PathBuf::from("pe_model.zip"), PathBuf::from("url_model.zip")],
        };
        assert_eq!(exit_status(&outcome), 0);
    }

    #[test]
    fn test_failed_run_exits_one() {
        let outcome = PipelineOutcome::Failed {
            error: PipelineError::Cleanup {
                stage:  "PE".into(),
                path:   PathBuf::from("/tmp/dataset-x.csv"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "locked"),
            },
        };
        assert_eq!(exit_status(&outcome), 1);
    }

    #[test]
    fn test_missing_input_exits_two() {
        let outcome = PipelineOutcome::MissingInput {
            stage: "URL".into(),
            path:  PathBuf::from("Data/URLDataSet.csv.zip"),
        };
        assert_eq!(exit_status(&outcome), 2);
    }

    #[test]
    fn test_invalid_config_still_opens_default_log_dir() {
        let base = tempfile::tempdir().unwrap();
        fs::write(base.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();

        let err = load_config(base.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid config"));
        assert!(base.path().join("logs").is_dir());
    }

    #[test]
    fn test_valid_config_opens_configured_log_dir() {
        let base = tempfile::tempdir().unwrap();
        fs::write(base.path().join(CONFIG_FILE_NAME), r#"{ "log_dir": "run-logs" }"#).unwrap();

        let (config, log) = load_config(base.path()).unwrap();
        assert_eq!(log.log_dir(), base.path().join("run-logs"));
        assert_eq!(config.log_dir(), base.path().join("run-logs"));
    }
}
