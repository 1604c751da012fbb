// ============================================================
// Layer 6 — Log Sink
// ============================================================
// The process-wide log sink, modelled as a scoped resource:
//
//   let _log = logging::init(&config)?;   ← acquired first in main
//   ...run the pipeline...
//                                         ← dropped on every exit path
//
// Two outputs:
//   - console:  human-readable tracing fmt output on stdout
//   - file:     logs/model_training.log.<yyyy-mm-dd>, rolled daily,
//               append-only, no ANSI colours
//
// The file writer is a tracing-appender non_blocking writer. Its
// WorkerGuard is owned by LogGuard; dropping LogGuard flushes every
// buffered line and closes the file. Drop also runs while a panic
// unwinds, so the file is finalized even on a crash.
//
// Reference: tracing-subscriber documentation (registry, fmt layers)
//            tracing-appender documentation (rolling, non_blocking)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use tracing::Subscriber;
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter directive. No environment variable is consulted.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owns the file writer of the process-wide log sink.
/// Flushes and closes the rolling log file when dropped.
#[derive(Debug)]
#[must_use = "dropping the LogGuard closes the log file immediately"]
pub struct LogGuard {
    file_guard: Option<WorkerGuard>,
    log_dir:    PathBuf,
}

impl LogGuard {
    /// Directory holding the rolling log files
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        tracing::info!("Closing log sink in '{}'", self.log_dir.display());
        // Dropping the WorkerGuard blocks until the writer thread has
        // written every queued line, then closes the file.
        drop(self.file_guard.take());
    }
}

/// Install console + daily rolling file logging.
///
/// If another global subscriber is already installed (e.g. in tests)
/// that subscriber is kept and only the guard is returned.
pub fn init(log_dir: &Path, file_name: &str) -> Result<LogGuard> {
    let (file_writer, file_guard) = file_sink(log_dir, file_name)?;

    if let Err(e) = subscriber(file_writer).try_init() {
        tracing::debug!("Keeping existing tracing subscriber: {e}");
    }

    tracing::info!(
        "Logging to console and '{}'",
        log_dir.join(file_name).display()
    );

    Ok(LogGuard {
        file_guard: Some(file_guard),
        log_dir:    log_dir.to_path_buf(),
    })
}

/// Daily rolling `log_dir/file_name.<date>` behind a non-blocking writer
fn file_sink(log_dir: &Path, file_name: &str) -> Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Cannot create log directory '{}'", log_dir.display()))?;

    let appender = rolling::daily(log_dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Console layer plus an ANSI-free file layer, both behind the default filter
fn subscriber(file_writer: NonBlocking) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry()
        .with(EnvFilter::new(DEFAULT_LOG_FILTER))
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
}
