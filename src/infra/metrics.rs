// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records per-epoch training metrics to a CSV file, one file
// per stage, next to the rolling log:
//
//   logs/pe_metrics.csv
//   logs/url_metrics.csv
//
// Metrics recorded per epoch:
//   - epoch:        the epoch number (1, 2, 3, ...)
//   - train_loss:   mean log loss on the training split
//   - val_loss:     mean log loss on the validation split
//   - val_accuracy: fraction of validation rows classified correctly
//
// Example CSV output:
//   epoch,train_loss,val_loss,val_accuracy
//   1,0.412300,0.430100,0.871000
//   2,0.355800,0.371200,0.894000
//
// The file is append-only across runs; the header is written
// once when the file is first created.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean log loss over the training split
    pub train_loss: f64,

    /// Mean log loss over the validation split.
    /// Drives early stopping.
    pub val_loss: f64,

    /// Range [0.0, 1.0]
    pub val_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, val_accuracy: f64) -> Self {
        Self { epoch, train_loss, val_loss, val_accuracy }
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Appends epoch metrics for one stage to a CSV file.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a logger writing `<dir>/<stage>_metrics.csv`.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: &Path, stage: &str) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join(format!("{}_metrics.csv", stage.to_lowercase()));

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "epoch,train_loss,val_loss,val_accuracy")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot append to '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.val_loss, m.val_accuracy,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
