// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Two error families live here:
//
//   ExtractionError — everything that can go wrong while turning
//                     a .csv.zip archive into a flat temp file
//
//   PipelineError   — what the orchestrator reports for a stage:
//                     missing input, extraction, training, cleanup
//
// Only MissingInput is an expected outcome. Every other variant
// ends the run in the Failed state.
//
// Reference: Rust Book §9 (Error Handling)
//            thiserror crate documentation

use std::{error::Error as StdError, io, path::PathBuf};
use thiserror::Error;

/// Error returned by the training collaborator once it crosses into
/// the pipeline. `anyhow::Error` converts into this via `From`.
pub type TrainingFailure = Box<dyn StdError + Send + Sync + 'static>;

/// Failures of `ArchiveExtractor::extract`.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("cannot open archive '{path}'")]
    Open {
        path:   PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("cannot read entry #{index} of archive '{path}'")]
    Entry {
        path:   PathBuf,
        index:  usize,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("no entry ending in '{suffix}' found in archive '{path}'")]
    NoTabularEntry {
        path:   PathBuf,
        suffix: String,
    },

    #[error("cannot allocate temporary file in '{dir}'")]
    TempFile {
        dir:    PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy entry '{entry}' out of archive '{path}'")]
    Copy {
        path:   PathBuf,
        entry:  String,
        #[source]
        source: io::Error,
    },
}

/// Failures reported by the orchestrator, tagged with the stage name.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{stage} dataset file missing at '{path}'")]
    MissingInput {
        stage: String,
        path:  PathBuf,
    },

    #[error("{stage}: failed to decompress dataset")]
    Extraction {
        stage:  String,
        #[source]
        source: ExtractionError,
    },

    #[error("{stage}: training procedure failed")]
    Training {
        stage:  String,
        #[source]
        source: TrainingFailure,
    },

    #[error("{stage}: cannot delete extracted dataset '{path}'")]
    Cleanup {
        stage:  String,
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Name of the stage the error belongs to
    pub fn stage(&self) -> &str {
        match self {
            Self::MissingInput { stage, .. }
            | Self::Extraction { stage, .. }
            | Self::Training { stage, .. }
            | Self::Cleanup { stage, .. } => stage,
        }
    }

    /// True for the one locally terminable condition
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }
}

/// Render an error and its whole `source()` chain on one line,
/// e.g. "stage: training procedure failed: dataset is empty".
pub fn render_chain(err: &(dyn StdError + 'static)) -> String {
    anyhow::Chain::new(err)
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_chain_includes_sources() {
        let err = PipelineError::Cleanup {
            stage:  "PE".into(),
            path:   PathBuf::from("/tmp/x.csv"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let rendered = render_chain(&err);
        assert!(rendered.starts_with("PE: cannot delete extracted dataset"));
        assert!(rendered.ends_with(": denied"));
    }

    #[test]
    fn test_training_failure_from_anyhow() {
        let source: TrainingFailure = anyhow::anyhow!("labels are all one class").into();
        let err = PipelineError::Training { stage: "URL".into(), source };
        assert_eq!(err.stage(), "URL");
        assert!(!err.is_missing_input());
        assert!(render_chain(&err).contains("labels are all one class"));
    }
}
