// ============================================================
// Layer 3 — Stage Domain Types
// ============================================================
// A TrainingStage is one self-contained unit of work:
//
//   <name>.csv.zip ──extract──▶ temp .csv ──train──▶ <model>.zip
//
// Stages are plain data. The orchestrator receives a slice of
// them and runs them strictly in order, so a different pipeline
// is just a different Vec<TrainingStage>.
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

use std::{fmt, path::PathBuf};

use crate::domain::error::PipelineError;
use crate::domain::traits::TrainingProcedure;

/// Shared, read-only context handed to every training procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingContext {
    /// Seed for every random choice a procedure makes
    pub seed: u64,
}

impl TrainingContext {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for TrainingContext {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Declarative description of one training run.
pub struct TrainingStage {
    /// Human-readable name used in every log line ("PE", "URL")
    pub name: String,

    /// The compressed dataset, e.g. Data/MalwareDataSet.csv.zip
    pub archive_path: PathBuf,

    /// Where the procedure must write the model.
    /// The pipeline itself never creates this file.
    pub model_path: PathBuf,

    /// The external training collaborator
    pub procedure: Box<dyn TrainingProcedure>,
}

impl TrainingStage {
    pub fn new(
        name:         impl Into<String>,
        archive_path: impl Into<PathBuf>,
        model_path:   impl Into<PathBuf>,
        procedure:    impl TrainingProcedure + 'static,
    ) -> Self {
        Self {
            name:         name.into(),
            archive_path: archive_path.into(),
            model_path:   model_path.into(),
            procedure:    Box::new(procedure),
        }
    }
}

impl fmt::Debug for TrainingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainingStage")
            .field("name", &self.name)
            .field("archive_path", &self.archive_path)
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

// ─── Pipeline State Machine ───────────────────────────────────────────────────
// Idle → ValidatingInputs(0) → Extracting(0) → Training(0)
//      → ValidatingInputs(1) → ... → Completed
// Failed is reachable from every non-terminal state. No retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    ValidatingInputs { stage: usize },
    Extracting { stage: usize },
    Training { stage: usize },
    Completed,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// How a pipeline run ended.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Every stage trained; model paths in stage order
    Completed { models: Vec<PathBuf> },

    /// A dataset archive was absent. Later stages never ran.
    MissingInput { stage: String, path: PathBuf },

    /// Extraction, training or cleanup failed
    Failed { error: PipelineError },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Outcome plus every state the orchestrator passed through.
#[derive(Debug)]
pub struct PipelineReport {
    pub outcome:     PipelineOutcome,
    pub transitions: Vec<PipelineState>,
}

impl PipelineReport {
    pub fn final_state(&self) -> PipelineState {
        self.transitions.last().copied().unwrap_or(PipelineState::Idle)
    }
}
