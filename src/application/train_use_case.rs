// ============================================================
// Layer 2 — TrainUseCase / Pipeline Orchestrator
// ============================================================
// Runs the training stages strictly in order. For each stage:
//
//   Step 1: Validate the dataset archive exists   (fail fast)
//   Step 2: Extract the .csv entry to a temp file (Layer 4)
//   Step 3: Invoke the training procedure         (Layer 5)
//   Step 4: Delete the temp file
//
// Any failure ends the whole run. Later stages are never attempted
// and nothing is retried:
//
//   - missing archive → PipelineOutcome::MissingInput
//   - anything else   → PipelineOutcome::Failed
//
// The temp file is removed on every path: explicitly after a
// successful training call (errors reported as Cleanup), and by
// the ExtractedDataset guard when extraction or training fails.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §13 (Iterators and Closures)

use std::path::PathBuf;

use crate::application::config::PipelineConfig;
use crate::data::archive::ArchiveExtractor;
use crate::domain::{
    error::{render_chain, PipelineError},
    stage::{PipelineOutcome, PipelineReport, PipelineState, TrainingContext, TrainingStage},
};

/// Run `stages` in order and report how the run ended.
///
/// Stages are data: tests pass spy procedures, the binary passes
/// the configured LinearTrainer stages.
pub fn run_pipeline(
    ctx:       &TrainingContext,
    extractor: &ArchiveExtractor,
    stages:    &[TrainingStage],
) -> PipelineReport {
    let mut transitions = vec![PipelineState::Idle];
    let mut models      = Vec::with_capacity(stages.len());

    tracing::info!("Starting training pipeline: {} stage(s)", stages.len());

    for (index, stage) in stages.iter().enumerate() {
        if let Err(error) = run_stage(index, stage, ctx, extractor, &mut transitions) {
            transitions.push(PipelineState::Failed);

            let outcome = match error {
                PipelineError::MissingInput { stage, path } => {
                    tracing::error!("{} dataset file missing at {}", stage, path.display());
                    PipelineOutcome::MissingInput { stage, path }
                }
                error => {
                    tracing::error!(
                        stage = error.stage(),
                        "Error during model training: {}",
                        render_chain(&error)
                    );
                    PipelineOutcome::Failed { error }
                }
            };
            return PipelineReport { outcome, transitions };
        }
        models.push(stage.model_path.clone());
    }

    transitions.push(PipelineState::Completed);
    tracing::info!("Model training completed successfully.");

    PipelineReport {
        outcome: PipelineOutcome::Completed { models },
        transitions,
    }
}

/// One stage: validate → extract → train → delete temp file.
fn run_stage(
    index:       usize,
    stage:       &TrainingStage,
    ctx:         &TrainingContext,
    extractor:   &ArchiveExtractor,
    transitions: &mut Vec<PipelineState>,
) -> Result<(), PipelineError> {
    // ── Step 1: Validate input ───────────────────────────────────────────────
    transitions.push(PipelineState::ValidatingInputs { stage: index });
    if !stage.archive_path.is_file() {
        return Err(PipelineError::MissingInput {
            stage: stage.name.clone(),
            path:  stage.archive_path.clone(),
        });
    }

    // ── Step 2: Extract ──────────────────────────────────────────────────────
    transitions.push(PipelineState::Extracting { stage: index });
    let extracted = extractor
        .extract(&stage.archive_path)
        .map_err(|source| PipelineError::Extraction {
            stage: stage.name.clone(),
            source,
        })?;
    tracing::debug!(
        stage = %stage.name,
        "Decompressed '{}' ({} bytes) to '{}'",
        extracted.entry_name(),
        extracted.bytes(),
        extracted.path().display()
    );

    // ── Step 3: Train ────────────────────────────────────────────────────────
    transitions.push(PipelineState::Training { stage: index });
    tracing::info!("Training {} model...", stage.name);
    // On error `extracted` is dropped here, which deletes the temp file
    stage
        .procedure
        .train(ctx, extracted.path(), &stage.model_path)
        .map_err(|e| PipelineError::Training {
            stage:  stage.name.clone(),
            source: e.into(),
        })?;

    // ── Step 4: Cleanup ──────────────────────────────────────────────────────
    let temp_path = extracted.path().to_path_buf();
    extracted.remove().map_err(|source| PipelineError::Cleanup {
        stage: stage.name.clone(),
        path:  temp_path.clone(),
        source,
    })?;
    tracing::debug!(stage = %stage.name, "Deleted '{}'", temp_path.display());

    Ok(())
}

/// The console summary printed after a successful run
pub fn models_summary(models: &[PathBuf]) -> String {
    let paths: Vec<String> = models.iter().map(|p| p.display().to_string()).collect();
    format!("Models saved to: {}", paths.join(", "))
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the configured stages end to end.
pub struct TrainUseCase {
    config: PipelineConfig,
}

impl TrainUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Build the stage descriptors from config and run them
    pub fn execute(&self) -> PipelineReport {
        let ctx       = self.config.context();
        let extractor = self.config.extractor();
        let stages    = self.config.build_stages();
        tracing::debug!("Extracting datasets into '{}'", extractor.work_dir().display());
        run_pipeline(&ctx, &extractor, &stages)
    }
}
