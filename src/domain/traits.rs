// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The pipeline never knows how a model is fitted. It only hands
// a TrainingProcedure three things:
//   - the shared TrainingContext (seed)
//   - the path of the extracted CSV
//   - the path where the model artifact must be written
//
// Implementations:
//   - LinearTrainer → the baseline logistic-regression trainer
//   - any closure with the same signature (used by tests as spies)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §13 (Closures)

use anyhow::Result;
use std::path::Path;

use crate::domain::stage::TrainingContext;

// ─── TrainingProcedure ────────────────────────────────────────────────────────
/// The external training collaborator.
///
/// The procedure owns everything about the model: reading the data,
/// fitting, evaluating and persisting the artifact to `model_out`.
pub trait TrainingProcedure {
    fn train(&self, ctx: &TrainingContext, dataset: &Path, model_out: &Path) -> Result<()>;
}

/// Any matching closure is a training procedure.
impl<F> TrainingProcedure for F
where
    F: Fn(&TrainingContext, &Path, &Path) -> Result<()>,
{
    fn train(&self, ctx: &TrainingContext, dataset: &Path, model_out: &Path) -> Result<()> {
        self(ctx, dataset, model_out)
    }
}
