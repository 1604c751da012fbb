// ============================================================
// Layer 5 — ML Layer (Baseline Trainer)
// ============================================================
// The pipeline only sees the TrainingProcedure trait. This layer
// is the one implementation the binary ships with: a seeded
// logistic-regression trainer for tabular CSV data.
//
//   features.rs — picks the label column, encodes numeric cells
//                 directly and hashes text cells into buckets
//
//   model.rs    — standardizer, linear model, evaluation metrics
//
//   trainer.rs  — LinearTrainer: split, SGD epochs with early
//                 stopping, evaluation, artifact persistence

/// CSV row → feature vector encoding
pub mod features;

/// Logistic-regression model and evaluation
pub mod model;

/// The TrainingProcedure used for the PE and URL stages
pub mod trainer;
