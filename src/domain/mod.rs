// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums and traits that describe the pipeline:
// what a stage is, which states a run moves through, how a run
// can end, and the contract of the external trainer.
//
// Rules for this layer:
//   - NO file I/O
//   - NO archive or CSV handling
//   - NO model math
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Stage descriptor, training context, state machine and outcomes
pub mod stage;

// The TrainingProcedure contract
pub mod traits;

// ExtractionError and PipelineError
pub mod error;
