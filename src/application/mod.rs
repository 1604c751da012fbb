// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer sequences the other layers into a training run.
//
// Rules for this layer:
//   - No model math here (Layer 5)
//   - No printing here (Layer 1)
//   - No archive or CSV parsing here (Layer 4)
//   - Only workflow coordination: stage order, fail-fast policy,
//     temp-file cleanup, outcome reporting
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Paths, seed and stage list for a run
pub mod config;

// The stage orchestrator and the TrainUseCase wrapper
pub mod train_use_case;
