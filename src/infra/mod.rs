// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several other layers:
//
//   logging.rs     — The process-wide log sink. Console output
//                    plus a daily rolling file under logs/,
//                    released through a LogGuard on every exit
//                    path.
//
//   model_store.rs — Model artifact persistence. Writes the
//                    trained model and its evaluation into a
//                    zip at the stage's output path and reads
//                    them back.
//
//   metrics.rs     — Training metrics logging. Appends epoch
//                    metrics to logs/<stage>_metrics.csv.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Scoped console + rolling-file log sink
pub mod logging;

/// Model artifact saving and loading
pub mod model_store;

/// Epoch metrics CSV logger
pub mod metrics;
