// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a compressed dataset on disk and the rows
// a trainer consumes:
//
//   Data/<name>.csv.zip
//       │
//       ▼
//   ArchiveExtractor  → first .csv entry → temp file
//       │
//       ▼
//   Table             → header + string cells
//       │
//       ▼
//   split_train_val   → seeded shuffle, train/validation split
//
// Reference: zip, tempfile, csv and rand crate documentation

/// Extracts the tabular entry of a .csv.zip into a temp file
pub mod archive;

/// Loads a CSV file into an in-memory table
pub mod tabular;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
