// ============================================================
// Layer 6 — Model Store
// ============================================================
// Persists a trained LinearModel as a zip artifact at the stage's
// configured output path (pe_model.zip, url_model.zip).
//
// What gets saved per artifact:
//   1. model.json      — feature schema, standardizer, weights
//   2. evaluation.json — validation accuracy / precision / recall
//
// Only the training collaborator calls save(). The pipeline never
// touches the output path itself.
//
// Reference: zip crate documentation (ZipWriter)
//            serde_json documentation

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{Read, Write},
    path::Path,
};
use zip::{write::SimpleFileOptions, ZipArchive, ZipWriter};

use crate::ml::model::{Evaluation, LinearModel};

const MODEL_ENTRY:      &str = "model.json";
const EVALUATION_ENTRY: &str = "evaluation.json";

/// Reads and writes model artifacts.
pub struct ModelStore;

impl ModelStore {
    /// Write `model` and `evaluation` into a zip at `path`,
    /// creating parent directories as needed.
    pub fn save(path: &Path, model: &LinearModel, evaluation: &Evaluation) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Cannot create model artifact '{}'", path.display()))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        zip.start_file(MODEL_ENTRY, options)?;
        zip.write_all(&serde_json::to_vec_pretty(model)?)?;

        zip.start_file(EVALUATION_ENTRY, options)?;
        zip.write_all(&serde_json::to_vec_pretty(evaluation)?)?;

        zip.finish()
            .with_context(|| format!("Cannot finalize model artifact '{}'", path.display()))?;

        tracing::debug!("Saved model artifact to '{}'", path.display());
        Ok(())
    }

    /// Load the model from an artifact written by `save`.
    pub fn load(path: &Path) -> Result<LinearModel> {
        let json = read_entry(path, MODEL_ENTRY)?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid {MODEL_ENTRY} in '{}'", path.display()))
    }

    /// Load the validation metrics stored next to the model.
    pub fn load_evaluation(path: &Path) -> Result<Evaluation> {
        let json = read_entry(path, EVALUATION_ENTRY)?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid {EVALUATION_ENTRY} in '{}'", path.display()))
    }
}

fn read_entry(path: &Path, entry: &str) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open model artifact '{}'", path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("'{}' is not a model artifact", path.display()))?;

    let mut content = String::new();
    archive
        .by_name(entry)
        .with_context(|| format!("'{}' has no {entry}", path.display()))?
        .read_to_string(&mut content)?;
    Ok(content)
}
