// ============================================================
// Layer 2 — Pipeline Configuration
// ============================================================
// Everything the run needs to know, with defaults that reproduce
// the fixed two-stage layout:
//
//   <base>/Data/MalwareDataSet.csv.zip  → <base>/pe_model.zip
//   <base>/Data/URLDataSet.csv.zip      → <base>/url_model.zip
//   <base>/logs/model_training.log.<date>
//
// <base> is the directory of the executable. An optional
// <base>/pipeline.json overrides any subset of the fields; there
// are no command-line flags and no environment variables.
//
// Relative paths are always resolved against base_dir.
//
// Reference: serde documentation (#[serde(default)])

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::archive::{ArchiveExtractor, DEFAULT_TABULAR_SUFFIX};
use crate::domain::stage::{TrainingContext, TrainingStage};
use crate::ml::trainer::{LinearTrainer, TrainerConfig};

/// Optional override file looked up in the base directory
pub const CONFIG_FILE_NAME: &str = "pipeline.json";

/// One stage as configured: names only, no behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub name:         String,
    /// File name of the archive inside `data_dir`
    pub dataset_file: String,
    /// Model artifact path, relative to `base_dir`
    pub model_file:   PathBuf,
    #[serde(default)]
    pub trainer:      TrainerConfig,
}

impl StageConfig {
    pub fn new(name: &str, dataset_file: &str, model_file: &str) -> Self {
        Self {
            name:         name.to_string(),
            dataset_file: dataset_file.to_string(),
            model_file:   PathBuf::from(model_file),
            trainer:      TrainerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub base_dir:       PathBuf,
    pub data_dir:       PathBuf,
    pub log_dir:        PathBuf,
    pub log_file:       String,
    /// Where extracted datasets go; the system temp dir when None
    pub work_dir:       Option<PathBuf>,
    pub seed:           u64,
    pub tabular_suffix: String,
    pub stages:         Vec<StageConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir:       PathBuf::new(),
            data_dir:       PathBuf::from("Data"),
            log_dir:        PathBuf::from("logs"),
            log_file:       "model_training.log".to_string(),
            work_dir:       None,
            seed:           42,
            tabular_suffix: DEFAULT_TABULAR_SUFFIX.to_string(),
            stages:         vec![
                StageConfig::new("PE",  "MalwareDataSet.csv.zip", "pe_model.zip"),
                StageConfig::new("URL", "URLDataSet.csv.zip",     "url_model.zip"),
            ],
        }
    }
}

impl PipelineConfig {
    /// Defaults rooted at `base_dir`
    pub fn for_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into(), ..Self::default() }
    }

    /// Defaults, overridden by `<base_dir>/pipeline.json` when present.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::for_base_dir(base_dir));
        }

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config '{}'", path.display()))?;
        let mut config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config '{}'", path.display()))?;

        config.base_dir = if config.base_dir.as_os_str().is_empty() {
            base_dir.to_path_buf()
        } else {
            base_dir.join(&config.base_dir)
        };
        Ok(config)
    }

    /// Absolute paths pass through; relative ones are joined to base_dir
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn dataset_path(&self, stage: &StageConfig) -> PathBuf {
        self.resolve(&self.data_dir).join(&stage.dataset_file)
    }

    pub fn model_path(&self, stage: &StageConfig) -> PathBuf {
        self.resolve(&stage.model_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.log_dir)
    }

    pub fn work_dir(&self) -> PathBuf {
        match &self.work_dir {
            Some(dir) => self.resolve(dir),
            None      => std::env::temp_dir(),
        }
    }

    pub fn context(&self) -> TrainingContext {
        TrainingContext::new(self.seed)
    }

    pub fn extractor(&self) -> ArchiveExtractor {
        ArchiveExtractor::new(self.work_dir()).with_suffix(self.tabular_suffix.as_str())
    }

    /// Turn the configured stages into runnable descriptors, each
    /// backed by a LinearTrainer. Metrics go to the log directory
    /// unless a stage says otherwise.
    pub fn build_stages(&self) -> Vec<TrainingStage> {
        self.stages
            .iter()
            .map(|stage| {
                let mut trainer = stage.trainer.clone();
                trainer.metrics_dir = Some(match &trainer.metrics_dir {
                    Some(dir) => self.resolve(dir),
                    None      => self.log_dir(),
                });

                TrainingStage::new(
                    stage.name.as_str(),
                    self.dataset_path(stage),
                    self.model_path(stage),
                    LinearTrainer::new(stage.name.as_str(), trainer),
                )
            })
            .collect()
    }
}
