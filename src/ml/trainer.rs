// ============================================================
// Layer 5 — Baseline Training Procedure
// ============================================================
// LinearTrainer is the training collaborator the binary ships with.
// It implements TrainingProcedure, so the pipeline treats it as an
// opaque capability exactly like any other trainer.
//
//   extracted .csv ─▶ Table ─▶ FeatureSchema ─▶ seeded split
//        ─▶ SGD logistic regression (early stopping)
//        ─▶ Evaluation ─▶ ModelStore::save(model_out)
//
// Reference: rand crate documentation (StdRng, SliceRandom)

use anyhow::{bail, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{splitter::split_train_val, tabular::Table};
use crate::domain::{stage::TrainingContext, traits::TrainingProcedure};
use crate::infra::{
    metrics::{EpochMetrics, MetricsLogger},
    model_store::ModelStore,
};
use crate::ml::{
    features::{FeatureSchema, LabeledRow},
    model::{LinearModel, Standardizer},
};

/// Hyperparameters of the baseline trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Label column header; inferred when None
    pub label_column:   Option<String>,
    pub epochs:         usize,
    pub learning_rate:  f64,
    pub l2:             f64,
    pub train_fraction: f64,
    /// Buckets per hashed text column
    pub hash_buckets:   usize,
    /// Epochs without validation improvement before stopping
    pub patience:       usize,
    /// Where <stage>_metrics.csv is written; None disables it
    pub metrics_dir:    Option<PathBuf>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            label_column:   None,
            epochs:         20,
            learning_rate:  0.05,
            l2:             1e-4,
            train_fraction: 0.8,
            hash_buckets:   32,
            patience:       3,
            metrics_dir:    None,
        }
    }
}

pub struct LinearTrainer {
    stage:  String,
    config: TrainerConfig,
}

impl LinearTrainer {
    pub fn new(stage: impl Into<String>, config: TrainerConfig) -> Self {
        Self { stage: stage.into(), config }
    }
}

impl TrainingProcedure for LinearTrainer {
    fn train(&self, ctx: &TrainingContext, dataset: &Path, model_out: &Path) -> Result<()> {
        let cfg = &self.config;

        let table = Table::from_csv(dataset)?;
        if table.row_count() == 0 {
            bail!("dataset '{}' has no data rows", dataset.display());
        }

        let schema = FeatureSchema::infer(&table, cfg.label_column.as_deref(), cfg.hash_buckets)?;
        let rows   = schema.encode_table(&table)?;
        let positives = rows.iter().filter(|r| r.label >= 0.5).count();
        if positives == 0 || positives == rows.len() {
            bail!("labels in column '{}' are all one class", schema.label_column);
        }
        tracing::info!(
            stage = %self.stage,
            "{} rows, {} features, label '{}' ({} positive)",
            rows.len(),
            schema.dimension(),
            schema.label_column,
            positives,
        );

        let mut rng = StdRng::seed_from_u64(ctx.seed);
        let (train, val) = split_train_val(rows, cfg.train_fraction, &mut rng);
        if train.is_empty() {
            bail!("train_fraction {} leaves no training rows", cfg.train_fraction);
        }

        let standardizer = Standardizer::fit(&train, schema.dimension());
        let standardize  = |rows: &[LabeledRow]| -> Vec<(Vec<f64>, f64)> {
            rows.iter()
                .map(|r| (standardizer.transform(&r.features), r.label))
                .collect()
        };
        let train = standardize(&train);
        let val   = if val.is_empty() {
            tracing::warn!(stage = %self.stage, "No validation rows; evaluating on the training split");
            train.clone()
        } else {
            standardize(&val)
        };

        let metrics = match &cfg.metrics_dir {
            Some(dir) => Some(MetricsLogger::new(dir, &self.stage)?),
            None      => None,
        };

        let model = fit(
            LinearModel::new(schema, standardizer),
            &train,
            &val,
            cfg,
            &mut rng,
            |m| {
                tracing::info!(
                    stage = %self.stage,
                    "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
                    m.epoch, cfg.epochs, m.train_loss, m.val_loss, m.val_accuracy * 100.0,
                );
                match &metrics {
                    Some(logger) => logger.log(m),
                    None         => Ok(()),
                }
            },
        )?;

        let evaluation = model.evaluate(&val);
        tracing::info!(
            stage = %self.stage,
            "Validation: accuracy={:.3} precision={:.3} recall={:.3} log_loss={:.4}",
            evaluation.accuracy, evaluation.precision, evaluation.recall, evaluation.log_loss,
        );

        ModelStore::save(model_out, &model, &evaluation)?;
        tracing::info!(stage = %self.stage, "Model written to '{}'", model_out.display());
        Ok(())
    }
}

/// SGD over shuffled training rows, one pass per epoch.
/// Returns the weights of the epoch with the lowest validation loss.
fn fit(
    mut model:    LinearModel,
    train:        &[(Vec<f64>, f64)],
    val:          &[(Vec<f64>, f64)],
    cfg:          &TrainerConfig,
    rng:          &mut StdRng,
    mut on_epoch: impl FnMut(&EpochMetrics) -> Result<()>,
) -> Result<LinearModel> {
    let mut order: Vec<usize> = (0..train.len()).collect();
    let mut best      = model.clone();
    let mut best_loss = f64::INFINITY;
    let mut stale     = 0usize;

    for epoch in 1..=cfg.epochs {
        order.shuffle(rng);
        for &i in &order {
            let (x, y) = &train[i];
            let error  = model.probability(x) - y;
            for (w, xi) in model.weights.iter_mut().zip(x) {
                *w -= cfg.learning_rate * (error * xi + cfg.l2 * *w);
            }
            model.bias -= cfg.learning_rate * error;
        }

        let metrics = EpochMetrics::new(
            epoch,
            model.log_loss(train),
            model.log_loss(val),
            model.evaluate(val).accuracy,
        );
        on_epoch(&metrics)?;

        if metrics.is_improvement(best_loss) {
            best_loss = metrics.val_loss;
            best      = model.clone();
            stale     = 0;
        } else {
            stale += 1;
            if stale >= cfg.patience.max(1) {
                tracing::debug!("Early stop after epoch {epoch}: no improvement in {stale} epochs");
                break;
            }
        }
    }

    Ok(best)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// label = 1 when x > 0, with a noise column and a text column
    fn separable_csv() -> String {
        let mut csv = String::from("x,noise,host,label\n");
        for i in 0..200 {
            let x     = (i as f64 - 100.0) / 10.0;
            let label = if x > 0.0 { "malicious" } else { "benign" };
            let host  = if x > 0.0 { "evil.example" } else { "good.example" };
            csv.push_str(&format!("{x},{},{host},{label}\n", i % 7));
        }
        csv
    }

    #[test]
    fn test_trains_and_writes_artifact() {
        let dir     = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("data.csv");
        let out     = dir.path().join("pe_model.zip");
        fs::write(&dataset, separable_csv()).unwrap();

        let config = TrainerConfig { metrics_dir: Some(dir.path().join("logs")), ..Default::default() };
        LinearTrainer::new("PE", config)
            .train(&TrainingContext::default(), &dataset, &out)
            .unwrap();

        let model = ModelStore::load(&out).unwrap();
        assert_eq!(model.schema.label_column, "label");
        let eval = ModelStore::load_evaluation(&out).unwrap();
        assert!(eval.accuracy > 0.9, "accuracy was {}", eval.accuracy);

        let positive = ["8.5", "0", "evil.example", "?"].map(String::from);
        assert!(model.predict_row(&positive).unwrap() > 0.5);

        let metrics = fs::read_to_string(dir.path().join("logs").join("pe_metrics.csv")).unwrap();
        assert!(metrics.lines().count() >= 2);
    }

    #[test]
    fn test_same_seed_same_model() {
        let dir     = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("data.csv");
        fs::write(&dataset, separable_csv()).unwrap();

        let trainer = LinearTrainer::new("URL", TrainerConfig::default());
        let (a, b)  = (dir.path().join("a.zip"), dir.path().join("b.zip"));
        trainer.train(&TrainingContext::new(7), &dataset, &a).unwrap();
        trainer.train(&TrainingContext::new(7), &dataset, &b).unwrap();

        assert_eq!(ModelStore::load(&a).unwrap(), ModelStore::load(&b).unwrap());
    }

    #[test]
    fn test_single_class_dataset_fails() {
        let dir     = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("data.csv");
        let out     = dir.path().join("model.zip");
        fs::write(&dataset, "x,label\n1,1\n2,1\n3,1\n").unwrap();

        let err = LinearTrainer::new("PE", TrainerConfig::default())
            .train(&TrainingContext::default(), &dataset, &out)
            .unwrap_err();
        assert!(err.to_string().contains("all one class"));
        assert!(!out.exists());
    }

    #[test]
    fn test_header_only_dataset_fails() {
        let dir     = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("data.csv");
        fs::write(&dataset, "x,label\n").unwrap();

        let result = LinearTrainer::new("PE", TrainerConfig::default()).train(
            &TrainingContext::default(),
            &dataset,
            &dir.path().join("model.zip"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_early_stopping_keeps_best_epoch() {
        let schema = FeatureSchema::infer(
            &Table {
                headers: vec!["x".into(), "label".into()],
                rows:    vec![vec!["1".into(), "1".into()], vec!["-1".into(), "0".into()]],
            },
            None,
            4,
        )
        .unwrap();
        let model = LinearModel::new(schema, Standardizer { means: vec![0.0], scales: vec![1.0] });
        let train = vec![(vec![1.0], 1.0), (vec![-1.0], 0.0)];
        // Validation labels are flipped, so every step makes val_loss worse
        let val   = vec![(vec![1.0], 0.0), (vec![-1.0], 1.0)];
        let cfg   = TrainerConfig { epochs: 50, patience: 2, ..Default::default() };

        let mut epochs = 0;
        let best = fit(model, &train, &val, &cfg, &mut StdRng::seed_from_u64(1), |_| {
            epochs += 1;
            Ok(())
        })
        .unwrap();

        assert_eq!(epochs, 3);
        // Best is epoch 1: the weight has moved once, toward the training labels
        assert!(best.weights[0] > 0.0);
    }
}
