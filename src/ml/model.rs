use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ml::features::{FeatureSchema, LabeledRow};

/// Clamp for probabilities fed to ln() in the log loss
const EPS: f64 = 1e-12;

/// Per-feature mean/scale fitted on the training split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub means:  Vec<f64>,
    pub scales: Vec<f64>,
}

impl Standardizer {
    pub fn fit(rows: &[LabeledRow], dimension: usize) -> Self {
        let n = rows.len().max(1) as f64;
        let mut means = vec![0.0; dimension];
        for row in rows {
            for (m, x) in means.iter_mut().zip(&row.features) {
                *m += x / n;
            }
        }

        let mut scales = vec![0.0; dimension];
        for row in rows {
            for ((s, x), m) in scales.iter_mut().zip(&row.features).zip(&means) {
                *s += (x - m).powi(2) / n;
            }
        }
        // Constant columns keep scale 1 so they map to 0
        for s in &mut scales {
            *s = if *s > 0.0 { s.sqrt() } else { 1.0 };
        }

        Self { means, scales }
    }

    pub fn transform(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}

/// Binary logistic-regression model over standardized features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub schema:       FeatureSchema,
    pub standardizer: Standardizer,
    pub weights:      Vec<f64>,
    pub bias:         f64,
}

impl LinearModel {
    /// All-zero weights: predicts 0.5 for everything
    pub fn new(schema: FeatureSchema, standardizer: Standardizer) -> Self {
        let dimension = schema.dimension();
        Self { schema, standardizer, weights: vec![0.0; dimension], bias: 0.0 }
    }

    /// P(label = 1) for an already standardized feature vector
    pub fn probability(&self, standardized: &[f64]) -> f64 {
        let z = self.bias
            + self.weights.iter().zip(standardized).map(|(w, x)| w * x).sum::<f64>();
        sigmoid(z)
    }

    /// P(label = 1) for a raw CSV row
    pub fn predict_row(&self, row: &[String]) -> Result<f64> {
        let features = self.schema.encode(row)?;
        Ok(self.probability(&self.standardizer.transform(&features)))
    }

    /// Mean log loss over standardized rows
    pub fn log_loss(&self, rows: &[(Vec<f64>, f64)]) -> f64 {
        if rows.is_empty() {
            return f64::NAN;
        }
        let total: f64 = rows
            .iter()
            .map(|(x, y)| {
                let p = self.probability(x).clamp(EPS, 1.0 - EPS);
                -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            })
            .sum();
        total / rows.len() as f64
    }

    pub fn evaluate(&self, rows: &[(Vec<f64>, f64)]) -> Evaluation {
        let (mut tp, mut fp, mut tn, mut fneg) = (0usize, 0usize, 0usize, 0usize);
        for (x, y) in rows {
            let predicted = self.probability(x) >= 0.5;
            match (predicted, *y >= 0.5) {
                (true, true)   => tp += 1,
                (true, false)  => fp += 1,
                (false, false) => tn += 1,
                (false, true)  => fneg += 1,
            }
        }

        let ratio = |num: usize, den: usize| if den > 0 { num as f64 / den as f64 } else { 0.0 };
        Evaluation {
            samples:   rows.len(),
            accuracy:  ratio(tp + tn, rows.len()),
            precision: ratio(tp, tp + fp),
            recall:    ratio(tp, tp + fneg),
            log_loss:  self.log_loss(rows),
        }
    }
}

/// Validation-set quality of a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub samples:   usize,
    pub accuracy:  f64,
    pub precision: f64,
    pub recall:    f64,
    pub log_loss:  f64,
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::features::{ColumnKind, FeatureColumn};

    fn schema() -> FeatureSchema {
        FeatureSchema {
            label_column: "label".into(),
            label_index:  1,
            columns:      vec![FeatureColumn { name: "x".into(), index: 0, kind: ColumnKind::Numeric }],
            hash_buckets: 4,
        }
    }

    fn row(x: f64, label: f64) -> LabeledRow {
        LabeledRow { features: vec![x], label }
    }

    #[test]
    fn test_standardizer_centers_and_scales() {
        let rows = vec![row(1.0, 0.0), row(3.0, 1.0)];
        let st   = Standardizer::fit(&rows, 1);
        assert_eq!(st.means, vec![2.0]);
        assert_eq!(st.scales, vec![1.0]);
        assert_eq!(st.transform(&[3.0]), vec![1.0]);
    }

    #[test]
    fn test_constant_column_scale_is_one() {
        let st = Standardizer::fit(&[row(5.0, 0.0), row(5.0, 1.0)], 1);
        assert_eq!(st.scales, vec![1.0]);
        assert_eq!(st.transform(&[5.0]), vec![0.0]);
    }

    #[test]
    fn test_untrained_model_predicts_half() {
        let model = LinearModel::new(schema(), Standardizer::fit(&[row(0.0, 0.0)], 1));
        assert_eq!(model.predict_row(&["7".into(), "1".into()]).unwrap(), 0.5);
    }

    #[test]
    fn test_predict_on_empty_row_is_an_error() {
        let model = LinearModel::new(schema(), Standardizer::fit(&[row(0.0, 0.0)], 1));
        assert!(model.predict_row(&[]).is_err());
    }

    #[test]
    fn test_evaluation_counts() {
        let mut model = LinearModel::new(schema(), Standardizer::fit(&[row(0.0, 0.0)], 1));
        model.weights = vec![10.0];
        let rows = vec![
            (vec![1.0], 1.0),
            (vec![-1.0], 0.0),
            (vec![1.0], 0.0),
            (vec![-1.0], 1.0),
        ];
        let eval = model.evaluate(&rows);
        assert_eq!(eval.samples, 4);
        assert_eq!(eval.accuracy, 0.5);
        assert_eq!(eval.precision, 0.5);
        assert_eq!(eval.recall, 0.5);
        assert!(eval.log_loss > 0.0);
    }

    #[test]
    fn test_sigmoid_midpoint() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(20.0) > 0.999);
    }
}
