use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::tabular::Table;

/// Header names tried, in order, when no label column is configured
const LABEL_CANDIDATES: [&str; 4] = ["label", "class", "target", "malicious"];

const POSITIVE_LABELS: [&str; 8] = [
    "1", "true", "yes", "malicious", "malware", "bad", "phishing", "positive",
];
const NEGATIVE_LABELS: [&str; 8] = [
    "0", "false", "no", "benign", "good", "legitimate", "clean", "negative",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Parsed as f64, empty cells become 0
    Numeric,
    /// Hashed character 3-grams
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name:  String,
    pub index: usize,
    pub kind:  ColumnKind,
}

/// How a CSV row becomes a feature vector. Saved inside the model
/// artifact so rows can be encoded identically at prediction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub label_column: String,
    pub label_index:  usize,
    pub columns:      Vec<FeatureColumn>,
    pub hash_buckets: usize,
}

/// One encoded training row
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRow {
    pub features: Vec<f64>,
    pub label:    f64,
}

impl FeatureSchema {
    /// Pick the label column and classify every other column.
    pub fn infer(table: &Table, label_column: Option<&str>, hash_buckets: usize) -> Result<Self> {
        if table.column_count() < 2 {
            bail!("dataset needs a label column and at least one feature column");
        }

        let label_index = match label_column {
            Some(name) => table
                .column_index(name)
                .with_context(|| format!("label column '{name}' not found in header"))?,
            None => LABEL_CANDIDATES
                .iter()
                .find_map(|c| table.column_index(c))
                .unwrap_or(table.column_count() - 1),
        };

        let columns = table
            .headers
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != label_index)
            .map(|(index, name)| {
                let numeric = table
                    .column(index)
                    .all(|cell| cell.is_empty() || cell.parse::<f64>().is_ok());
                FeatureColumn {
                    name: name.clone(),
                    index,
                    kind: if numeric { ColumnKind::Numeric } else { ColumnKind::Text },
                }
            })
            .collect();

        Ok(Self {
            label_column: table.headers[label_index].clone(),
            label_index,
            columns,
            hash_buckets: hash_buckets.max(1),
        })
    }

    /// Length of every encoded feature vector
    pub fn dimension(&self) -> usize {
        self.columns
            .iter()
            .map(|c| match c.kind {
                ColumnKind::Numeric => 1,
                ColumnKind::Text    => self.hash_buckets,
            })
            .sum()
    }

    /// Encode one row. Fails when the row is too short for the schema.
    pub fn encode(&self, row: &[String]) -> Result<Vec<f64>> {
        let needed = self.columns.iter().map(|c| c.index + 1).max().unwrap_or(0);
        if row.len() < needed {
            bail!("row has {} cells, schema needs {needed}", row.len());
        }

        let mut out = Vec::with_capacity(self.dimension());
        for column in &self.columns {
            let cell = row[column.index].as_str();
            match column.kind {
                ColumnKind::Numeric => out.push(parse_numeric(cell)),
                ColumnKind::Text    => out.extend(hash_trigrams(cell, self.hash_buckets)),
            }
        }
        Ok(out)
    }

    /// Encode every row of `table` together with its binary label.
    pub fn encode_table(&self, table: &Table) -> Result<Vec<LabeledRow>> {
        table
            .rows
            .iter()
            .enumerate()
            .map(|(line, row)| {
                let cell = row
                    .get(self.label_index)
                    .with_context(|| format!("data row {} has no label cell", line + 1))?;
                let label = parse_label(cell).with_context(|| {
                    format!("unrecognised label '{cell}' in data row {}", line + 1)
                })?;
                let features = self
                    .encode(row)
                    .with_context(|| format!("cannot encode data row {}", line + 1))?;
                Ok(LabeledRow { features, label })
            })
            .collect()
    }
}

fn parse_numeric(cell: &str) -> f64 {
    // Non-finite values would poison the standardizer
    cell.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Map a label cell to 1.0 (positive) or 0.0 (negative).
pub fn parse_label(cell: &str) -> Option<f64> {
    if let Ok(v) = cell.parse::<f64>() {
        return Some(if v > 0.5 { 1.0 } else { 0.0 });
    }
    let lower = cell.to_ascii_lowercase();
    if POSITIVE_LABELS.contains(&lower.as_str()) {
        Some(1.0)
    } else if NEGATIVE_LABELS.contains(&lower.as_str()) {
        Some(0.0)
    } else {
        None
    }
}

/// Count lower-cased character 3-grams into `buckets` slots,
/// scaled to unit length.
fn hash_trigrams(text: &str, buckets: usize) -> Vec<f64> {
    let mut counts = vec![0.0; buckets];
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    if chars.is_empty() {
        return counts;
    }

    let grams: Vec<&[char]> = if chars.len() < 3 {
        vec![chars.as_slice()]
    } else {
        chars.windows(3).collect()
    };
    for gram in grams {
        let bucket = (fnv1a(gram) % buckets as u64) as usize;
        counts[bucket] += 1.0;
    }

    let norm = counts.iter().map(|c| c * c).sum::<f64>().sqrt();
    counts.iter_mut().for_each(|c| *c /= norm);
    counts
}

/// 64-bit FNV-1a, stable across platforms and releases
fn fnv1a(gram: &[char]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for ch in gram {
        let mut buf = [0u8; 4];
        for byte in ch.encode_utf8(&mut buf).bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
    }
    hash
}
