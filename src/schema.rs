//! Reference feature schema derived from the training dataset.
//!
//! The schema is built once at startup and never mutated. It is the single
//! source of truth for which raw columns exist, which of them are numeric,
//! and the full level domain of every categorical column.

use crate::feature_encoder::EncodeError;
use crate::types::record::{FeatureValue, RawRecord};
use serde::{Deserialize, Serialize};

/// Kind of a raw feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnKind {
    /// Numeric column with the range observed in the reference data
    Numeric { min: f64, max: f64, integral: bool },
    /// Categorical column; levels in first-seen order
    Categorical { levels: Vec<String> },
}

/// A raw feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ColumnKind::Numeric { .. })
    }

    /// Categorical levels in sorted order (the encoded column order)
    pub fn sorted_levels(&self) -> Option<Vec<String>> {
        match &self.kind {
            ColumnKind::Categorical { levels } => {
                let mut sorted = levels.clone();
                sorted.sort();
                Some(sorted)
            }
            ColumnKind::Numeric { .. } => None,
        }
    }
}

/// Feature schema of the reference dataset, target column excluded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSchema {
    target: String,
    columns: Vec<ColumnSpec>,
}

impl ReferenceSchema {
    pub fn new(target: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            target: target.into(),
            columns,
        }
    }

    /// Infer column kinds from a table of raw values.
    ///
    /// A column is numeric when every non-missing value parses as a float;
    /// otherwise it is categorical. The target column is skipped.
    pub fn infer(target: &str, headers: &[String], rows: &[Vec<FeatureValue>]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() != target)
            .map(|(idx, name)| {
                let values: Vec<&FeatureValue> = rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .filter(|v| !v.is_missing())
                    .collect();
                ColumnSpec {
                    name: name.clone(),
                    kind: infer_kind(&values),
                }
            })
            .collect();

        Self::new(target, columns)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Initial form values: first-seen level or the observed minimum
    pub fn default_record(&self) -> RawRecord {
        self.columns
            .iter()
            .map(|col| {
                let value = match &col.kind {
                    ColumnKind::Numeric { min, .. } => FeatureValue::Number(*min),
                    ColumnKind::Categorical { levels } => levels
                        .first()
                        .map(|l| FeatureValue::Text(l.clone()))
                        .unwrap_or(FeatureValue::Missing),
                };
                (col.name.clone(), value)
            })
            .collect()
    }

    /// Check numeric fields against the reference range.
    ///
    /// Used at the input-collection boundary; the encoder itself does not
    /// enforce ranges.
    pub fn check_bounds(&self, record: &RawRecord) -> Result<(), EncodeError> {
        for col in &self.columns {
            if let ColumnKind::Numeric { min, max, .. } = col.kind {
                let Some(value) = record.get(&col.name).and_then(FeatureValue::as_number) else {
                    continue;
                };
                if value < min || value > max {
                    return Err(EncodeError::OutOfRange {
                        column: col.name.clone(),
                        value,
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}

fn infer_kind(values: &[&FeatureValue]) -> ColumnKind {
    let numbers: Option<Vec<f64>> = values.iter().map(|v| v.as_number()).collect();

    match numbers {
        Some(numbers) if !numbers.is_empty() => {
            let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
            let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let integral = numbers.iter().all(|n| n.fract() == 0.0);
            ColumnKind::Numeric { min, max, integral }
        }
        _ => {
            let mut levels: Vec<String> = Vec::new();
            for level in values.iter().filter_map(|v| v.as_level()) {
                if !levels.contains(&level) {
                    levels.push(level);
                }
            }
            ColumnKind::Categorical { levels }
        }
    }
}
