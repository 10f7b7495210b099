//! One-hot feature encoding for model inference.
//!
//! Raw records are encoded against the fixed category-to-column mapping of
//! the reference schema, so the encoded column set never depends on which
//! levels happen to appear in the input.

use crate::schema::{ColumnKind, ReferenceSchema};
use crate::types::record::{FeatureValue, RawRecord};
use ndarray::Array2;
use thiserror::Error;

/// Errors raised while turning raw records into model features
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeError {
    #[error("row {}: column '{column}' is not part of the reference schema", .row + 1)]
    UnknownColumn { row: usize, column: String },

    #[error("row {}: required column '{column}' is missing", .row + 1)]
    MissingColumn { row: usize, column: String },

    #[error("row {}: numeric column '{column}' has no value", .row + 1)]
    MissingValue { row: usize, column: String },

    #[error("row {}: '{value}' is not a number (column '{column}')", .row + 1)]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {}: '{value}' is not a known level of '{column}'", .row + 1)]
    UnknownCategory {
        row: usize,
        column: String,
        value: String,
    },

    #[error("{column} = {value} is outside the reference range [{min}, {max}]")]
    OutOfRange {
        column: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Encoding plan for one raw column
#[derive(Debug, Clone)]
enum ColumnPlan {
    Numeric {
        name: String,
        offset: usize,
    },
    Categorical {
        name: String,
        offset: usize,
        levels: Vec<String>,
    },
}

/// Encodes raw records into the dense matrix the model was trained on.
///
/// Column order: numeric columns in schema order, then one
/// `<column>_<level>` indicator per categorical level (levels sorted),
/// categorical columns in schema order.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    plans: Vec<ColumnPlan>,
    feature_names: Vec<String>,
}

impl FeatureEncoder {
    /// Build the encoder from a reference schema
    pub fn new(schema: &ReferenceSchema) -> Self {
        let mut plans = Vec::with_capacity(schema.len());
        let mut feature_names = Vec::new();

        for col in schema.columns().iter().filter(|c| c.is_numeric()) {
            plans.push(ColumnPlan::Numeric {
                name: col.name.clone(),
                offset: feature_names.len(),
            });
            feature_names.push(col.name.clone());
        }

        for col in schema.columns() {
            if let ColumnKind::Categorical { .. } = col.kind {
                let levels = col.sorted_levels().unwrap_or_default();
                let offset = feature_names.len();
                feature_names.extend(levels.iter().map(|l| format!("{}_{}", col.name, l)));
                plans.push(ColumnPlan::Categorical {
                    name: col.name.clone(),
                    offset,
                    levels,
                });
            }
        }

        Self {
            plans,
            feature_names,
        }
    }

    /// Encode a batch of records; row order is preserved.
    pub fn encode(&self, records: &[RawRecord]) -> Result<Array2<f64>, EncodeError> {
        let mut matrix = Array2::<f64>::zeros((records.len(), self.feature_count()));

        for (row, record) in records.iter().enumerate() {
            self.check_columns(row, record)?;

            for plan in &self.plans {
                match plan {
                    ColumnPlan::Numeric { name, offset } => {
                        let value = lookup(row, record, name)?;
                        matrix[[row, *offset]] = numeric_value(row, name, value)?;
                    }
                    ColumnPlan::Categorical {
                        name,
                        offset,
                        levels,
                    } => {
                        // Missing levels leave the whole indicator group at zero
                        let Some(level) = lookup(row, record, name)?.as_level() else {
                            continue;
                        };
                        let idx = levels.binary_search(&level).map_err(|_| {
                            EncodeError::UnknownCategory {
                                row,
                                column: name.clone(),
                                value: level.clone(),
                            }
                        })?;
                        matrix[[row, offset + idx]] = 1.0;
                    }
                }
            }
        }

        Ok(matrix)
    }

    /// Names of the encoded columns, in matrix order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of encoded columns produced
    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    fn check_columns(&self, row: usize, record: &RawRecord) -> Result<(), EncodeError> {
        for column in record.columns() {
            let known = self.plans.iter().any(|plan| match plan {
                ColumnPlan::Numeric { name, .. } | ColumnPlan::Categorical { name, .. } => {
                    name == column
                }
            });
            if !known {
                return Err(EncodeError::UnknownColumn {
                    row,
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn lookup<'a>(row: usize, record: &'a RawRecord, column: &str) -> Result<&'a FeatureValue, EncodeError> {
    record.get(column).ok_or_else(|| EncodeError::MissingColumn {
        row,
        column: column.to_string(),
    })
}

fn numeric_value(row: usize, column: &str, value: &FeatureValue) -> Result<f64, EncodeError> {
    if value.is_missing() {
        return Err(EncodeError::MissingValue {
            row,
            column: column.to_string(),
        });
    }
    value
        .as_number()
        .filter(|n| n.is_finite())
        .ok_or_else(|| EncodeError::InvalidNumber {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
}
