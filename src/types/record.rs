//! Raw feature records as collected from the form, an upload or the JSON API

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tokens treated as missing when no explicit list is configured.
pub const DEFAULT_NA_VALUES: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// A single raw (pre-encoding) feature value.
///
/// Values coming from text sources stay `Text` until the encoder interprets
/// them against the column kind in the reference schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
    Missing,
}

impl FeatureValue {
    /// Build a value from a raw text field, mapping NA tokens to `Missing`.
    pub fn from_field<S: AsRef<str>>(raw: &str, na_values: &[S]) -> Self {
        let trimmed = raw.trim();
        if na_values.iter().any(|na| na.as_ref() == trimmed) {
            FeatureValue::Missing
        } else {
            FeatureValue::Text(trimmed.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }

    /// Numeric interpretation, if the value has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(s) => s.trim().parse::<f64>().ok(),
            FeatureValue::Missing => None,
        }
    }

    /// Categorical level name of the value.
    pub fn as_level(&self) -> Option<String> {
        match self {
            FeatureValue::Number(n) => Some(n.to_string()),
            FeatureValue::Text(s) => Some(s.clone()),
            FeatureValue::Missing => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Text(s) => f.write_str(s),
            FeatureValue::Missing => Ok(()),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

/// One row of user-supplied feature values, keyed by raw column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, FeatureValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with<V: Into<FeatureValue>>(mut self, column: &str, value: V) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert<V: Into<FeatureValue>>(&mut self, column: &str, value: V) {
        self.fields.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.fields.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FeatureValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, FeatureValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
