//! Reference dataset loading.
//!
//! Reads the historical observations CSV, decomposes the timestamp column
//! into month name, weekday name and hour of day (year and the original
//! timestamp are dropped), and derives the `ReferenceSchema`.

use crate::config::DataConfig;
use crate::schema::ReferenceSchema;
use crate::types::record::{FeatureValue, RawRecord};
use anyhow::{bail, Context, Result};
use chrono::{NaiveDateTime, Timelike};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

/// Columns derived from the timestamp, appended in this order
pub const DERIVED_COLUMNS: [&str; 3] = ["month", "weekday", "hour"];

/// Raw reference table after timestamp decomposition
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<FeatureValue>>,
}

impl ReferenceTable {
    /// Load the table described by the data configuration
    pub fn load(config: &DataConfig) -> Result<Self> {
        let path = Path::new(&config.reference_path);
        info!(path = %path.display(), "Loading reference dataset");

        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open reference dataset {}", path.display()))?;
        let table = Self::from_reader(file, config.timestamp_column.as_deref(), &config.na_values)
            .with_context(|| format!("Failed to read reference dataset {}", path.display()))?;

        info!(
            rows = table.rows.len(),
            columns = table.headers.len(),
            "Reference dataset loaded"
        );
        Ok(table)
    }

    /// Parse a reference table from CSV text
    pub fn from_reader<R: Read>(
        reader: R,
        timestamp_column: Option<&str>,
        na_values: &[String],
    ) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let raw_headers: Vec<String> = csv_reader
            .headers()
            .context("Missing header row")?
            .iter()
            .map(str::to_string)
            .collect();

        let ts_idx = match timestamp_column {
            Some(name) => Some(
                raw_headers
                    .iter()
                    .position(|h| h == name)
                    .with_context(|| format!("Timestamp column '{}' not found", name))?,
            ),
            None => None,
        };

        let mut headers: Vec<String> = raw_headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != ts_idx)
            .map(|(_, h)| h.clone())
            .collect();
        if ts_idx.is_some() {
            headers.extend(DERIVED_COLUMNS.iter().map(|c| c.to_string()));
        }

        let mut rows = Vec::new();
        for (line, result) in csv_reader.records().enumerate() {
            let record = result.with_context(|| format!("Malformed record {}", line + 1))?;

            let mut row: Vec<FeatureValue> = record
                .iter()
                .enumerate()
                .filter(|(idx, _)| Some(*idx) != ts_idx)
                .map(|(_, field)| FeatureValue::from_field(field, na_values))
                .collect();

            if let Some(idx) = ts_idx {
                let raw = record.get(idx).unwrap_or_default();
                row.extend(decompose_timestamp(raw).with_context(|| {
                    format!("Record {}: unparseable timestamp '{}'", line + 1, raw)
                })?);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            bail!("Reference dataset has no rows");
        }
        debug!(headers = ?headers, "Reference columns");

        Ok(Self { headers, rows })
    }

    /// Derive the feature schema, dropping the target column
    pub fn schema(&self, target: &str) -> Result<ReferenceSchema> {
        if !self.headers.iter().any(|h| h == target) {
            bail!("Target column '{}' not found in reference dataset", target);
        }
        // A column without a single observed value has no kind or domain to encode against
        for (idx, header) in self.headers.iter().enumerate() {
            let empty = self
                .rows
                .iter()
                .all(|row| row.get(idx).map_or(true, FeatureValue::is_missing));
            if header != target && empty {
                bail!("Column '{}' has no values in the reference dataset", header);
            }
        }
        Ok(ReferenceSchema::infer(target, &self.headers, &self.rows))
    }

    /// Rows as records, with the target column removed
    pub fn records(&self, target: &str) -> Vec<RawRecord> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row.iter())
                    .filter(|(h, _)| h.as_str() != target)
                    .map(|(h, v)| (h.clone(), v.clone()))
                    .collect()
            })
            .collect()
    }
}

/// Split a timestamp into (month name, weekday name, hour)
pub fn decompose_timestamp(raw: &str) -> Result<[FeatureValue; 3]> {
    let ts = TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
        .with_context(|| format!("No known timestamp format matches '{}'", raw))?;

    Ok([
        FeatureValue::Text(ts.format("%B").to_string()),
        FeatureValue::Text(ts.format("%A").to_string()),
        FeatureValue::Number(ts.hour() as f64),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnKind;
    use crate::types::record::DEFAULT_NA_VALUES;

    const CSV: &str = "\
holiday,temp,rain_1h,snow_1h,clouds_all,weather_main,date_time,traffic_volume
None,288.28,0.0,0.0,40,Clouds,2012-10-02 09:00:00,5545
None,289.36,0.0,0.0,75,Clear,2012-10-02 10:00:00,4516
Columbus Day,273.1,0.5,0.0,90,Rain,2012-10-08 00:00:00,455
";

    fn na() -> Vec<String> {
        DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decompose_timestamp() {
        let [month, weekday, hour] = decompose_timestamp("2012-10-02 09:00:00").unwrap();
        assert_eq!(month, FeatureValue::Text("October".to_string()));
        assert_eq!(weekday, FeatureValue::Text("Tuesday".to_string()));
        assert_eq!(hour, FeatureValue::Number(9.0));

        assert!(decompose_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_load_table_and_schema() {
        let table = ReferenceTable::from_reader(CSV.as_bytes(), Some("date_time"), &na()).unwrap();

        assert_eq!(
            table.headers,
            vec![
                "holiday",
                "temp",
                "rain_1h",
                "snow_1h",
                "clouds_all",
                "weather_main",
                "traffic_volume",
                "month",
                "weekday",
                "hour"
            ]
        );
        assert_eq!(table.rows.len(), 3);

        let schema = table.schema("traffic_volume").unwrap();
        assert_eq!(schema.len(), 9);
        assert!(schema.column("traffic_volume").is_none());
        assert!(schema.column("date_time").is_none());
        assert_eq!(
            schema.column("hour").unwrap().kind,
            ColumnKind::Numeric {
                min: 0.0,
                max: 10.0,
                integral: true
            }
        );
        assert_eq!(
            schema.column("weekday").unwrap().kind,
            ColumnKind::Categorical {
                levels: vec!["Tuesday".to_string(), "Monday".to_string()]
            }
        );
    }

    #[test]
    fn test_records_drop_target() {
        let table = ReferenceTable::from_reader(CSV.as_bytes(), Some("date_time"), &na()).unwrap();
        let records = table.records("traffic_volume");

        assert_eq!(records.len(), 3);
        assert!(records[0].get("traffic_volume").is_none());
        assert_eq!(records[2].get("month"), Some(&FeatureValue::from("October")));
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let table = ReferenceTable::from_reader(CSV.as_bytes(), None, &na()).unwrap();
        assert!(table.schema("volume").is_err());
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let header_only = "holiday,temp,traffic_volume\n";
        assert!(ReferenceTable::from_reader(header_only.as_bytes(), None, &na()).is_err());
    }

    #[test]
    fn test_all_missing_column_is_an_error() {
        let csv = "holiday,temp,traffic_volume\nNA,288.1,5545\n,289.4,4516\n";
        let table = ReferenceTable::from_reader(csv.as_bytes(), None, &na()).unwrap();
        let err = table.schema("traffic_volume").unwrap_err();
        assert!(err.to_string().contains("holiday"));
    }
}
