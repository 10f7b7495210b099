//! Uploaded CSV parsing and the sample-file preview

use crate::types::record::{FeatureValue, RawRecord};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("uploaded file is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("uploaded file has duplicate column '{0}'")]
    DuplicateColumn(String),
}

/// Parse CSV with a header row into raw records.
///
/// Column names are taken verbatim; validating them against the schema is
/// left to the encoder.
pub fn parse_records<R: Read>(reader: R, na_values: &[String]) -> Result<Vec<RawRecord>, UploadError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

    for (idx, header) in headers.iter().enumerate() {
        if headers[..idx].contains(header) {
            return Err(UploadError::DuplicateColumn(header.clone()));
        }
    }

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        records.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, field)| (h.clone(), FeatureValue::from_field(field, na_values)))
                .collect(),
        );
    }

    debug!(rows = records.len(), columns = headers.len(), "Parsed uploaded CSV");
    Ok(records)
}

/// First rows of the sample upload file, shown as a template
#[derive(Debug, Clone, Default)]
pub struct SamplePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SamplePreview {
    /// Load up to `limit` rows. The sample is display-only, so a missing or
    /// unreadable file yields an empty preview.
    pub fn load<P: AsRef<Path>>(path: P, limit: usize) -> Self {
        let path = path.as_ref();
        match std::fs::File::open(path) {
            Ok(file) => Self::from_reader(file, limit).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Unreadable sample file");
                Self::default()
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Sample file not found");
                Self::default()
            }
        }
    }

    pub fn from_reader<R: Read>(reader: R, limit: usize) -> Result<Self, csv::Error> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.iter().map(str::to_string).collect();
        let rows = csv_reader
            .records()
            .take(limit)
            .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;
        Ok(Self { headers, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}
