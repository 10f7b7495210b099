//! Shared fixtures: a tiny reference dataset and a linear model artifact
//! trained on its encoded columns.

#![allow(dead_code)]

use serde_json::json;
use std::path::Path;
use traffic_volume_predictor::config::AppConfig;
use traffic_volume_predictor::reference::ReferenceTable;
use traffic_volume_predictor::types::record::DEFAULT_NA_VALUES;
use traffic_volume_predictor::{FeatureEncoder, ReferenceSchema};

pub const REFERENCE_CSV: &str = "\
holiday,temp,rain_1h,snow_1h,clouds_all,weather_main,date_time,traffic_volume
None,270.5,0.0,0.0,90,Snow,2023-01-02 00:00:00,540
None,281.2,0.5,0.0,40,Rain,2023-01-03 08:00:00,5820
Columbus Day,289.9,0.0,0.0,10,Clear,2023-02-04 17:00:00,4100
None,275.0,0.0,0.0,75,Clouds,2023-03-05 12:00:00,3300
";

/// Sorted calibration residuals; at alpha = 0.1 the half-width is the largest (90)
pub const CALIBRATION_SCORES: [f64; 9] = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];

pub fn na_values() -> Vec<String> {
    DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect()
}

pub fn reference_table() -> ReferenceTable {
    ReferenceTable::from_reader(REFERENCE_CSV.as_bytes(), Some("date_time"), &na_values())
        .expect("fixture parses")
}

pub fn reference_schema() -> ReferenceSchema {
    reference_table().schema("traffic_volume").expect("target present")
}

/// Linear artifact predicting `100 * hour - 100`
pub fn linear_artifact(schema: &ReferenceSchema) -> serde_json::Value {
    let encoder = FeatureEncoder::new(schema);
    let names = encoder.feature_names().to_vec();
    let coefficients: Vec<f64> = names
        .iter()
        .map(|n| if n == "hour" { 100.0 } else { 0.0 })
        .collect();

    json!({
        "name": "fixture-linear",
        "target": "traffic_volume",
        "feature_names": names,
        "estimator": {
            "kind": "linear",
            "intercept": -100.0,
            "coefficients": coefficients,
        },
        "calibration": { "scores": CALIBRATION_SCORES },
    })
}

pub fn write_artifact(dir: &Path, artifact: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.join("traffic_model.json");
    std::fs::write(&path, serde_json::to_vec_pretty(artifact).expect("serialize"))
        .expect("write artifact");
    path
}

/// Config pointing at fixture files inside `dir`
pub fn fixture_config(dir: &Path) -> AppConfig {
    let reference = dir.join("Traffic_Volume.csv");
    std::fs::write(&reference, REFERENCE_CSV).expect("write reference");
    let artifact = write_artifact(dir, &linear_artifact(&reference_schema()));

    let mut config = AppConfig::default();
    config.data.reference_path = reference.to_string_lossy().into_owned();
    config.data.sample_path = dir.join("missing_sample.csv").to_string_lossy().into_owned();
    config.model.artifact_path = artifact.to_string_lossy().into_owned();
    config.assets.dir = dir.to_string_lossy().into_owned();
    config
}
