//! Upload Sample Generator
//!
//! Writes a sample upload file: random rows of the reference dataset in raw
//! feature form (timestamp decomposed, target dropped).
//!
//! Usage: upload-sample [config path] [row count] [output path]

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use tracing::info;
use traffic_volume_predictor::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    reference::ReferenceTable,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("upload_sample=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args.get(1).map(|s| s.as_str()).unwrap_or(DEFAULT_CONFIG_PATH);
    let count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(5);

    let config = AppConfig::load_from_path(config_path)?;
    let output = args
        .get(3)
        .cloned()
        .unwrap_or_else(|| config.data.sample_path.clone());

    let table = ReferenceTable::load(&config.data)?;
    let schema = table.schema(&config.data.target_column)?;
    let columns = schema.column_names();
    let records = table.records(&config.data.target_column);

    let mut rng = rand::thread_rng();
    let picked: Vec<_> = records.choose_multiple(&mut rng, count).collect();

    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("Failed to create {}", output))?;
    writer.write_record(&columns)?;
    for record in &picked {
        writer.write_record(columns.iter().map(|c| {
            record
                .get(c)
                .map(|v| v.to_string())
                .unwrap_or_default()
        }))?;
    }
    writer.flush()?;

    info!(
        rows = picked.len(),
        columns = columns.len(),
        output = %output,
        "Sample upload file written"
    );
    Ok(())
}
