use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tracing::{info, warn};

use crate::utils::decode_text;
use shipguard_domain::{BaselineRepository, HistoricalBaseline, HistoricalShipment};

const REQUIRED_COLUMNS: [&str; 4] = ["origin_city", "destination_city", "cargo_type", "cargo_value"];

#[derive(Debug, Deserialize)]
struct BaselineRow {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    origin_city: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    destination_city: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    cargo_type: Option<String>,
    /// Unreadable cells drop out of the mean instead of failing the row.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    cargo_value: Option<f64>,
}

impl From<BaselineRow> for HistoricalShipment {
    fn from(row: BaselineRow) -> Self {
        HistoricalShipment {
            origin_city: row.origin_city,
            destination_city: row.destination_city,
            cargo_type: row.cargo_type,
            cargo_value: row.cargo_value.filter(|value| value.is_finite()),
        }
    }
}

pub struct CsvBaselineRepository;

impl CsvBaselineRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvBaselineRepository {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_baseline(text: &str) -> Result<HistoricalBaseline> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if !missing.is_empty() {
        return Err(anyhow!("historical data is missing columns: {}", missing.join(", ")));
    }

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<BaselineRow>().enumerate() {
        match record {
            Ok(row) => rows.push(HistoricalShipment::from(row)),
            Err(err) => warn!("skipping historical row {}: {}", index + 1, err),
        }
    }
    Ok(HistoricalBaseline::new(rows))
}

#[async_trait]
impl BaselineRepository for CsvBaselineRepository {
    async fn load_baseline(&self, path: &str) -> Result<HistoricalBaseline> {
        let bytes = fs::read(path).await?;
        let baseline = parse_baseline(&decode_text(bytes))?;
        info!("loaded {} historical shipments from {}", baseline.len(), path);
        Ok(baseline)
    }
}
