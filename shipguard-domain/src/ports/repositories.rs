use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::entities::{CsvRow, HistoricalBaseline, ShipmentFile};

#[async_trait]
pub trait BaselineRepository: Send + Sync {
    async fn load_baseline(&self, path: &str) -> anyhow::Result<HistoricalBaseline>;
}

#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    async fn dir_exists(&self, dir: &Path) -> bool;
    async fn ensure_dir(&self, dir: &Path) -> anyhow::Result<()>;
    /// JSON and CSV files directly under `dir`, sorted by file name.
    async fn list_shipment_files(&self, dir: &Path) -> anyhow::Result<Vec<ShipmentFile>>;
    async fn read_json(&self, path: &Path) -> anyhow::Result<Value>;
    async fn read_csv_rows(&self, path: &Path) -> anyhow::Result<Vec<CsvRow>>;
    async fn write_json(&self, path: &Path, value: &Value) -> anyhow::Result<()>;
}
