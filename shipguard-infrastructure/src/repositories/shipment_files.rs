use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::error;

use crate::utils::{decode_text, ensure_parent_dir};
use shipguard_domain::{CsvRow, ShipmentFile, ShipmentRepository};

/// Shipment documents stored as JSON and CSV files on local disk.
pub struct FileShipmentRepository;

impl FileShipmentRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileShipmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_csv_rows(text: &str) -> Result<Vec<CsvRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                error!("skipping CSV row {}: {}", index + 1, err);
                continue;
            }
        };
        let row: CsvRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.clone(), cell.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

#[async_trait]
impl ShipmentRepository for FileShipmentRepository {
    async fn dir_exists(&self, dir: &Path) -> bool {
        fs::metadata(dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    async fn ensure_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).await?;
        Ok(())
    }

    async fn list_shipment_files(&self, dir: &Path) -> Result<Vec<ShipmentFile>> {
        let mut entries = fs::read_dir(dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(file) = ShipmentFile::from_path(&entry.path()) {
                files.push(file);
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    async fn read_json(&self, path: &Path) -> Result<Value> {
        let bytes = fs::read(path).await?;
        Ok(serde_json::from_str(&decode_text(bytes))?)
    }

    async fn read_csv_rows(&self, path: &Path) -> Result<Vec<CsvRow>> {
        let bytes = fs::read(path).await?;
        parse_csv_rows(&decode_text(bytes))
    }

    async fn write_json(&self, path: &Path, value: &Value) -> Result<()> {
        ensure_parent_dir(path).await?;
        let content = serde_json::to_string_pretty(value)?;
        fs::write(path, content).await?;
        Ok(())
    }
}
