// Batch input files

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentFileFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentFile {
    pub path: PathBuf,
    pub format: ShipmentFileFormat,
}

impl ShipmentFile {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        let format = match extension.as_str() {
            "json" => ShipmentFileFormat::Json,
            "csv" => ShipmentFileFormat::Csv,
            _ => return None,
        };
        Some(Self {
            path: path.to_path_buf(),
            format,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// `<stem>_processed.json` for CSV inputs, the same name for JSON inputs.
    pub fn output_name(&self) -> String {
        match self.format {
            ShipmentFileFormat::Json => self.file_name(),
            ShipmentFileFormat::Csv => {
                let stem = self
                    .path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
                    .unwrap_or_default();
                format!("{}_processed.json", stem)
            }
        }
    }
}

/// One CSV record keyed by header name. Cells are raw text.
pub type CsvRow = BTreeMap<String, String>;
