use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::commands::analyze_commands::analyze_document;
use crate::{AppError, AppState};
use shipguard_domain::{AnalysisOutcome, AnomalySummary, CsvRow, ShipmentFile, ShipmentFileFormat};

/// Columns carried over from a CSV row into the shipment document.
pub const CSV_SHIPMENT_FIELDS: [&str; 13] = [
    "id",
    "status",
    "origin",
    "destination",
    "cargo",
    "driver_id",
    "vehicle_id",
    "route_points",
    "expected_delivery",
    "actual_delivery",
    "anomalies",
    "created_at",
    "updated_at",
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Shipments analyzed and written.
    pub processed: usize,
    pub files_written: usize,
    pub failed_files: usize,
    pub summary: AnomalySummary,
}

/// Analyzes every JSON and CSV file directly under `input_dir` and writes the
/// results to `output_dir`. A missing input directory yields an empty report.
pub async fn process_shipments_directory(
    state: &AppState,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<BatchReport, AppError> {
    let repo = &state.shipment_repo;
    let mut report = BatchReport::default();
    if !repo.dir_exists(input_dir).await {
        error!("input directory does not exist: {}", input_dir.display());
        return Ok(report);
    }
    repo.ensure_dir(output_dir).await?;

    let files = repo.list_shipment_files(input_dir).await?;
    let (json_files, csv_files): (Vec<ShipmentFile>, Vec<ShipmentFile>) = files
        .into_iter()
        .partition(|file| file.format == ShipmentFileFormat::Json);

    for file in json_files.iter().chain(csv_files.iter()) {
        let output_path = output_dir.join(file.output_name());
        let result = match file.format {
            ShipmentFileFormat::Json => process_json_file(state, file, &output_path).await,
            ShipmentFileFormat::Csv => process_csv_file(state, file, &output_path).await,
        };
        match result {
            Ok(outcomes) => {
                report.processed += outcomes.len();
                report.files_written += 1;
                for outcome in &outcomes {
                    report.summary.record(outcome);
                }
            }
            Err(err) => {
                report.failed_files += 1;
                error!("error processing {}: {:#}", file.file_name(), err);
            }
        }
    }

    info!(
        processed = report.processed,
        files = report.files_written,
        failed = report.failed_files,
        "shipment directory processed"
    );
    Ok(report)
}

async fn process_json_file(
    state: &AppState,
    file: &ShipmentFile,
    output_path: &Path,
) -> anyhow::Result<Vec<AnalysisOutcome>> {
    let shipment = state.shipment_repo.read_json(&file.path).await?;
    let analyzed = match analyze_document(&state.detector, &shipment) {
        Ok(analyzed) => analyzed,
        Err(err) => {
            state.metrics.record_analyze_error();
            return Err(err.into());
        }
    };
    state
        .shipment_repo
        .write_json(output_path, &analyzed.document)
        .await?;
    state.metrics.record_analysis(&analyzed.outcome);
    info!(
        "processed shipment {}: {} anomalies detected",
        file.file_name(),
        analyzed.outcome.anomaly_count
    );
    Ok(vec![analyzed.outcome])
}

async fn process_csv_file(
    state: &AppState,
    file: &ShipmentFile,
    output_path: &Path,
) -> anyhow::Result<Vec<AnalysisOutcome>> {
    let rows = state.shipment_repo.read_csv_rows(&file.path).await?;
    info!("found CSV file {} with {} shipments", file.file_name(), rows.len());

    let mut documents = Vec::with_capacity(rows.len());
    let mut outcomes = Vec::with_capacity(rows.len());
    for row in &rows {
        let prepared = prepare_csv_shipment(row);
        let analyzed = analyze_document(&state.detector, &prepared)?;
        documents.push(analyzed.document);
        outcomes.push(analyzed.outcome);
    }

    state
        .shipment_repo
        .write_json(output_path, &Value::Array(documents))
        .await?;
    for outcome in &outcomes {
        state.metrics.record_analysis(outcome);
    }
    info!("processed {} shipments from CSV file {}", outcomes.len(), file.file_name());
    Ok(outcomes)
}

/// Builds a shipment document from one CSV row. `cargo`, `route_points` and
/// `anomalies` hold single-quoted JSON; undecodable cells fall back to an
/// empty object or list. Missing columns become empty strings.
pub fn prepare_csv_shipment(row: &CsvRow) -> Value {
    let mut prepared = Map::new();
    for field in CSV_SHIPMENT_FIELDS {
        let cell = row.get(field).map(String::as_str).unwrap_or("");
        let value = match field {
            "cargo" => decode_nested_cell(field, cell, Value::Object(Map::new())),
            "route_points" | "anomalies" => decode_nested_cell(field, cell, Value::Array(Vec::new())),
            _ => Value::String(cell.to_string()),
        };
        prepared.insert(field.to_string(), value);
    }
    Value::Object(prepared)
}

fn decode_nested_cell(field: &str, cell: &str, fallback: Value) -> Value {
    if cell.trim().is_empty() {
        return fallback;
    }
    match serde_json::from_str(&cell.replace('\'', "\"")) {
        Ok(value) => value,
        Err(err) => {
            error!("error parsing {} field: {}", field, err);
            fallback
        }
    }
}
