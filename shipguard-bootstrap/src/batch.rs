use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use shipguard_application::commands::{analyze_commands, batch_commands};
use shipguard_domain::AnomalySummary;
use shipguard_infrastructure::AppConfig;

use crate::context::AppContext;

/// `analyze` subcommand: a directory runs batch mode, anything else is read
/// as a single shipment JSON file.
pub async fn run_analyze(config: AppConfig, input: &Path, output: &Path) -> Result<String> {
    let context = AppContext::new(config).await?;
    let state = context.state;

    if state.shipment_repo.dir_exists(input).await {
        let report = batch_commands::process_shipments_directory(&state, input, output).await?;
        info!(
            processed = report.processed,
            failed_files = report.failed_files,
            "batch analysis finished"
        );
        let mut text = format!("Processed {} shipment files\n", report.processed);
        text.push_str(&render_summary(&report.summary));
        return Ok(text);
    }

    let shipment = state.shipment_repo.read_json(input).await?;
    let analyzed = analyze_commands::analyze_shipment(&state, shipment).await?;
    state.shipment_repo.write_json(output, &analyzed).await?;
    let count = analyzed["anomaly_count"].as_u64().unwrap_or(0);
    Ok(format!("Processed shipment: {} anomalies detected\n", count))
}

pub fn render_summary(summary: &AnomalySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Anomaly summary");
    let _ = writeln!(out, "  shipments analyzed: {}", summary.shipments);
    let _ = writeln!(
        out,
        "  shipments with anomalies: {} ({:.1}%)",
        summary.shipments_with_anomalies,
        summary.anomaly_rate() * 100.0
    );
    let _ = writeln!(
        out,
        "  shipments with high severity anomalies: {}",
        summary.high_severity_shipments
    );
    if !summary.by_type.is_empty() {
        let _ = writeln!(out, "  by type:");
        for (anomaly_type, count) in &summary.by_type {
            let _ = writeln!(out, "    {}: {}", anomaly_type, count);
        }
    }
    if !summary.by_severity.is_empty() {
        let _ = writeln!(out, "  by severity:");
        for (severity, count) in &summary.by_severity {
            let _ = writeln!(out, "    {}: {}", severity, count);
        }
    }
    out
}
