use serde_json::Value;
use tracing::{error, info, warn};

use crate::{AppError, AppState};
use shipguard_domain::{AnalysisOutcome, AnomalyDetector, DomainError, ShipmentRecord};

pub const INVALID_SHIPMENT_FORMAT: &str = "Invalid shipment data format";

/// An analyzed shipment: the input fields plus the analysis fields, and
/// the outcome they were built from.
#[derive(Debug, Clone)]
pub struct AnalyzedShipment {
    pub document: Value,
    pub outcome: AnalysisOutcome,
}

/// Runs the detector over one shipment document. Only a non-object input is
/// rejected; everything inside the object degrades per field.
pub fn analyze_document(
    detector: &AnomalyDetector,
    shipment: &Value,
) -> Result<AnalyzedShipment, DomainError> {
    let record = ShipmentRecord::from_value(shipment)?;
    let Value::Object(fields) = shipment else {
        return Err(DomainError::MalformedShipment("expected an object".to_string()));
    };
    let outcome = detector.analyze(&record);
    Ok(AnalyzedShipment {
        document: outcome.merge_into(fields),
        outcome,
    })
}

pub async fn analyze_shipment(state: &AppState, shipment: Value) -> Result<Value, AppError> {
    match analyze_document(&state.detector, &shipment) {
        Ok(analyzed) => {
            state.metrics.record_analysis(&analyzed.outcome);
            Ok(analyzed.document)
        }
        Err(err) => {
            state.metrics.record_analyze_error();
            warn!("rejected shipment: {}", err);
            Err(err.into())
        }
    }
}

pub async fn analyze_shipment_str(state: &AppState, raw: &str) -> Result<Value, AppError> {
    let shipment: Value = serde_json::from_str(raw).map_err(|err| {
        state.metrics.record_analyze_error();
        error!("invalid shipment data JSON: {}", err);
        AppError::BadRequest(INVALID_SHIPMENT_FORMAT.to_string())
    })?;
    analyze_shipment(state, shipment).await
}

/// Analyzes every object in a JSON array. Other elements are skipped.
pub async fn analyze_shipment_batch(state: &AppState, batch: Value) -> Result<Vec<Value>, AppError> {
    let Value::Array(items) = batch else {
        state.metrics.record_analyze_error();
        return Err(AppError::BadRequest("batch must be a JSON array".to_string()));
    };

    let total = items.len();
    let mut results = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        match analyze_document(&state.detector, &item) {
            Ok(analyzed) => {
                state.metrics.record_analysis(&analyzed.outcome);
                results.push(analyzed.document);
            }
            Err(err) => {
                state.metrics.record_analyze_error();
                warn!("skipping batch element {}: {}", index, err);
            }
        }
    }
    info!("analyzed {} of {} shipments in batch", results.len(), total);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::batch_commands::tests::memory_state;
    use serde_json::json;

    #[tokio::test]
    async fn analyzed_shipment_keeps_fields() {
        let (state, _) = memory_state();
        let result = analyze_shipment(
            &state,
            json!({"id": "SH-0001", "status": "delayed", "driver_id": "D-7"}),
        )
        .await
        .expect("analysis");
        assert_eq!(result["driver_id"], "D-7");
        assert_eq!(result["anomaly_count"], 2);
        assert_eq!(result["has_high_severity_anomalies"], false);
        assert_eq!(result["anomalies"][0]["type"], "delay");
        assert_eq!(state.metrics.shipments_analyzed(), 1);
    }

    #[tokio::test]
    async fn non_object_is_a_bad_request() {
        let (state, _) = memory_state();
        let err = analyze_shipment(&state, json!("SH-1"))
            .await
            .expect_err("string rejected");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn raw_string_input() {
        let (state, _) = memory_state();
        let err = analyze_shipment_str(&state, "{not json")
            .await
            .expect_err("invalid json");
        match err {
            AppError::BadRequest(message) => assert_eq!(message, INVALID_SHIPMENT_FORMAT),
            other => panic!("unexpected error: {other:?}"),
        }

        let ok = analyze_shipment_str(&state, r#"{"id": "SH-9"}"#)
            .await
            .expect("valid json");
        assert_eq!(ok["anomaly_count"], 0);
    }

    #[tokio::test]
    async fn batch_skips_non_objects() {
        let (state, _) = memory_state();
        let results = analyze_shipment_batch(&state, json!([{"id": "SH-5"}, 7, {"id": "SH-6"}]))
            .await
            .expect("batch");
        assert_eq!(results.len(), 2);
        assert_eq!(results[1]["id"], "SH-6");

        let err = analyze_shipment_batch(&state, json!({"id": "SH-5"}))
            .await
            .expect_err("object is not a batch");
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
