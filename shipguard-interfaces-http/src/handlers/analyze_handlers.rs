use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::Value;
use tracing::error;

use shipguard_application::commands::analyze_commands;
use shipguard_application::queries::threshold_queries::{self, ThresholdsView};
use shipguard_application::AppState;

use crate::error::HttpError;
use crate::middleware::{decode_body, DecodeError};

fn body_text(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<String, HttpError> {
    decode_body(headers, body, state.config.max_body_bytes).map_err(|err| {
        state.metrics.record_analyze_error();
        error!("failed to decode request body: {}", err);
        match err {
            DecodeError::TooLarge { .. } => HttpError::PayloadTooLarge(err.to_string()),
            _ => HttpError::BadRequest(err.to_string()),
        }
    })
}

pub async fn analyze_shipment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<Value>, HttpError> {
    let text = body_text(&state, &headers, &body)?;
    let analyzed = analyze_commands::analyze_shipment_str(&state, &text).await?;
    Ok(Json(analyzed))
}

pub async fn analyze_shipment_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<Vec<Value>>, HttpError> {
    let text = body_text(&state, &headers, &body)?;
    let batch: Value = serde_json::from_str(&text).map_err(|err| {
        state.metrics.record_analyze_error();
        HttpError::BadRequest(format!("invalid batch JSON: {}", err))
    })?;
    let analyzed = analyze_commands::analyze_shipment_batch(&state, batch).await?;
    Ok(Json(analyzed))
}

pub async fn get_thresholds(State(state): State<AppState>) -> Json<ThresholdsView> {
    Json(threshold_queries::current_thresholds(&state))
}
