use axum::Router;

use shipguard_application::AppState;

use crate::handlers::{analyze_handlers, ops_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/shipments/analyze",
            axum::routing::post(analyze_handlers::analyze_shipment),
        )
        .route(
            "/v1/shipments/analyze-batch",
            axum::routing::post(analyze_handlers::analyze_shipment_batch),
        )
        .route(
            "/v1/detect/thresholds",
            axum::routing::get(analyze_handlers::get_thresholds),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
