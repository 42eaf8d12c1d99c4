use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use shipguard_application::AppState;
use shipguard_infrastructure::AppConfig;
use shipguard_interfaces_http::build_router;

use crate::context::AppContext;

pub fn build_router_with_layers(state: AppState) -> Router {
    build_router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(
            usize::try_from(state.config.max_body_bytes).unwrap_or(usize::MAX),
        ))
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(
            state.config.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_standalone(config: AppConfig) -> Result<()> {
    let context = AppContext::new(config).await?;
    let state = context.state;

    let app = build_router_with_layers(state.clone());
    let addr: std::net::SocketAddr = state.config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("cannot install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let config = AppConfig {
            max_body_bytes: 16,
            ..AppConfig::default()
        };
        let context = AppContext::new(config).await.expect("context");
        let app = build_router_with_layers(context.state);

        let body = format!(r#"{{"id": "{}"}}"#, "x".repeat(64));
        let request = Request::builder()
            .method("POST")
            .uri("/v1/shipments/analyze")
            .header("content-length", body.len())
            .body(Body::from(body))
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn gzip_bodies_are_limited_after_inflation() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let config = AppConfig {
            max_body_bytes: 4096,
            ..AppConfig::default()
        };
        let context = AppContext::new(config).await.expect("context");
        let app = build_router_with_layers(context.state);

        let mut payload = br#"{"id":"SH-9""#.to_vec();
        payload.extend(std::iter::repeat(b' ').take(3 * 1024 * 1024));
        payload.push(b'}');
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload).expect("compress");
        let compressed = encoder.finish().expect("finish");
        assert!(compressed.len() < 4096);

        let request = Request::builder()
            .method("POST")
            .uri("/v1/shipments/analyze")
            .header("content-encoding", "gzip")
            .header("content-length", compressed.len())
            .body(Body::from(compressed))
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
