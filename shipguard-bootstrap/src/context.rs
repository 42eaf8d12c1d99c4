use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use shipguard_application::{AppState, Metrics};
use shipguard_domain::{AnomalyDetector, BaselineRepository};
use shipguard_infrastructure::{AppConfig, CsvBaselineRepository, FileShipmentRepository};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let mut detector = AnomalyDetector::new(config.to_thresholds());

        if let Some(path) = runtime_config.historical_data_path.as_deref() {
            match CsvBaselineRepository::new().load_baseline(path).await {
                Ok(baseline) => detector = detector.with_baseline(Arc::new(baseline)),
                Err(err) => warn!(
                    "failed to load historical data from {}: {:#}; value checks disabled",
                    path, err
                ),
            }
        }
        info!(
            baseline = detector.has_baseline(),
            thresholds = ?detector.thresholds(),
            "anomaly detector ready"
        );

        let state = AppState {
            config: runtime_config,
            detector: Arc::new(detector),
            shipment_repo: Arc::new(FileShipmentRepository::new()),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
