use std::sync::Arc;

use shipguard_domain::ports::ShipmentRepository;
use shipguard_domain::services::AnomalyDetector;
use shipguard_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub detector: Arc<AnomalyDetector>,
    pub shipment_repo: Arc<dyn ShipmentRepository>,
    pub metrics: Arc<Metrics>,
}
