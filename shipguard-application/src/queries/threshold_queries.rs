use serde::Serialize;

use crate::AppState;
use shipguard_domain::DetectionThresholds;

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdsView {
    #[serde(flatten)]
    pub thresholds: DetectionThresholds,
    pub historical_baseline_loaded: bool,
}

pub fn current_thresholds(state: &AppState) -> ThresholdsView {
    ThresholdsView {
        thresholds: state.detector.thresholds().clone(),
        historical_baseline_loaded: state.detector.has_baseline(),
    }
}
