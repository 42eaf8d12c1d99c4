use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::entities::{AnalysisOutcome, Anomaly, DetectionThresholds, ShipmentRecord};
use crate::ports::BaselineProvider;
use crate::services::checks::{delay, fraud, route, speed, status, stops, temperature};
use crate::utils::format_now;

/// Detection passes, in the order their anomalies appear in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    StatusRules,
    RouteDeviation,
    UnusualStops,
    SpeedViolations,
    PotentialFraud,
    Delays,
    TemperatureBreaches,
}

pub const CHECK_ORDER: [CheckKind; 7] = [
    CheckKind::StatusRules,
    CheckKind::RouteDeviation,
    CheckKind::UnusualStops,
    CheckKind::SpeedViolations,
    CheckKind::PotentialFraud,
    CheckKind::Delays,
    CheckKind::TemperatureBreaches,
];

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::StatusRules => "status_rules",
            CheckKind::RouteDeviation => "route_deviation",
            CheckKind::UnusualStops => "unusual_stops",
            CheckKind::SpeedViolations => "speed_violations",
            CheckKind::PotentialFraud => "potential_fraud",
            CheckKind::Delays => "delays",
            CheckKind::TemperatureBreaches => "temperature_breaches",
        }
    }

    pub fn run(&self, ctx: &CheckContext<'_>, shipment: &ShipmentRecord) -> Vec<Anomaly> {
        match self {
            CheckKind::StatusRules => status::detect_status_rules(ctx, shipment),
            CheckKind::RouteDeviation => route::detect_route_deviation(ctx, shipment),
            CheckKind::UnusualStops => stops::detect_unusual_stops(ctx, shipment),
            CheckKind::SpeedViolations => speed::detect_speed_violations(ctx, shipment),
            CheckKind::PotentialFraud => fraud::detect_potential_fraud(ctx, shipment),
            CheckKind::Delays => delay::detect_delays(ctx, shipment),
            CheckKind::TemperatureBreaches => temperature::detect_temperature_breaches(ctx, shipment),
        }
    }
}

/// Everything a single pass may read besides the shipment itself.
pub struct CheckContext<'a> {
    pub thresholds: &'a DetectionThresholds,
    pub baseline: Option<&'a dyn BaselineProvider>,
    pub now: DateTime<Utc>,
}

impl CheckContext<'_> {
    pub fn now_string(&self) -> String {
        format_now(&self.now)
    }
}

#[derive(Clone, Default)]
pub struct AnomalyDetector {
    thresholds: DetectionThresholds,
    baseline: Option<Arc<dyn BaselineProvider>>,
}

impl std::fmt::Debug for AnomalyDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnomalyDetector")
            .field("thresholds", &self.thresholds)
            .field("has_baseline", &self.baseline.is_some())
            .finish()
    }
}

impl AnomalyDetector {
    pub fn new(thresholds: DetectionThresholds) -> Self {
        Self {
            thresholds,
            baseline: None,
        }
    }

    pub fn with_baseline(mut self, baseline: Arc<dyn BaselineProvider>) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn thresholds(&self) -> &DetectionThresholds {
        &self.thresholds
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn detect(&self, shipment: &ShipmentRecord) -> Vec<Anomaly> {
        self.detect_at(shipment, Utc::now())
    }

    /// Runs every pass in [`CHECK_ORDER`] against a fixed "now".
    pub fn detect_at(&self, shipment: &ShipmentRecord, now: DateTime<Utc>) -> Vec<Anomaly> {
        let ctx = CheckContext {
            thresholds: &self.thresholds,
            baseline: self.baseline.as_deref(),
            now,
        };
        let mut anomalies = Vec::new();
        for check in CHECK_ORDER {
            let found = check.run(&ctx, shipment);
            debug!(
                shipment_id = %shipment.id,
                check = check.as_str(),
                anomalies = found.len(),
                "check finished"
            );
            anomalies.extend(found);
        }
        anomalies
    }

    pub fn analyze(&self, shipment: &ShipmentRecord) -> AnalysisOutcome {
        AnalysisOutcome::new(self.detect(shipment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{HistoricalBaseline, HistoricalShipment};
    use crate::services::test_support::{fixed_now, shipment};
    use crate::value_objects::{AnomalyType, Severity};
    use serde_json::json;

    #[test]
    fn empty_routes_yield_only_status_rules() {
        let detector = AnomalyDetector::default();
        let record = shipment(json!({
            "id": "SH-0003",
            "status": "in_transit",
            "cargo": {"type": "Hazardous Chemicals", "value": 1000},
            "planned_route": [],
            "actual_route": [],
            "updated_at": "2024-05-01T09:00:00Z"
        }));
        let first = detector.detect_at(&record, fixed_now());
        let second = detector.detect_at(&record, fixed_now());
        assert_eq!(first, second);
        let kinds: Vec<_> = first.iter().map(|a| a.anomaly_type).collect();
        assert_eq!(kinds, vec![AnomalyType::HazardousMaterial, AnomalyType::RouteDeviation]);
        assert!(first.iter().all(|a| a.timestamp == "2024-05-01T09:00:00Z"));
    }

    #[test]
    fn passes_concatenate_in_fixed_order() {
        let detector = AnomalyDetector::default();
        let record = shipment(json!({
            "id": "SH-0002",
            "status": "delayed",
            "planned_route": [
                {"latitude": 0.0, "longitude": 0.0},
                {"latitude": 0.0, "longitude": 0.9}
            ],
            "actual_route": [
                {"latitude": 0.6, "longitude": 0.0, "timestamp": "2024-05-01T10:00:00Z", "speed": 150},
                {"latitude": 0.6, "longitude": 0.1, "timestamp": "2024-05-01T10:20:00Z", "speed": 60}
            ]
        }));
        let kinds: Vec<_> = detector
            .detect_at(&record, fixed_now())
            .into_iter()
            .map(|a| a.anomaly_type)
            .collect();
        assert_eq!(
            kinds,
            vec![
                AnomalyType::Delay,
                AnomalyType::RouteDeviation,
                AnomalyType::RouteDeviation,
                AnomalyType::SpeedViolation,
            ]
        );
    }

    #[test]
    fn demonstration_rules_can_be_disabled() {
        let thresholds = DetectionThresholds {
            demonstration_checks: false,
            ..DetectionThresholds::default()
        };
        let detector = AnomalyDetector::new(thresholds);
        let record = shipment(json!({"id": "SH-0001", "status": "delayed"}));
        assert!(detector.detect_at(&record, fixed_now()).is_empty());
    }

    #[test]
    fn baseline_enables_value_check() {
        let baseline = HistoricalBaseline::new(vec![HistoricalShipment {
            origin_city: Some("Chicago".to_string()),
            destination_city: Some("Detroit".to_string()),
            cargo_type: Some("Electronics".to_string()),
            cargo_value: Some(10_000.0),
        }]);
        let record = shipment(json!({
            "id": "SH-0009",
            "cargo": {"type": "Electronics", "value": 20000},
            "origin": {"city": "Chicago"},
            "destination": {"city": "Detroit"}
        }));

        let without = AnomalyDetector::default();
        assert!(without.detect_at(&record, fixed_now()).is_empty());

        let with = AnomalyDetector::default().with_baseline(Arc::new(baseline));
        assert!(with.has_baseline());
        let anomalies = with.detect_at(&record, fixed_now());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].anomaly_type, AnomalyType::PotentialFraud);
        assert_eq!(anomalies[0].severity, Severity::High);
    }

    #[test]
    fn analyze_counts_and_flags_high_severity() {
        let detector = AnomalyDetector::default();
        let record = shipment(json!({
            "id": "SH-0005",
            "status": "in_transit",
            "cargo": {"type": "hazardous"}
        }));
        let outcome = detector.analyze(&record);
        assert_eq!(outcome.anomaly_count, 1);
        assert!(outcome.has_high_severity_anomalies);
    }

    #[test]
    fn check_names_are_unique() {
        let names: std::collections::HashSet<_> = CHECK_ORDER.iter().map(CheckKind::as_str).collect();
        assert_eq!(names.len(), CHECK_ORDER.len());
    }

    #[test]
    fn detector_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnomalyDetector>();
    }
}
