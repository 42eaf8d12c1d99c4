// Fixed rules keyed on status, cargo text and shipment id.
// These exist for demonstration data and can be switched off.

use crate::entities::{Anomaly, ShipmentRecord};
use crate::services::CheckContext;
use crate::value_objects::{AnomalyType, Severity, ShipmentStatus};

pub(crate) fn detect_status_rules(ctx: &CheckContext<'_>, shipment: &ShipmentRecord) -> Vec<Anomaly> {
    if !ctx.thresholds.demonstration_checks {
        return Vec::new();
    }

    let updated_at = shipment.updated_at_or_empty();
    let status = shipment.status();
    let mut anomalies = Vec::new();

    if status == Some(ShipmentStatus::Delayed) {
        anomalies.push(Anomaly::new(
            AnomalyType::Delay,
            Severity::Medium,
            "Shipment is delayed beyond expected delivery time",
            updated_at.clone(),
        ));
    }

    if status == Some(ShipmentStatus::InTransit) && shipment.cargo_text.contains("hazardous") {
        anomalies.push(Anomaly::new(
            AnomalyType::HazardousMaterial,
            Severity::High,
            "Hazardous material detected in transit",
            updated_at.clone(),
        ));
    }

    if matches!(shipment.id.chars().last(), Some('1'..='4')) {
        anomalies.push(Anomaly::new(
            AnomalyType::RouteDeviation,
            Severity::Low,
            "Shipment route deviates from optimal path",
            updated_at,
        ));
    }

    anomalies
}
