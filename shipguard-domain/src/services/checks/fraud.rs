// Potential fraud: declared value against the historical mean, and routes
// that come back to an area they already passed through.

use std::collections::HashSet;

use crate::entities::{Anomaly, ShipmentRecord};
use crate::ports::BaselineQuery;
use crate::services::CheckContext;
use crate::value_objects::{AnomalyType, Severity};

pub(crate) fn detect_potential_fraud(ctx: &CheckContext<'_>, shipment: &ShipmentRecord) -> Vec<Anomaly> {
    value_deviation(ctx, shipment)
        .into_iter()
        .chain(route_revisit(ctx, shipment))
        .collect()
}

fn value_deviation(ctx: &CheckContext<'_>, shipment: &ShipmentRecord) -> Option<Anomaly> {
    let baseline = ctx.baseline?;
    let current = shipment.cargo.value?;
    let query = BaselineQuery {
        origin_city: shipment.origin.city.as_deref(),
        destination_city: shipment.destination.city.as_deref(),
        cargo_type: shipment.cargo.cargo_type.as_deref(),
    };
    let average = baseline.average_cargo_value(&query)?;
    if current <= 0.0 || average <= 0.0 {
        return None;
    }

    let deviation = (current - average).abs() / average;
    if deviation <= ctx.thresholds.value_deviation_threshold {
        return None;
    }
    Some(Anomaly::new(
        AnomalyType::PotentialFraud,
        Severity::High,
        format!("Unusual cargo value: ${:.2} (expected ~${:.2})", current, average),
        ctx.now_string(),
    ))
}

fn route_revisit(ctx: &CheckContext<'_>, shipment: &ShipmentRecord) -> Option<Anomaly> {
    if shipment.actual_route.len() <= 2 {
        return None;
    }
    let mut visited = HashSet::new();
    for point in &shipment.actual_route {
        let Some(position) = point.position() else {
            continue;
        };
        if !visited.insert(position.area_key()) {
            return Some(
                Anomaly::new(
                    AnomalyType::PotentialFraud,
                    Severity::Medium,
                    "Suspicious route pattern detected: revisiting previous locations",
                    point.timestamp_or(&ctx.now_string()),
                )
                .at(position),
            );
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DetectionThresholds, HistoricalBaseline, HistoricalShipment};
    use crate::services::test_support::{context, context_with, fixed_now, shipment};
    use crate::utils::format_now;
    use crate::value_objects::GeoPoint;
    use serde_json::json;

    fn baseline() -> HistoricalBaseline {
        HistoricalBaseline::new(vec![
            HistoricalShipment {
                origin_city: Some("Chicago".to_string()),
                destination_city: Some("Detroit".to_string()),
                cargo_type: Some("Furniture".to_string()),
                cargo_value: Some(8_000.0),
            },
            HistoricalShipment {
                origin_city: Some("Denver".to_string()),
                destination_city: Some("Austin".to_string()),
                cargo_type: Some("Electronics".to_string()),
                cargo_value: Some(12_000.0),
            },
        ])
    }

    #[test]
    fn value_far_from_mean_is_flagged() {
        let thresholds = DetectionThresholds::default();
        let history = baseline();
        let record = shipment(json!({
            "cargo": {"type": "Electronics", "value": 20000},
            "origin": {"city": "Chicago"},
            "destination": {"city": "Detroit"}
        }));
        let anomalies = detect_potential_fraud(&context_with(&thresholds, &history), &record);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, Severity::High);
        assert_eq!(
            anomalies[0].description,
            "Unusual cargo value: $20000.00 (expected ~$10000.00)"
        );
        assert_eq!(anomalies[0].timestamp, format_now(&fixed_now()));
        assert!(anomalies[0].location.is_none());
    }

    #[test]
    fn value_near_mean_or_without_baseline_is_quiet() {
        let thresholds = DetectionThresholds::default();
        let history = baseline();
        let near = shipment(json!({"cargo": {"type": "Electronics", "value": 13000}}));
        assert!(detect_potential_fraud(&context_with(&thresholds, &history), &near).is_empty());

        let unmatched = shipment(json!({"cargo": {"type": "Toys", "value": 99999}}));
        assert!(detect_potential_fraud(&context_with(&thresholds, &history), &unmatched).is_empty());

        let far = shipment(json!({"cargo": {"type": "Electronics", "value": 50000}}));
        assert!(detect_potential_fraud(&context(&thresholds), &far).is_empty());
    }

    #[test]
    fn revisit_reports_first_repeat_only() {
        let thresholds = DetectionThresholds::default();
        let record = shipment(json!({
            "actual_route": [
                {"latitude": 41.0001, "longitude": -87.0001, "timestamp": "2024-05-01T10:00:00Z"},
                {"latitude": 41.5, "longitude": -87.5, "timestamp": "2024-05-01T10:30:00Z"},
                {"latitude": 41.0002, "longitude": -87.0002, "timestamp": "2024-05-01T11:00:00Z"},
                {"latitude": 41.5, "longitude": -87.5, "timestamp": "2024-05-01T11:30:00Z"}
            ]
        }));
        let anomalies = detect_potential_fraud(&context(&thresholds), &record);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, Severity::Medium);
        assert_eq!(anomalies[0].timestamp, "2024-05-01T11:00:00Z");
        assert_eq!(anomalies[0].location, Some(GeoPoint::new(41.0002, -87.0002)));
    }

    #[test]
    fn two_point_routes_never_revisit() {
        let thresholds = DetectionThresholds::default();
        let record = shipment(json!({
            "actual_route": [
                {"latitude": 41.0, "longitude": -87.0},
                {"latitude": 41.0, "longitude": -87.0}
            ]
        }));
        assert!(detect_potential_fraud(&context(&thresholds), &record).is_empty());
    }
}
