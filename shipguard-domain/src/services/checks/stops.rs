// Unusual stops: runs of near-stationary points in time order.

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::entities::{Anomaly, ShipmentRecord, StopTimestampPolicy, TelemetryPoint};
use crate::services::CheckContext;
use crate::utils::{format_timestamp, minutes_between};
use crate::value_objects::{AnomalyType, GeoPoint, Severity};

/// Below this speed (km/h) a point counts as stopped.
const STATIONARY_SPEED_KMH: f64 = 5.0;
const LONG_STOP_MINUTES: f64 = 60.0;

struct Stop {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    location: GeoPoint,
}

pub(crate) fn detect_unusual_stops(ctx: &CheckContext<'_>, shipment: &ShipmentRecord) -> Vec<Anomaly> {
    if shipment.actual_route.len() < 2 {
        return Vec::new();
    }

    let mut timed: Vec<(DateTime<FixedOffset>, &TelemetryPoint)> =
        Vec::with_capacity(shipment.actual_route.len());
    for (index, point) in shipment.actual_route.iter().enumerate() {
        match point.parsed_time() {
            Some(at) => timed.push((at, point)),
            None => match ctx.thresholds.stop_timestamp_policy {
                StopTimestampPolicy::AbortCheck => {
                    warn!(
                        shipment_id = %shipment.id,
                        index,
                        "invalid timestamp in route data, skipping stop detection"
                    );
                    return Vec::new();
                }
                StopTimestampPolicy::SkipPoint => {
                    debug!(shipment_id = %shipment.id, index, "dropping route point without a usable timestamp");
                }
            },
        }
    }
    // Stable: equal timestamps keep their input order.
    timed.sort_by_key(|(at, _)| *at);

    let mut stops = Vec::new();
    let mut current: Option<Stop> = None;
    for (at, point) in timed {
        if point.speed_or_zero() < STATIONARY_SPEED_KMH {
            match current.as_mut() {
                Some(stop) => stop.end = at,
                None => match point.position() {
                    Some(location) => {
                        current = Some(Stop {
                            start: at,
                            end: at,
                            location,
                        })
                    }
                    None => debug!(shipment_id = %shipment.id, "stationary point without coordinates"),
                },
            }
        } else if let Some(stop) = current.take() {
            stops.push(stop);
        }
    }
    stops.extend(current);

    let threshold = ctx.thresholds.unusual_stop_threshold_minutes;
    stops
        .into_iter()
        .filter_map(|stop| {
            let minutes = minutes_between(&stop.end, &stop.start);
            if minutes < threshold {
                return None;
            }
            let severity = if minutes > LONG_STOP_MINUTES {
                Severity::High
            } else {
                Severity::Medium
            };
            Some(
                Anomaly::new(
                    AnomalyType::UnusualStop,
                    severity,
                    format!("Unusual stop detected for {:.1} minutes", minutes),
                    format_timestamp(&stop.start),
                )
                .at(stop.location),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DetectionThresholds;
    use crate::services::test_support::{context, shipment};
    use serde_json::json;

    fn point(minute: u32, speed: f64) -> serde_json::Value {
        json!({
            "latitude": 41.0,
            "longitude": -87.0,
            "timestamp": format!("2024-05-01T10:{:02}:00Z", minute),
            "speed": speed
        })
    }

    #[test]
    fn stop_at_threshold_is_medium() {
        let thresholds = DetectionThresholds::default();
        let record = shipment(json!({
            "actual_route": [point(0, 60.0), point(10, 2.0), point(40, 1.0), point(45, 50.0)]
        }));
        let anomalies = detect_unusual_stops(&context(&thresholds), &record);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, Severity::Medium);
        assert_eq!(anomalies[0].description, "Unusual stop detected for 30.0 minutes");
        assert_eq!(anomalies[0].timestamp, "2024-05-01T10:10:00Z");
        assert_eq!(anomalies[0].location, Some(GeoPoint::new(41.0, -87.0)));
    }

    #[test]
    fn long_trailing_stop_is_high_and_input_order_is_irrelevant() {
        let thresholds = DetectionThresholds::default();
        let record = shipment(json!({
            "actual_route": [
                {"latitude": 41.0, "longitude": -87.0, "timestamp": "2024-05-01T11:15:00Z", "speed": 0.0},
                {"latitude": 41.0, "longitude": -87.0, "timestamp": "2024-05-01T10:00:00Z", "speed": 0.0},
                {"latitude": 41.0, "longitude": -87.0, "timestamp": "2024-05-01T09:50:00Z", "speed": 80.0}
            ]
        }));
        let anomalies = detect_unusual_stops(&context(&thresholds), &record);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, Severity::High);
        assert_eq!(anomalies[0].description, "Unusual stop detected for 75.0 minutes");
    }

    #[test]
    fn missing_speed_counts_as_stationary() {
        let thresholds = DetectionThresholds::default();
        let record = shipment(json!({
            "actual_route": [
                {"latitude": 41.0, "longitude": -87.0, "timestamp": "2024-05-01T10:00:00Z"},
                {"latitude": 41.0, "longitude": -87.0, "timestamp": "2024-05-01T10:31:00Z"}
            ]
        }));
        assert_eq!(detect_unusual_stops(&context(&thresholds), &record).len(), 1);
    }

    #[test]
    fn bad_timestamp_policy() {
        let route = json!([
            point(0, 0.0),
            {"latitude": 41.0, "longitude": -87.0, "timestamp": "not a time", "speed": 0.0},
            point(45, 0.0)
        ]);
        let record = shipment(json!({"actual_route": route}));

        let abort = DetectionThresholds::default();
        assert!(detect_unusual_stops(&context(&abort), &record).is_empty());

        let skip = DetectionThresholds {
            stop_timestamp_policy: StopTimestampPolicy::SkipPoint,
            ..DetectionThresholds::default()
        };
        let anomalies = detect_unusual_stops(&context(&skip), &record);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].description, "Unusual stop detected for 45.0 minutes");
    }

    #[test]
    fn short_routes_are_ignored() {
        let thresholds = DetectionThresholds::default();
        let record = shipment(json!({"actual_route": [point(0, 0.0)]}));
        assert!(detect_unusual_stops(&context(&thresholds), &record).is_empty());
    }
}
