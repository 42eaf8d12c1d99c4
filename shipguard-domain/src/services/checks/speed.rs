// Speed violations, grouped into five-minute windows.

use tracing::debug;

use crate::entities::{Anomaly, ShipmentRecord};
use crate::services::grouping::group_within_window;
use crate::services::CheckContext;
use crate::utils::parse_timestamp;
use crate::value_objects::{AnomalyType, GeoPoint, Severity};

const GROUP_WINDOW_MINUTES: f64 = 5.0;
/// A group whose peak exceeds the threshold by this factor is high severity.
const HIGH_SPEED_FACTOR: f64 = 1.2;

struct Violation {
    speed: f64,
    timestamp: String,
    location: GeoPoint,
}

pub(crate) fn detect_speed_violations(ctx: &CheckContext<'_>, shipment: &ShipmentRecord) -> Vec<Anomaly> {
    let threshold = ctx.thresholds.speed_threshold;
    let now = ctx.now_string();

    let violations: Vec<Violation> = shipment
        .actual_route
        .iter()
        .filter_map(|point| {
            let speed = point.speed_or_zero();
            if speed <= threshold {
                return None;
            }
            let Some(location) = point.position() else {
                debug!(shipment_id = %shipment.id, speed, "speeding point without coordinates");
                return None;
            };
            Some(Violation {
                speed,
                timestamp: point.timestamp_or(&now),
                location,
            })
        })
        .collect();

    group_within_window(
        &violations,
        GROUP_WINDOW_MINUTES,
        |violation| parse_timestamp(&violation.timestamp),
        |_, _| true,
    )
    .into_iter()
    .map(|group| {
        let peak = group
            .members
            .iter()
            .map(|violation| violation.speed)
            .fold(f64::MIN, f64::max);
        let severity = if peak > threshold * HIGH_SPEED_FACTOR {
            Severity::High
        } else {
            Severity::Medium
        };
        Anomaly::new(
            AnomalyType::SpeedViolation,
            severity,
            format!("Speed violation detected: {:.1} km/h", peak),
            group.first.timestamp.clone(),
        )
        .at(group.first.location)
    })
    .collect()
}
