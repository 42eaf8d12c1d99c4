// Route deviation: the worst distance of an observed point from its nearest
// planned waypoint, relative to the planned route's length.

use tracing::debug;

use crate::entities::{Anomaly, ShipmentRecord, TelemetryPoint};
use crate::services::CheckContext;
use crate::value_objects::{AnomalyType, GeoPoint, Severity};

const HIGH_DEVIATION_RATIO: f64 = 0.5;

pub(crate) fn detect_route_deviation(ctx: &CheckContext<'_>, shipment: &ShipmentRecord) -> Vec<Anomaly> {
    if shipment.planned_route.is_empty() || shipment.actual_route.is_empty() {
        return Vec::new();
    }

    let planned: Vec<GeoPoint> = shipment
        .planned_route
        .iter()
        .filter_map(|waypoint| waypoint.position())
        .collect();
    if planned.is_empty() {
        debug!(shipment_id = %shipment.id, "planned route has no usable coordinates");
        return Vec::new();
    }

    let mut worst: Option<(f64, &TelemetryPoint, GeoPoint)> = None;
    for point in &shipment.actual_route {
        let Some(position) = point.position() else {
            debug!(shipment_id = %shipment.id, "skipping route point without coordinates");
            continue;
        };
        let Some(nearest) = nearest_distance(&position, &planned) else {
            continue;
        };
        if nearest > worst.map_or(0.0, |(distance, _, _)| distance) {
            worst = Some((nearest, point, position));
        }
    }

    let planned_length: f64 = planned
        .windows(2)
        .filter_map(|pair| pair[0].distance_km(&pair[1]).ok())
        .sum();

    let Some((deviation, point, position)) = worst else {
        return Vec::new();
    };
    let ratio = if planned_length > 0.0 {
        deviation / planned_length
    } else {
        0.0
    };
    if ratio <= ctx.thresholds.route_deviation_threshold {
        return Vec::new();
    }

    let severity = if ratio > HIGH_DEVIATION_RATIO {
        Severity::High
    } else {
        Severity::Medium
    };
    vec![Anomaly::new(
        AnomalyType::RouteDeviation,
        severity,
        format!("Route deviation of {:.2} km detected", deviation),
        point.timestamp_or(&ctx.now_string()),
    )
    .at(position)]
}

fn nearest_distance(position: &GeoPoint, planned: &[GeoPoint]) -> Option<f64> {
    planned
        .iter()
        .filter_map(|waypoint| match position.distance_km(waypoint) {
            Ok(distance) => Some(distance),
            Err(err) => {
                debug!("ignoring waypoint distance: {}", err);
                None
            }
        })
        .reduce(f64::min)
}
