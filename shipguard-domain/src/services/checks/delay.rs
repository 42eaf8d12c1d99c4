// Delivery delays: late deliveries, overdue shipments and projected lateness.

use chrono::{DateTime, Duration, FixedOffset};
use tracing::{debug, warn};

use crate::entities::{Anomaly, ShipmentRecord};
use crate::services::CheckContext;
use crate::utils::{format_timestamp, hours_between, parse_timestamp};
use crate::value_objects::{AnomalyType, Severity, ShipmentStatus};

/// Hours a delivery may trail its estimate before it counts as late.
const DELIVERED_GRACE_HOURS: f64 = 2.0;
const PROJECTED_GRACE_HOURS: f64 = 1.0;
const PROJECTED_MEDIUM_HOURS: f64 = 8.0;
/// Assumed when no telemetry point carries a speed reading.
const DEFAULT_SPEED_KMH: f64 = 60.0;

pub(crate) fn detect_delays(ctx: &CheckContext<'_>, shipment: &ShipmentRecord) -> Vec<Anomaly> {
    let Some(raw) = shipment.estimated_arrival_time.as_deref() else {
        return Vec::new();
    };
    let Some(estimated) = parse_timestamp(raw) else {
        warn!(shipment_id = %shipment.id, value = raw, "unreadable estimated arrival time");
        return Vec::new();
    };

    let anomaly = match shipment.status() {
        Some(ShipmentStatus::Delivered) => delivered_late(shipment, &estimated),
        Some(ShipmentStatus::InTransit) if ctx.now.fixed_offset() > estimated => {
            Some(overdue(ctx, &estimated))
        }
        Some(ShipmentStatus::InTransit) => projected_late(ctx, shipment, &estimated),
        _ => None,
    };
    anomaly.into_iter().collect()
}

fn delivered_late(shipment: &ShipmentRecord, estimated: &DateTime<FixedOffset>) -> Option<Anomaly> {
    let raw = shipment.actual_arrival_time.as_deref()?;
    let Some(actual) = parse_timestamp(raw) else {
        warn!(shipment_id = %shipment.id, value = raw, "unreadable actual arrival time");
        return None;
    };
    let hours = hours_between(&actual, estimated);
    if hours <= DELIVERED_GRACE_HOURS {
        return None;
    }
    Some(
        Anomaly::new(
            AnomalyType::Delay,
            Severity::from_delay_hours(hours),
            format!("Delivery delayed by {:.1} hours", hours),
            format_timestamp(&actual),
        )
        .resolved(),
    )
}

fn overdue(ctx: &CheckContext<'_>, estimated: &DateTime<FixedOffset>) -> Anomaly {
    let hours = hours_between(&ctx.now.fixed_offset(), estimated);
    Anomaly::new(
        AnomalyType::Delay,
        Severity::from_delay_hours(hours),
        format!("Shipment currently delayed by {:.1} hours", hours),
        ctx.now_string(),
    )
}

fn projected_late(
    ctx: &CheckContext<'_>,
    shipment: &ShipmentRecord,
    estimated: &DateTime<FixedOffset>,
) -> Option<Anomaly> {
    // Latest readable point; on ties the later one in input order wins.
    let (latest_at, latest) = shipment
        .actual_route
        .iter()
        .filter_map(|point| point.parsed_time().map(|at| (at, point)))
        .max_by_key(|(at, _)| *at)?;
    let Some(position) = latest.position() else {
        debug!(shipment_id = %shipment.id, "latest route point has no coordinates");
        return None;
    };
    let Some(destination) = shipment.destination.position() else {
        debug!(shipment_id = %shipment.id, "destination has no coordinates");
        return None;
    };
    let remaining_km = match position.distance_km(&destination) {
        Ok(distance) => distance,
        Err(err) => {
            warn!(shipment_id = %shipment.id, "cannot project arrival: {}", err);
            return None;
        }
    };

    let speeds: Vec<f64> = shipment
        .actual_route
        .iter()
        .filter_map(|point| point.speed)
        .collect();
    let average_speed = if speeds.is_empty() {
        DEFAULT_SPEED_KMH
    } else {
        speeds.iter().sum::<f64>() / speeds.len() as f64
    };
    if average_speed <= 0.0 {
        return None;
    }

    let travel_ms = (remaining_km / average_speed * 3_600_000.0) as i64;
    let projected = latest_at.checked_add_signed(Duration::milliseconds(travel_ms))?;
    if projected <= *estimated {
        return None;
    }
    let hours = hours_between(&projected, estimated);
    if hours <= PROJECTED_GRACE_HOURS {
        return None;
    }
    let severity = if hours > PROJECTED_MEDIUM_HOURS {
        Severity::Medium
    } else {
        Severity::Low
    };
    Some(Anomaly::new(
        AnomalyType::Delay,
        severity,
        format!("Projected delay of {:.1} hours based on current progress", hours),
        ctx.now_string(),
    ))
}
