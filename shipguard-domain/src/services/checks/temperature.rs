// Temperature breaches for cargo that declares a controlled range.

use crate::entities::{Anomaly, ShipmentRecord};
use crate::services::grouping::group_within_window;
use crate::services::CheckContext;
use crate::utils::parse_timestamp;
use tracing::debug;

use crate::value_objects::{AnomalyType, GeoPoint, Severity};

const GROUP_WINDOW_MINUTES: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreachKind {
    TooCold,
    TooHot,
}

struct Breach {
    kind: BreachKind,
    temperature: f64,
    timestamp: String,
    location: GeoPoint,
}

pub(crate) fn detect_temperature_breaches(
    ctx: &CheckContext<'_>,
    shipment: &ShipmentRecord,
) -> Vec<Anomaly> {
    if !shipment.cargo.is_temperature_controlled() {
        return Vec::new();
    }
    let Some((min, max)) = shipment.cargo.temperature_bounds() else {
        return Vec::new();
    };
    let now = ctx.now_string();

    let breaches: Vec<Breach> = shipment
        .actual_route
        .iter()
        .filter_map(|point| {
            let temperature = point.temperature?;
            let kind = if temperature < min {
                BreachKind::TooCold
            } else if temperature > max {
                BreachKind::TooHot
            } else {
                return None;
            };
            let Some(location) = point.position() else {
                debug!(shipment_id = %shipment.id, temperature, "breach reading without coordinates");
                return None;
            };
            Some(Breach {
                kind,
                temperature,
                timestamp: point.timestamp_or(&now),
                location,
            })
        })
        .collect();

    group_within_window(
        &breaches,
        GROUP_WINDOW_MINUTES,
        |breach| parse_timestamp(&breach.timestamp),
        |a, b| a.kind == b.kind,
    )
    .into_iter()
    .map(|group| {
        let first = group.first;
        let readings = group.members.iter().map(|breach| breach.temperature);
        let description = match first.kind {
            BreachKind::TooCold => format!(
                "Temperature too low: {}°C (min: {}°C)",
                readings.fold(f64::MAX, f64::min),
                min
            ),
            BreachKind::TooHot => format!(
                "Temperature too high: {}°C (max: {}°C)",
                readings.fold(f64::MIN, f64::max),
                max
            ),
        };
        // Any excursion can spoil controlled cargo.
        Anomaly::new(
            AnomalyType::TemperatureBreach,
            Severity::High,
            description,
            first.timestamp.clone(),
        )
        .at(first.location)
    })
    .collect()
}
