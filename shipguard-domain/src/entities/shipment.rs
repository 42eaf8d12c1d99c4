// Shipment entity
// The declared plan and the observed telemetry trace of one shipment

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DomainError;
use crate::utils::{
    lenient_bool, lenient_f64, lenient_object, lenient_opt_object, lenient_opt_string,
    lenient_seq, lenient_string, parse_timestamp, value_as_string,
};
use crate::value_objects::{GeoPoint, ShipmentStatus};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipmentRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_object")]
    pub cargo: CargoDetails,
    #[serde(default, deserialize_with = "lenient_location")]
    pub origin: Location,
    #[serde(default, deserialize_with = "lenient_location")]
    pub destination: Location,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub planned_route: Vec<Waypoint>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub actual_route: Vec<TelemetryPoint>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub estimated_arrival_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub actual_arrival_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub updated_at: Option<String>,
    /// Lowercased serialized `cargo` field, kept for substring matching.
    #[serde(skip)]
    pub cargo_text: String,
}

impl ShipmentRecord {
    pub fn from_value(value: &Value) -> Result<Self, DomainError> {
        if !value.is_object() {
            return Err(DomainError::NotAnObject(json_kind(value)));
        }
        let mut record: ShipmentRecord = serde_json::from_value(value.clone())
            .map_err(|err| DomainError::MalformedShipment(err.to_string()))?;
        record.cargo_text = value
            .get("cargo")
            .map(|cargo| cargo.to_string().to_lowercase())
            .unwrap_or_default();
        Ok(record)
    }

    pub fn status(&self) -> Option<ShipmentStatus> {
        ShipmentStatus::parse(&self.status)
    }

    pub fn updated_at_or_empty(&self) -> String {
        self.updated_at.clone().unwrap_or_default()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CargoDetails {
    #[serde(default, rename = "type", deserialize_with = "lenient_opt_string")]
    pub cargo_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub temperature_controlled: Option<bool>,
    #[serde(default, deserialize_with = "lenient_opt_object")]
    pub temperature_range: Option<TemperatureRange>,
}

impl CargoDetails {
    pub fn is_temperature_controlled(&self) -> bool {
        self.temperature_controlled.unwrap_or(false)
    }

    /// Both bounds must be present for the range to count.
    pub fn temperature_bounds(&self) -> Option<(f64, f64)> {
        let range = self.temperature_range.as_ref()?;
        Some((range.min?, range.max?))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemperatureRange {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_object")]
    pub coordinates: Option<Waypoint>,
}

impl Location {
    pub fn position(&self) -> Option<GeoPoint> {
        self.coordinates.as_ref().and_then(Waypoint::position)
    }
}

/// A location may arrive as a bare city name (CSV exports) or as an object.
fn lenient_location<'de, D>(deserializer: D) -> Result<Location, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        Some(other) => Location {
            city: value_as_string(&other).filter(|city| !city.is_empty()),
            coordinates: None,
        },
        None => Location::default(),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Waypoint {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
}

impl Waypoint {
    pub fn position(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryPoint {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
}

impl TelemetryPoint {
    pub fn position(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.latitude?, self.longitude?))
    }

    pub fn parsed_time(&self) -> Option<DateTime<FixedOffset>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }

    /// A point without a speed reading counts as stationary.
    pub fn speed_or_zero(&self) -> f64 {
        self.speed.unwrap_or(0.0)
    }

    /// An empty timestamp counts as missing.
    pub fn timestamp_or(&self, fallback: &str) -> String {
        self.timestamp
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_full_record() {
        let value = json!({
            "id": "SH-1001",
            "status": "in_transit",
            "cargo": {
                "type": "Pharmaceuticals",
                "value": 125000.0,
                "temperature_controlled": true,
                "temperature_range": {"min": 2, "max": 8}
            },
            "origin": {"city": "Chicago", "coordinates": {"latitude": 41.88, "longitude": -87.63}},
            "destination": {"city": "Detroit", "coordinates": {"latitude": 42.33, "longitude": -83.05}},
            "planned_route": [{"latitude": 41.88, "longitude": -87.63}],
            "actual_route": [
                {"latitude": 41.9, "longitude": -87.6, "timestamp": "2024-05-01T10:00:00Z", "speed": 64.0, "temperature": 5.1}
            ],
            "estimated_arrival_time": "2024-05-01T18:00:00Z",
            "updated_at": "2024-05-01T10:05:00Z"
        });
        let record = ShipmentRecord::from_value(&value).expect("record");
        assert_eq!(record.status(), Some(ShipmentStatus::InTransit));
        assert_eq!(record.cargo.cargo_type.as_deref(), Some("Pharmaceuticals"));
        assert_eq!(record.cargo.temperature_bounds(), Some((2.0, 8.0)));
        assert!(record.cargo.is_temperature_controlled());
        assert_eq!(record.destination.city.as_deref(), Some("Detroit"));
        assert!(record.destination.position().is_some());
        assert_eq!(record.actual_route.len(), 1);
        assert_eq!(record.actual_route[0].speed_or_zero(), 64.0);
        assert!(record.cargo_text.contains("pharmaceuticals"));
    }

    #[test]
    fn tolerates_wrong_typed_fields() {
        let value = json!({
            "id": 4711,
            "status": null,
            "cargo": "not an object",
            "origin": "Chicago",
            "planned_route": "nope",
            "actual_route": [
                {"latitude": "41.9", "longitude": -87.6, "speed": "fast"},
                42,
                {"latitude": 41.95}
            ]
        });
        let record = ShipmentRecord::from_value(&value).expect("record");
        assert_eq!(record.id, "4711");
        assert_eq!(record.status(), None);
        assert!(record.cargo.value.is_none());
        assert_eq!(record.origin.city.as_deref(), Some("Chicago"));
        assert!(record.planned_route.is_empty());
        assert_eq!(record.actual_route.len(), 2);
        assert_eq!(record.actual_route[0].latitude, Some(41.9));
        assert_eq!(record.actual_route[0].speed_or_zero(), 0.0);
        assert!(record.actual_route[1].position().is_none());
    }

    #[test]
    fn rejects_non_object_input() {
        let err = ShipmentRecord::from_value(&json!([1, 2, 3])).expect_err("array rejected");
        assert!(matches!(err, DomainError::NotAnObject("an array")));
    }
}
