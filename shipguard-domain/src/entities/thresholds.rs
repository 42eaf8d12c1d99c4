// Detection thresholds
// Tunables injected into the detector at construction

use serde::{Deserialize, Serialize};

/// What the unusual-stop check does when a telemetry timestamp cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopTimestampPolicy {
    /// Any unparsable timestamp disables the whole check for that shipment.
    #[default]
    AbortCheck,
    /// Drop the offending point and keep going, like every other check.
    SkipPoint,
}

impl StopTimestampPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "abort_check" | "abort" => Some(StopTimestampPolicy::AbortCheck),
            "skip_point" | "skip" => Some(StopTimestampPolicy::SkipPoint),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StopTimestampPolicy::AbortCheck => "abort_check",
            StopTimestampPolicy::SkipPoint => "skip_point",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionThresholds {
    /// Max allowed worst-point deviation as a fraction of the planned distance.
    pub route_deviation_threshold: f64,
    pub unusual_stop_threshold_minutes: f64,
    /// km/h
    pub speed_threshold: f64,
    /// Fractional deviation of the cargo value from the historical mean.
    pub value_deviation_threshold: f64,
    pub stop_timestamp_policy: StopTimestampPolicy,
    /// Status and id based placeholder rules kept for output compatibility.
    pub demonstration_checks: bool,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            route_deviation_threshold: 0.2,
            unusual_stop_threshold_minutes: 30.0,
            speed_threshold: 120.0,
            value_deviation_threshold: 0.3,
            stop_timestamp_policy: StopTimestampPolicy::AbortCheck,
            demonstration_checks: true,
        }
    }
}
