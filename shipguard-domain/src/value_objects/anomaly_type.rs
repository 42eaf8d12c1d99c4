// Anomaly type value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    Delay,
    HazardousMaterial,
    RouteDeviation,
    UnusualStop,
    SpeedViolation,
    PotentialFraud,
    TemperatureBreach,
}

impl AnomalyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::Delay => "delay",
            AnomalyType::HazardousMaterial => "hazardous_material",
            AnomalyType::RouteDeviation => "route_deviation",
            AnomalyType::UnusualStop => "unusual_stop",
            AnomalyType::SpeedViolation => "speed_violation",
            AnomalyType::PotentialFraud => "potential_fraud",
            AnomalyType::TemperatureBreach => "temperature_breach",
        }
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
