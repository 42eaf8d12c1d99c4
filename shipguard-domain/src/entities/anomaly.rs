// Anomaly entity
// One detected condition on one shipment

use serde::{Deserialize, Serialize};

use crate::value_objects::{AnomalyType, GeoPoint, Severity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    pub description: String,
    pub severity: Severity,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub resolved: bool,
}

impl Anomaly {
    pub fn new(
        anomaly_type: AnomalyType,
        severity: Severity,
        description: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            anomaly_type,
            description: description.into(),
            severity,
            timestamp: timestamp.into(),
            location: None,
            resolved: false,
        }
    }

    pub fn at(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn resolved(mut self) -> Self {
        self.resolved = true;
        self
    }
}
