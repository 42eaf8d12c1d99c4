// Analysis output
// The input shipment fields plus the detected anomalies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entities::Anomaly;
use crate::value_objects::Severity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub anomalies: Vec<Anomaly>,
    pub anomaly_count: usize,
    pub has_high_severity_anomalies: bool,
}

impl AnalysisOutcome {
    pub fn new(anomalies: Vec<Anomaly>) -> Self {
        let anomaly_count = anomalies.len();
        let has_high_severity_anomalies = anomalies
            .iter()
            .any(|anomaly| anomaly.severity == Severity::High);
        Self {
            anomalies,
            anomaly_count,
            has_high_severity_anomalies,
        }
    }

    /// Copies `shipment` and appends the three analysis fields, replacing any
    /// previous values under the same keys.
    pub fn merge_into(&self, shipment: &Map<String, Value>) -> Value {
        let mut out = shipment.clone();
        out.insert(
            "anomalies".to_string(),
            serde_json::to_value(&self.anomalies).unwrap_or_else(|_| Value::Array(Vec::new())),
        );
        out.insert("anomaly_count".to_string(), Value::from(self.anomaly_count));
        out.insert(
            "has_high_severity_anomalies".to_string(),
            Value::Bool(self.has_high_severity_anomalies),
        );
        Value::Object(out)
    }
}

/// Aggregate counts over a batch of analyzed shipments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub shipments: usize,
    pub shipments_with_anomalies: usize,
    pub high_severity_shipments: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
}

impl AnomalySummary {
    pub fn record(&mut self, outcome: &AnalysisOutcome) {
        self.shipments += 1;
        if outcome.anomaly_count > 0 {
            self.shipments_with_anomalies += 1;
        }
        if outcome.has_high_severity_anomalies {
            self.high_severity_shipments += 1;
        }
        for anomaly in &outcome.anomalies {
            *self
                .by_type
                .entry(anomaly.anomaly_type.as_str().to_string())
                .or_default() += 1;
            *self
                .by_severity
                .entry(anomaly.severity.as_str().to_string())
                .or_default() += 1;
        }
    }

    pub fn merge(&mut self, other: AnomalySummary) {
        self.shipments += other.shipments;
        self.shipments_with_anomalies += other.shipments_with_anomalies;
        self.high_severity_shipments += other.high_severity_shipments;
        for (key, count) in other.by_type {
            *self.by_type.entry(key).or_default() += count;
        }
        for (key, count) in other.by_severity {
            *self.by_severity.entry(key).or_default() += count;
        }
    }

    pub fn anomaly_rate(&self) -> f64 {
        if self.shipments == 0 {
            return 0.0;
        }
        self.shipments_with_anomalies as f64 / self.shipments as f64
    }
}
