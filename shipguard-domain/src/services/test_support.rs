use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::entities::{DetectionThresholds, ShipmentRecord};
use crate::ports::BaselineProvider;
use crate::services::CheckContext;

pub fn shipment(value: Value) -> ShipmentRecord {
    ShipmentRecord::from_value(&value).expect("shipment fixture")
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("fixed clock")
}

pub fn context(thresholds: &DetectionThresholds) -> CheckContext<'_> {
    CheckContext {
        thresholds,
        baseline: None,
        now: fixed_now(),
    }
}

pub fn context_with<'a>(
    thresholds: &'a DetectionThresholds,
    baseline: &'a dyn BaselineProvider,
) -> CheckContext<'a> {
    CheckContext {
        thresholds,
        baseline: Some(baseline),
        now: fixed_now(),
    }
}
