// Shipment status value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
    Delayed,
    Cancelled,
}

impl ShipmentStatus {
    /// Exact, case-sensitive match. Anything else is "no status".
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ShipmentStatus::Pending),
            "in_transit" => Some(ShipmentStatus::InTransit),
            "delivered" => Some(ShipmentStatus::Delivered),
            "delayed" => Some(ShipmentStatus::Delayed),
            "cancelled" => Some(ShipmentStatus::Cancelled),
            _ => None,
        }
    }
}
