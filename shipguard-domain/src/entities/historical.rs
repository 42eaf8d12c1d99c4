// Historical baseline
// Past shipments used to judge whether a declared cargo value is plausible

use serde::{Deserialize, Serialize};

use crate::ports::{BaselineProvider, BaselineQuery};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalShipment {
    pub origin_city: Option<String>,
    pub destination_city: Option<String>,
    pub cargo_type: Option<String>,
    pub cargo_value: Option<f64>,
}

impl HistoricalShipment {
    /// Same origin and destination city, or the same cargo type.
    pub fn matches(&self, query: &BaselineQuery<'_>) -> bool {
        let same_lane = match (query.origin_city, query.destination_city) {
            (Some(origin), Some(destination)) => {
                self.origin_city.as_deref() == Some(origin)
                    && self.destination_city.as_deref() == Some(destination)
            }
            _ => false,
        };
        let same_cargo = query
            .cargo_type
            .is_some_and(|cargo_type| self.cargo_type.as_deref() == Some(cargo_type));
        same_lane || same_cargo
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoricalBaseline {
    rows: Vec<HistoricalShipment>,
}

impl HistoricalBaseline {
    pub fn new(rows: Vec<HistoricalShipment>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl BaselineProvider for HistoricalBaseline {
    fn average_cargo_value(&self, query: &BaselineQuery<'_>) -> Option<f64> {
        let (sum, count) = self
            .rows
            .iter()
            .filter(|row| row.matches(query))
            .filter_map(|row| row.cargo_value)
            .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
        if count == 0 {
            return None;
        }
        Some(sum / count as f64)
    }
}
