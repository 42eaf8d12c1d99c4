/// Lookup key for the historical value baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineQuery<'a> {
    pub origin_city: Option<&'a str>,
    pub destination_city: Option<&'a str>,
    pub cargo_type: Option<&'a str>,
}

/// Read-only source of historical cargo values. Implementations must be safe
/// to share across threads once loaded.
pub trait BaselineProvider: Send + Sync {
    fn average_cargo_value(&self, query: &BaselineQuery<'_>) -> Option<f64>;
}
