// One module per detection pass. Every pass reads the shipment and returns
// its own anomalies; none of them mutates shared state.
pub mod delay;
pub mod fraud;
pub mod route;
pub mod speed;
pub mod status;
pub mod stops;
pub mod temperature;
