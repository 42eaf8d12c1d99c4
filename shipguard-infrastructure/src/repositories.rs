pub mod historical_csv;
pub mod shipment_files;

pub use historical_csv::*;
pub use shipment_files::*;
