// Domain entities
pub mod analysis;
pub mod anomaly;
pub mod batch;
pub mod historical;
pub mod runtime;
pub mod shipment;
pub mod thresholds;

pub use analysis::*;
pub use anomaly::*;
pub use batch::*;
pub use historical::*;
pub use runtime::*;
pub use shipment::*;
pub use thresholds::*;
