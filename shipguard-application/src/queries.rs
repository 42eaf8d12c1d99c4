pub mod threshold_queries;

pub use threshold_queries::*;
