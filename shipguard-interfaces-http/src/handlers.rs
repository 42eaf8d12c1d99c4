pub mod analyze_handlers;
pub mod ops_handlers;

pub use analyze_handlers::*;
pub use ops_handlers::*;
