pub mod batch;
pub mod context;
pub mod lifecycle;
pub mod logging;

pub use batch::run_analyze;
pub use lifecycle::run_standalone;
pub use logging::init_logging;
