// Shipguard Infrastructure Layer

pub mod config;
pub mod repositories;
pub mod utils;

pub use config::*;
pub use repositories::*;
pub use utils::*;
