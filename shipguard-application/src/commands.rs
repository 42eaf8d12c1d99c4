pub mod analyze_commands;
pub mod batch_commands;

pub use analyze_commands::*;
pub use batch_commands::*;
