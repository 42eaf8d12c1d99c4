// Domain services
pub mod checks;
pub mod detector;
pub mod grouping;

#[cfg(test)]
pub(crate) mod test_support;

pub use detector::*;
pub use grouping::*;
