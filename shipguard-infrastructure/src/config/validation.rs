use anyhow::{anyhow, Result};

/// Thresholds must be finite and strictly positive.
pub fn validate_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(anyhow!("{} must be a positive number, got {}", name, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_positive_finite_values() {
        assert!(validate_positive("speed_threshold", 120.0).is_ok());
        assert!(validate_positive("speed_threshold", 0.0).is_err());
        assert!(validate_positive("speed_threshold", f64::NAN).is_err());
        assert!(validate_positive("speed_threshold", f64::INFINITY).is_err());
    }
}
