//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{AxisConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks:
/// - Steps per revolution is non-zero
/// - The soft-stop cap is finite and not negative
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (_, axis) in config.axes.iter() {
        validate_axis(axis)?;
    }

    Ok(())
}

/// Validate a single axis configuration.
pub fn validate_axis(config: &AxisConfig) -> Result<()> {
    if config.steps_per_revolution == 0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(
            config.steps_per_revolution,
        )));
    }

    let stop = config.limit_stop.value();
    if !stop.is_finite() || stop < 0.0 {
        return Err(Error::Config(ConfigError::InvalidLimitStopRevs(stop)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::Revolutions;

    #[test]
    fn test_zero_steps_per_revolution() {
        let config = AxisConfig::new(0);

        let result = validate_axis(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidStepsPerRevolution(0)))
        ));
    }

    #[test]
    fn test_negative_limit_stop() {
        let mut config = AxisConfig::new(200);
        config.limit_stop = Revolutions(-1.0);

        let result = validate_axis(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidLimitStopRevs(_)))
        ));
    }

    #[test]
    fn test_zero_limit_stop_is_valid() {
        let mut config = AxisConfig::new(200);
        config.limit_stop = Revolutions(0.0);

        assert!(validate_axis(&config).is_ok());
    }
}
