//! Unit tests for configuration validation.

use stepper_axis::config::{validate_axis, validate_config, AxisConfig, Revolutions, SystemConfig};
use stepper_axis::error::{ConfigError, Error};

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = r#"
[axes.x]
steps_per_revolution = 200
has_limits = true
limit_stop_revs = 0.0
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test validation catches a zero resolution in any axis.
#[test]
fn test_zero_resolution_in_second_axis() {
    let toml_str = r#"
[axes.x]
steps_per_revolution = 200

[axes.y]
steps_per_revolution = 0
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidStepsPerRevolution(0)))
    ));
}

/// Test validation of the soft-stop cap.
#[test]
fn test_limit_stop_must_be_finite_and_non_negative() {
    let mut config = AxisConfig::new(200);

    config.limit_stop = Revolutions(-0.5);
    assert!(matches!(
        validate_axis(&config),
        Err(Error::Config(ConfigError::InvalidLimitStopRevs(_)))
    ));

    config.limit_stop = Revolutions(f32::INFINITY);
    assert!(validate_axis(&config).is_err());

    config.limit_stop = Revolutions(0.0);
    assert!(validate_axis(&config).is_ok());
}
