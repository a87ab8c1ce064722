//! Unit tests for TOML configuration parsing.

use stepper_axis::config::{load_config, parse_config, SystemConfig, DEFAULT_LIMIT_STOP_REVS};

/// Test parsing a full axis configuration from TOML.
#[test]
fn test_parse_axis_config() {
    let toml_str = r#"
[axes.carriage]
steps_per_revolution = 1600
has_limits = true
limit_stop_revs = 1.5
invert_direction = true
sensor_active_low = false
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let axis = config.axis("carriage").expect("Axis not found");

    assert_eq!(axis.steps_per_revolution, 1600);
    assert!(axis.has_limits);
    assert_eq!(axis.limit_stop.value(), 1.5);
    assert!(axis.invert_direction);
    assert!(!axis.sensor_active_low);
    assert_eq!(axis.limit_stop_steps(), 2400);
}

/// Test defaults for omitted fields.
#[test]
fn test_parse_defaults() {
    let toml_str = r#"
[axes.spindle]
steps_per_revolution = 200
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let axis = config.axis("spindle").expect("Axis not found");

    assert!(!axis.has_limits);
    assert!(!axis.invert_direction);
    assert!(axis.sensor_active_low);
    assert_eq!(axis.limit_stop, DEFAULT_LIMIT_STOP_REVS);
}

/// Test parsing several axes keeps their order.
#[test]
fn test_parse_multiple_axes() {
    let toml_str = r#"
[axes.x]
steps_per_revolution = 200
has_limits = true

[axes.y]
steps_per_revolution = 400
has_limits = true

[axes.spindle]
steps_per_revolution = 200
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let names: Vec<&str> = config.axis_names().collect();

    assert_eq!(names, ["x", "y", "spindle"]);
    assert!(config.axis("z").is_none());
}

/// Test that a missing resolution is a parse error.
#[test]
fn test_missing_resolution() {
    let toml_str = r#"
[axes.x]
has_limits = true
"#;

    assert!(parse_config(toml_str).is_err());
}

/// Test loading configuration from a file.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join("stepper_axis_load_config_test.toml");
    std::fs::write(
        &path,
        r#"
[axes.stage]
steps_per_revolution = 800
has_limits = true
"#,
    )
    .expect("Failed to write temp config");

    let config = load_config(&path).expect("Failed to load config");
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.axis("stage").map(|a| a.steps_per_revolution), Some(800));
}
