//! Axis configuration from TOML.

use serde::Deserialize;

use super::units::Revolutions;

/// Default soft-stop cap applied after a limit trip.
pub const DEFAULT_LIMIT_STOP_REVS: Revolutions = Revolutions(2.0);

/// Complete axis configuration from TOML.
///
/// The axis identifier is the table key (`[axes.<id>]`), not a field.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Steps per output revolution, as seen by the STEP line.
    pub steps_per_revolution: u32,

    /// Whether home/end limit sensors are wired.
    #[serde(default)]
    pub has_limits: bool,

    /// Maximum travel allowed to stop after a limit trip. `0` stops immediately.
    #[serde(default = "default_limit_stop_revs", rename = "limit_stop_revs")]
    pub limit_stop: Revolutions,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Sensors and button pull the line low when triggered (NPN / pull-up wiring).
    #[serde(default = "default_active_low")]
    pub sensor_active_low: bool,
}

fn default_limit_stop_revs() -> Revolutions {
    DEFAULT_LIMIT_STOP_REVS
}

fn default_active_low() -> bool {
    true
}

impl AxisConfig {
    /// Create a configuration with defaults for everything but the resolution.
    pub fn new(steps_per_revolution: u32) -> Self {
        Self {
            steps_per_revolution,
            has_limits: false,
            limit_stop: DEFAULT_LIMIT_STOP_REVS,
            invert_direction: false,
            sensor_active_low: true,
        }
    }

    /// Soft-stop cap converted to whole steps.
    pub fn limit_stop_steps(&self) -> u32 {
        self.limit_stop.whole_steps(self.steps_per_revolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_stop_steps() {
        let mut config = AxisConfig::new(200);
        assert_eq!(config.limit_stop_steps(), 400);

        config.limit_stop = Revolutions(0.25);
        assert_eq!(config.limit_stop_steps(), 50);

        config.limit_stop = Revolutions(0.0);
        assert_eq!(config.limit_stop_steps(), 0);
    }
}
