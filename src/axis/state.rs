//! Runtime state of an axis.

use core::fmt;

use crate::config::units::{Revolutions, Steps};

use super::position::Position;

/// Homing and calibration progress.
///
/// `SeekHome → BackOff → Homed` establishes the origin; `SeekEnd → Calibrated`
/// then records the far end of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingState {
    /// Creeping toward the home sensor.
    SeekHome,
    /// Creeping forward until the home sensor releases.
    BackOff,
    /// Origin set at the release point.
    Homed,
    /// Creeping toward the end sensor.
    SeekEnd,
    /// End position recorded.
    Calibrated,
}

impl fmt::Display for HomingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HomingState::SeekHome => "Seeking home",
            HomingState::BackOff => "Backing off",
            HomingState::Homed => "Homed",
            HomingState::SeekEnd => "Seeking end",
            HomingState::Calibrated => "Calibrated",
        })
    }
}

/// Everything the engine tracks about an axis besides its pins.
#[derive(Debug, Clone)]
pub struct AxisState {
    pub(crate) id: heapless::String<16>,
    pub(crate) has_limits: bool,
    pub(crate) steps_per_rev: u32,
    pub(crate) limit_stop: Revolutions,
    pub(crate) position: Position,
    /// Position recorded at the end sensor.
    pub(crate) end_pos: Steps,
    /// Distance from origin to end sensor, equal to `end_pos` once calibrated.
    pub(crate) axis_length: i64,
    pub(crate) calibrated: bool,
    /// Last commanded speed in rev/s. Zero whenever the axis is at rest.
    pub(crate) speed_rps: f32,
}

impl AxisState {
    pub(crate) fn new(
        id: heapless::String<16>,
        has_limits: bool,
        steps_per_rev: u32,
        limit_stop: Revolutions,
    ) -> Self {
        Self {
            id,
            has_limits,
            steps_per_rev,
            limit_stop,
            position: Position::new(steps_per_rev),
            end_pos: Steps::default(),
            axis_length: 0,
            calibrated: false,
            speed_rps: 0.0,
        }
    }

    /// Soft-stop cap in whole steps.
    #[inline]
    pub(crate) fn limit_stop_steps(&self) -> u32 {
        self.limit_stop.whole_steps(self.steps_per_rev)
    }

    /// Record the current position as the end of travel.
    pub(crate) fn record_end(&mut self) {
        self.end_pos = self.position.steps();
        self.axis_length = self.end_pos.value();
        self.calibrated = true;
    }
}
