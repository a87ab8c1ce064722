//! Limit-aware abort.
//!
//! A trip is only checked for the sensor the axis is moving toward. Once a
//! trip is seen the current phase is abandoned and a short stopping ramp is
//! run, bounded by the axis' soft-stop cap.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::axis::{AxisPins, LimitSensor};
use crate::clock::Clock;
use crate::error::Result;

use super::executor::{half_period_us, ramp_speed, StepClock, MIN_SPEED};
use super::profile::Direction;

/// Sensor that guards motion in `direction`.
#[inline]
pub fn guarding_sensor(direction: Direction) -> LimitSensor {
    match direction {
        Direction::Forward => LimitSensor::End,
        Direction::Reverse => LimitSensor::Home,
    }
}

/// Whether the limit in the current direction of travel is triggered.
///
/// Always `false` for an axis without limits or before the direction line has
/// been driven.
pub(crate) fn trip_condition<STEP, DIR, IN>(
    pins: &mut AxisPins<STEP, DIR, IN>,
    has_limits: bool,
) -> Result<bool>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
{
    if !has_limits {
        return Ok(false);
    }
    match pins.direction() {
        Some(direction) => pins.sensor_triggered(guarding_sensor(direction)),
        None => Ok(false),
    }
}

/// Stopping ramp computed at a trip.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StopPlan {
    /// Speed at the trip in steps/s.
    pub trip_speed: f32,
    /// Steps to emit while stopping (0 for an immediate stop).
    pub steps: u32,
    /// Deceleration over those steps in steps/s².
    pub rate: f32,
}

impl StopPlan {
    /// Plan the stop from the trip speed and the rate the phase was ramping at.
    ///
    /// The natural stopping distance `v² / 2a` is clamped to `[1, cap_steps]`
    /// and the ramp re-solved for that distance, so a tight cap gives a harder
    /// stop. A zero cap, or a phase without a ramp, stops on the spot.
    pub fn new(trip_speed: f32, phase_rate: Option<f32>, cap_steps: u32) -> Self {
        let v = if trip_speed < MIN_SPEED {
            MIN_SPEED
        } else {
            trip_speed
        };

        let steps = match phase_rate {
            Some(rate) if rate > 0.0 && cap_steps > 0 => {
                let required = (v * v / (2.0 * rate)) as u32;
                required.clamp(1, cap_steps)
            }
            _ => 0,
        };

        let rate = if steps > 0 {
            v * v / (2.0 * steps as f32)
        } else {
            0.0
        };

        Self {
            trip_speed: v,
            steps,
            rate,
        }
    }

    /// Check if the motor stops without further steps.
    #[inline]
    pub fn is_immediate(&self) -> bool {
        self.steps == 0
    }

    /// Whether the cap forced a harder stop than the phase was planned for.
    #[inline]
    pub fn exceeds(&self, phase_rate: f32) -> bool {
        self.rate > phase_rate
    }

    /// Speed for stop step `j` (0-based).
    #[inline]
    pub fn speed_at(&self, j: u32) -> f32 {
        ramp_speed(self.rate, self.steps.saturating_sub(j))
    }
}

impl<STEP, DIR, IN, CLK> StepClock<'_, STEP, DIR, IN, CLK>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
    CLK: Clock,
{
    /// Run a stopping ramp in the current direction and leave the axis at rest.
    ///
    /// The trip is not re-checked while stopping.
    pub(crate) fn run_stop(&mut self, stop: &StopPlan, phase_rate: Option<f32>) -> Result<u32> {
        if let Some(rate) = phase_rate {
            if stop.exceeds(rate) {
                warn!(
                    "Soft-stop cap forces {} steps/s^2 (planned {})",
                    stop.rate,
                    rate
                );
            }
        }
        debug!("Stopping in {} steps", stop.steps);

        for j in 0..stop.steps {
            let speed = stop.speed_at(j);
            self.pulse(half_period_us(speed), speed)?;
        }
        self.rest();
        Ok(stop.steps)
    }
}
