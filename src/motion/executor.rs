//! Step clock: turns a [`MovePlan`] into timed pulses.
//!
//! Every step goes through the same sequence: compute the speed for this
//! step, check the limit in the direction of travel, emit a symmetric pulse,
//! account for the step, then publish the speed. Nothing else moves the
//! position counter.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::axis::{AxisPins, AxisState, LimitSensor};
use crate::clock::Clock;
use crate::config::units::Seconds;
use crate::error::Result;
use crate::telemetry::{AbortReport, MoveReport, PhaseTiming};

use super::abort::{trip_condition, StopPlan};
use super::profile::{Direction, MovePlan, Phase, PhaseKind};

/// Slowest speed a ramp will command, in steps/s.
pub const MIN_SPEED: f32 = 1.0;

/// Speed at `distance` steps from rest on a ramp of `rate` steps/s².
///
/// `v = √(2·a·d)`, floored at [`MIN_SPEED`] so the first step of a ramp is
/// still emitted.
#[inline]
pub fn ramp_speed(rate: f32, distance: u32) -> f32 {
    let v = libm::sqrtf(2.0 * rate * distance as f32);
    if v.is_nan() || v < MIN_SPEED {
        MIN_SPEED
    } else {
        v
    }
}

/// Half of the step period at `speed` steps/s, in whole microseconds.
#[inline]
pub fn half_period_us(speed: f32) -> u64 {
    let speed = if speed.is_nan() || speed < MIN_SPEED {
        MIN_SPEED
    } else {
        speed
    };
    ((1_000_000.0 / speed) as u64) / 2
}

/// Result of running one phase.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PhaseOutcome {
    pub emitted: u32,
    pub abort: Option<AbortReport>,
}

/// Borrowed view of an axis while it is stepping.
pub(crate) struct StepClock<'a, STEP, DIR, IN, CLK> {
    pins: &'a mut AxisPins<STEP, DIR, IN>,
    clock: &'a mut CLK,
    state: &'a mut AxisState,
}

impl<'a, STEP, DIR, IN, CLK> StepClock<'a, STEP, DIR, IN, CLK>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
    CLK: Clock,
{
    pub(crate) fn new(
        pins: &'a mut AxisPins<STEP, DIR, IN>,
        clock: &'a mut CLK,
        state: &'a mut AxisState,
    ) -> Self {
        Self { pins, clock, state }
    }

    /// Drive the direction line. Must happen before the first step of a phase.
    #[inline]
    pub(crate) fn set_direction(&mut self, direction: Direction) -> Result<()> {
        self.pins.set_direction(direction)
    }

    /// Limit in the direction of travel is triggered.
    #[inline]
    pub(crate) fn tripped(&mut self) -> Result<bool> {
        trip_condition(self.pins, self.state.has_limits)
    }

    /// Emit one symmetric pulse and account for it.
    ///
    /// High for `half_us`, low for `half_us`, then the position moves by the
    /// sign selected on the direction line and `speed` (steps/s) is published.
    pub(crate) fn pulse(&mut self, half_us: u64, speed: f32) -> Result<()> {
        let sign = self.pins.direction().map_or(0, Direction::sign);
        let start = self.clock.now_us();

        self.pins.step_high()?;
        self.clock.wait_until_us(start.saturating_add(half_us));
        self.pins.step_low()?;
        self.clock
            .wait_until_us(start.saturating_add(half_us.saturating_mul(2)));

        self.state.position.advance(sign);
        self.state.speed_rps = speed / self.state.steps_per_rev as f32;
        Ok(())
    }

    /// Mark the axis as stopped.
    #[inline]
    pub(crate) fn rest(&mut self) {
        self.state.speed_rps = 0.0;
    }

    /// Run a whole plan, stopping early on a limit trip.
    pub(crate) fn run_plan(&mut self, plan: &MovePlan) -> Result<MoveReport> {
        self.set_direction(plan.direction)?;

        let timing = |kind: PhaseKind, steps: u32| PhaseTiming {
            planned_steps: steps,
            expected_secs: plan.expected_secs(kind),
            ..PhaseTiming::default()
        };
        let mut report = MoveReport {
            shape: plan.shape,
            direction: plan.direction,
            accel: timing(PhaseKind::Accelerate, plan.accel_steps),
            cruise: timing(PhaseKind::Cruise, plan.cruise_steps),
            decel: timing(PhaseKind::Decelerate, plan.decel_steps),
            final_position: self.state.position.steps().value(),
            abort: None,
        };

        for phase in plan.phases() {
            if phase.steps == 0 {
                continue;
            }

            let started = self.clock.now_us();
            let outcome = self.run_phase(&phase, plan.cruise_speed)?;
            let elapsed = self.clock.now_us().saturating_sub(started);

            let timing = report.phase_mut(phase.kind);
            timing.emitted_steps = outcome.emitted;
            timing.actual_secs = Seconds::from_micros(elapsed).value();

            if outcome.abort.is_some() {
                report.abort = outcome.abort;
                break;
            }
        }

        self.rest();
        report.final_position = self.state.position.steps().value();
        Ok(report)
    }

    fn run_phase(&mut self, phase: &Phase, cruise_speed: f32) -> Result<PhaseOutcome> {
        trace!("{} phase: {} steps", phase.kind, phase.steps);
        let cruise_half = half_period_us(cruise_speed);

        for i in 0..phase.steps {
            let speed = match phase.kind {
                PhaseKind::Accelerate => ramp_speed(phase.rate, i),
                PhaseKind::Cruise => cruise_speed,
                PhaseKind::Decelerate => ramp_speed(phase.rate, phase.steps - i),
            };

            if self.tripped()? {
                let trip_position = self.state.position.steps().value();
                warn!("Limit hit during {} at {}", phase.kind, trip_position);

                let stop = StopPlan::new(speed, phase.stop_rate, self.state.limit_stop_steps());
                let stop_steps = self.run_stop(&stop, phase.stop_rate)?;

                return Ok(PhaseOutcome {
                    emitted: i,
                    abort: Some(AbortReport {
                        phase: phase.kind,
                        trip_position,
                        trip_speed: stop.trip_speed,
                        stop_steps,
                        stop_rate: stop.rate,
                    }),
                });
            }

            let half = match phase.kind {
                PhaseKind::Cruise => cruise_half,
                _ => half_period_us(speed),
            };
            self.pulse(half, speed)?;
        }

        Ok(PhaseOutcome {
            emitted: phase.steps,
            abort: None,
        })
    }

    /// Step at constant speed until `sensor` reads `until_triggered`.
    ///
    /// Used by homing; the direction-aware trip is not consulted. Returns the
    /// number of steps taken.
    pub(crate) fn creep(
        &mut self,
        direction: Direction,
        speed: f32,
        sensor: LimitSensor,
        until_triggered: bool,
    ) -> Result<u32> {
        self.set_direction(direction)?;
        let half = (500_000.0 / speed.max(MIN_SPEED)) as u64;
        let mut steps: u32 = 0;

        while self.pins.sensor_triggered(sensor)? != until_triggered {
            self.pulse(half, speed)?;
            steps = steps.saturating_add(1);
        }

        self.rest();
        debug!("Creep {}: {} steps", direction, steps);
        Ok(steps)
    }
}
