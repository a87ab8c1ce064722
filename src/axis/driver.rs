//! Stepper axis driver.
//!
//! Generic over embedded-hal 1.0 pin types, a [`Clock`] and an optional
//! [`StatusSink`]. Limits and the display are runtime options of the same
//! engine.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::Clock;
use crate::config::units::{Revolutions, RevsPerSec, Seconds, Steps};
use crate::error::{AxisError, MotionError, Result};
use crate::motion::{Direction, MovePlan, StepClock};
use crate::telemetry::{AxisStatus, LimitState, MoveReport, NoDisplay, StatusSink, StatusThrottle};

use super::builder::StepperAxisBuilder;
use super::pins::{AxisPins, LimitSensor};
use super::state::AxisState;

/// Fraction of a revolution below which a position-referenced move is skipped.
const TARGET_TOLERANCE_REVS: f32 = 0.01;

/// Longest ramp used by position-referenced moves, in revolutions.
const TARGET_RAMP_REVS: u32 = 2;

/// One stepper axis.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `IN`: limit sensor and button input type (must implement `InputPin`)
/// - `CLK`: microsecond time source
/// - `DISP`: status sink (defaults to [`NoDisplay`])
pub struct StepperAxis<STEP, DIR, IN, CLK, DISP = NoDisplay>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
    CLK: Clock,
    DISP: StatusSink,
{
    pub(super) pins: AxisPins<STEP, DIR, IN>,
    pub(super) clock: CLK,
    pub(super) state: AxisState,
    display: Option<DISP>,
    throttle: StatusThrottle,
}

impl<STEP, DIR, IN, CLK> StepperAxis<STEP, DIR, IN, CLK, NoDisplay>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
    CLK: Clock,
{
    /// Start building an axis.
    pub fn builder() -> StepperAxisBuilder<STEP, DIR, IN, CLK> {
        StepperAxisBuilder::new()
    }
}

impl<STEP, DIR, IN, CLK, DISP> StepperAxis<STEP, DIR, IN, CLK, DISP>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
    CLK: Clock,
    DISP: StatusSink,
{
    pub(crate) fn new(
        pins: AxisPins<STEP, DIR, IN>,
        clock: CLK,
        state: AxisState,
        display: Option<DISP>,
    ) -> Self {
        Self {
            pins,
            clock,
            state,
            display,
            throttle: StatusThrottle::default(),
        }
    }

    /// Get the axis identifier.
    #[inline]
    pub fn id(&self) -> &str {
        self.state.id.as_str()
    }

    /// Get steps per revolution.
    #[inline]
    pub fn steps_per_revolution(&self) -> u32 {
        self.state.steps_per_rev
    }

    /// Whether limit sensors are wired.
    #[inline]
    pub fn has_limits(&self) -> bool {
        self.state.has_limits
    }

    /// Get current position in steps.
    #[inline]
    pub fn position(&self) -> Steps {
        self.state.position.steps()
    }

    /// Get current position in revolutions.
    #[inline]
    pub fn position_revs(&self) -> Revolutions {
        self.state.position.revolutions()
    }

    /// Position recorded at the end sensor, once calibrated.
    #[inline]
    pub fn end_position(&self) -> Option<Steps> {
        self.state.calibrated.then_some(self.state.end_pos)
    }

    /// Distance from origin to the end sensor in steps (0 until calibrated).
    #[inline]
    pub fn axis_length(&self) -> i64 {
        self.state.axis_length
    }

    /// Whether an end position has been recorded.
    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.state.calibrated
    }

    /// Last commanded speed. Zero whenever the axis is at rest.
    #[inline]
    pub fn speed_rps(&self) -> RevsPerSec {
        RevsPerSec(self.state.speed_rps)
    }

    /// Direction currently selected on the DIR line.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.pins.direction()
    }

    /// Read the limit sensors.
    pub fn limit_state(&mut self) -> Result<LimitState> {
        if !self.state.has_limits {
            return Ok(LimitState::NoLimits);
        }
        let at_home = self.pins.sensor_triggered(LimitSensor::Home)?;
        let at_end = self.pins.sensor_triggered(LimitSensor::End)?;
        Ok(LimitState::from_sensors(at_home, at_end))
    }

    /// Snapshot of position and limits.
    pub fn status(&mut self) -> Result<AxisStatus> {
        Ok(AxisStatus {
            id: self.state.id.clone(),
            position_revs: self.state.position.revolutions().value(),
            limits: self.limit_state()?,
        })
    }

    /// Read the user button.
    pub fn button_pressed(&mut self) -> Result<bool> {
        self.pins.button_pressed()
    }

    /// Push a status snapshot to the display if one is attached and the
    /// 10 Hz budget allows it. Returns whether the display was updated.
    pub fn refresh_status(&mut self) -> Result<bool> {
        if self.display.is_none() {
            return Ok(false);
        }
        let now = self.clock.now_us();
        if !self.throttle.ready(now) {
            return Ok(false);
        }

        let status = self.status()?;
        if let Some(display) = self.display.as_mut() {
            display.show(&status);
        }
        Ok(true)
    }

    /// Ramp through explicit phase distances.
    ///
    /// Direction follows the sign of `accel`. The cruise runs at `cruise`;
    /// both ramps are solved to meet it exactly.
    ///
    /// # Errors
    ///
    /// Fails before any line is touched if the speed is invalid or either ramp
    /// rounds to zero steps. A limit trip is not an error: see
    /// [`MoveReport::abort`].
    pub fn profile_move(
        &mut self,
        accel: Revolutions,
        cruise_distance: Revolutions,
        decel: Revolutions,
        cruise: RevsPerSec,
    ) -> Result<MoveReport> {
        let plan = MovePlan::phase_distance(
            accel,
            cruise_distance,
            decel,
            cruise,
            self.state.steps_per_rev,
        )?;
        self.execute(&plan)
    }

    /// Move `revolutions` in `total_time`, cruising at no more than `max_speed`.
    ///
    /// Falls back to a triangular profile when `max_speed` cannot be used in
    /// the requested time; the report's `shape` records which was run.
    pub fn timed_move(
        &mut self,
        revolutions: Revolutions,
        max_speed: RevsPerSec,
        total_time: Seconds,
    ) -> Result<MoveReport> {
        let plan = MovePlan::timed(revolutions, max_speed, total_time, self.state.steps_per_rev)?;
        self.execute(&plan)
    }

    /// Turn `revolutions` at constant speed, without ramps.
    pub fn rotate(&mut self, revolutions: Revolutions, speed: RevsPerSec) -> Result<MoveReport> {
        let plan = MovePlan::constant_velocity(revolutions, speed, self.state.steps_per_rev)?;
        self.execute(&plan)
    }

    /// Run a precomputed plan.
    ///
    /// # Errors
    ///
    /// Rejects a plan that fails [`MovePlan::validate`] before any line is
    /// touched.
    pub fn execute(&mut self, plan: &MovePlan) -> Result<MoveReport> {
        plan.validate()?;
        debug!(
            "Axis {}: {} move of {} steps",
            self.state.id.as_str(),
            plan.shape,
            plan.total_steps()
        );

        let result = StepClock::new(&mut self.pins, &mut self.clock, &mut self.state).run_plan(plan);
        self.state.speed_rps = 0.0;
        let report = result?;

        info!(
            "Axis {}: move complete at {} ({} steps)",
            self.state.id.as_str(),
            report.final_position,
            report.steps_emitted()
        );
        self.refresh_status()?;
        Ok(report)
    }

    /// Return to the origin with a ramped move.
    ///
    /// Returns `Ok(None)` without moving when already within 0.01 rev.
    pub fn move_to_home(&mut self, cruise: RevsPerSec) -> Result<Option<MoveReport>> {
        self.require_limits()?;
        self.move_to_target(Steps(0), cruise)
    }

    /// Travel to the recorded end position with a ramped move.
    ///
    /// # Errors
    ///
    /// [`AxisError::NotCalibrated`] until [`find_end`](Self::find_end) or
    /// [`calibrate`](Self::calibrate) has run.
    pub fn move_to_end(&mut self, cruise: RevsPerSec) -> Result<Option<MoveReport>> {
        self.require_limits()?;
        if !self.state.calibrated {
            return Err(AxisError::NotCalibrated.into());
        }
        self.move_to_target(self.state.end_pos, cruise)
    }

    fn move_to_target(&mut self, target: Steps, cruise: RevsPerSec) -> Result<Option<MoveReport>> {
        if !cruise.is_valid() {
            return Err(MotionError::InvalidSpeed(cruise.value()).into());
        }

        let spr = self.state.steps_per_rev;
        let distance = self.state.position.steps_to(target);
        if (distance.unsigned_abs() as f32) < TARGET_TOLERANCE_REVS * spr as f32 {
            info!(
                "Axis {}: already at target {}",
                self.state.id.as_str(),
                target.value()
            );
            return Ok(None);
        }

        let total = u32::try_from(distance.unsigned_abs()).map_err(|_| MotionError::Overflow)?;
        let direction = Direction::from_steps(distance);
        let ramp = spr.saturating_mul(TARGET_RAMP_REVS).min(total / 3);

        let plan = if ramp == 0 {
            MovePlan::constant_steps(direction, total, cruise, spr)?
        } else {
            MovePlan::from_phase_steps(direction, ramp, total - 2 * ramp, ramp, cruise, spr)?
        };
        self.execute(&plan).map(Some)
    }

    pub(super) fn require_limits(&self) -> Result<()> {
        if self.state.has_limits {
            Ok(())
        } else {
            Err(AxisError::LimitsNotConfigured.into())
        }
    }
}
