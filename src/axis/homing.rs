//! Homing and calibration.
//!
//! Creeps onto the home sensor, backs off until it releases and takes that
//! point as the origin. Calibration continues to the end sensor and records
//! the axis length. There are no retries and no timeout: a stalled axis
//! blocks here.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::Clock;
use crate::config::units::{RevsPerSec, Steps};
use crate::error::{MotionError, Result};
use crate::motion::{Direction, StepClock};
use crate::telemetry::StatusSink;

use super::driver::StepperAxis;
use super::pins::LimitSensor;
use super::state::HomingState;

impl<STEP, DIR, IN, CLK, DISP> StepperAxis<STEP, DIR, IN, CLK, DISP>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
    CLK: Clock,
    DISP: StatusSink,
{
    /// Establish the origin at the home sensor's release point.
    ///
    /// On return the position is 0 and the home sensor is clear.
    ///
    /// # Errors
    ///
    /// Fails before any line is touched if the axis has no limits or `slow`
    /// is not a positive finite speed.
    pub fn home(&mut self, slow: RevsPerSec) -> Result<()> {
        self.run_homing(HomingState::SeekHome, HomingState::Homed, slow)?;
        Ok(())
    }

    /// Creep forward to the end sensor and record the end position.
    ///
    /// Doesn't move if the end sensor is already triggered. Returns the end
    /// position.
    pub fn find_end(&mut self, slow: RevsPerSec) -> Result<Steps> {
        self.run_homing(HomingState::SeekEnd, HomingState::Calibrated, slow)?;
        Ok(self.state.end_pos)
    }

    /// Home, then find the end. Returns the axis length in steps.
    pub fn calibrate(&mut self, slow: RevsPerSec) -> Result<i64> {
        self.run_homing(HomingState::SeekHome, HomingState::Calibrated, slow)?;
        Ok(self.state.axis_length)
    }

    fn run_homing(
        &mut self,
        start: HomingState,
        goal: HomingState,
        slow: RevsPerSec,
    ) -> Result<HomingState> {
        self.require_limits()?;
        if !slow.is_valid() {
            return Err(MotionError::InvalidSpeed(slow.value()).into());
        }
        let speed = slow.to_steps_per_sec(self.state.steps_per_rev);

        let result = self.step_homing(start, goal, speed);
        self.state.speed_rps = 0.0;
        let reached = result?;

        self.refresh_status()?;
        Ok(reached)
    }

    fn step_homing(
        &mut self,
        start: HomingState,
        goal: HomingState,
        speed: f32,
    ) -> Result<HomingState> {
        let mut phase = start;
        loop {
            debug!("Axis {}: {}", self.state.id.as_str(), phase);
            phase = match phase {
                HomingState::SeekHome => {
                    if !self.pins.sensor_triggered(LimitSensor::Home)? {
                        StepClock::new(&mut self.pins, &mut self.clock, &mut self.state)
                            .creep(Direction::Reverse, speed, LimitSensor::Home, true)?;
                    }
                    HomingState::BackOff
                }
                HomingState::BackOff => {
                    StepClock::new(&mut self.pins, &mut self.clock, &mut self.state).creep(
                        Direction::Forward,
                        speed,
                        LimitSensor::Home,
                        false,
                    )?;
                    HomingState::Homed
                }
                HomingState::Homed => {
                    self.state.position.set_origin();
                    info!("Axis {}: homed", self.state.id.as_str());
                    if goal == HomingState::Homed {
                        break;
                    }
                    HomingState::SeekEnd
                }
                HomingState::SeekEnd => {
                    if !self.pins.sensor_triggered(LimitSensor::End)? {
                        StepClock::new(&mut self.pins, &mut self.clock, &mut self.state)
                            .creep(Direction::Forward, speed, LimitSensor::End, true)?;
                    }
                    self.state.record_end();
                    info!(
                        "Axis {}: end at {} steps",
                        self.state.id.as_str(),
                        self.state.axis_length
                    );
                    HomingState::Calibrated
                }
                HomingState::Calibrated => break,
            };
        }
        Ok(phase)
    }
}
