//! Pin bundle for one axis.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

use crate::error::{AxisError, Result};
use crate::motion::Direction;

/// Which limit sensor to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitSensor {
    /// Sensor at the origin end of travel.
    Home,
    /// Sensor at the far end of travel.
    End,
}

/// Stand-in input for axes wired without sensors or a button.
///
/// Always reads high, the idle level of an active-low input.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSensor;

impl ErrorType for NoSensor {
    type Error = Infallible;
}

impl InputPin for NoSensor {
    fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(true)
    }

    fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(false)
    }
}

/// Step/direction outputs plus the optional inputs of an axis.
pub struct AxisPins<STEP, DIR, IN> {
    step: STEP,
    dir: DIR,
    button: Option<IN>,
    end_limit: Option<IN>,
    home_limit: Option<IN>,
    invert_direction: bool,
    sensor_active_low: bool,
    /// Last level written to the direction line.
    dir_level: Option<PinState>,
}

impl<STEP, DIR, IN> AxisPins<STEP, DIR, IN>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
{
    pub(crate) fn new(
        step: STEP,
        dir: DIR,
        button: Option<IN>,
        end_limit: Option<IN>,
        home_limit: Option<IN>,
        invert_direction: bool,
        sensor_active_low: bool,
    ) -> Self {
        Self {
            step,
            dir,
            button,
            end_limit,
            home_limit,
            invert_direction,
            sensor_active_low,
            dir_level: None,
        }
    }

    /// Level that drives `direction` on this axis.
    ///
    /// Low is forward unless the direction line is inverted.
    #[inline]
    pub fn level_for(&self, direction: Direction) -> PinState {
        match (direction, self.invert_direction) {
            (Direction::Forward, false) | (Direction::Reverse, true) => PinState::Low,
            (Direction::Reverse, false) | (Direction::Forward, true) => PinState::High,
        }
    }

    /// Direction currently selected by the direction line, if it has been driven.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.dir_level.map(|level| {
            if level == self.level_for(Direction::Forward) {
                Direction::Forward
            } else {
                Direction::Reverse
            }
        })
    }

    /// Drive the direction line. Skips the write if the level is already set.
    pub(crate) fn set_direction(&mut self, direction: Direction) -> Result<()> {
        let level = self.level_for(direction);
        if self.dir_level == Some(level) {
            return Ok(());
        }

        self.dir.set_state(level).map_err(|_| AxisError::PinError)?;
        self.dir_level = Some(level);
        Ok(())
    }

    #[inline]
    pub(crate) fn step_high(&mut self) -> Result<()> {
        self.step.set_high().map_err(|_| AxisError::PinError)?;
        Ok(())
    }

    #[inline]
    pub(crate) fn step_low(&mut self) -> Result<()> {
        self.step.set_low().map_err(|_| AxisError::PinError)?;
        Ok(())
    }

    /// Whether a limit sensor reads as triggered. Absent sensors never trigger.
    pub(crate) fn sensor_triggered(&mut self, sensor: LimitSensor) -> Result<bool> {
        let active_low = self.sensor_active_low;
        let pin = match sensor {
            LimitSensor::Home => self.home_limit.as_mut(),
            LimitSensor::End => self.end_limit.as_mut(),
        };
        match pin {
            Some(pin) => read_active(pin, active_low),
            None => Ok(false),
        }
    }

    /// Whether the user button reads as pressed. Same polarity as the sensors.
    pub(crate) fn button_pressed(&mut self) -> Result<bool> {
        let active_low = self.sensor_active_low;
        match self.button.as_mut() {
            Some(pin) => read_active(pin, active_low),
            None => Ok(false),
        }
    }
}

fn read_active<IN: InputPin>(pin: &mut IN, active_low: bool) -> Result<bool> {
    let active = if active_low {
        pin.is_low()
    } else {
        pin.is_high()
    };
    Ok(active.map_err(|_| AxisError::PinError)?)
}
