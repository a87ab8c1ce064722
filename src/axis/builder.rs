//! Builder pattern for StepperAxis.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::Clock;
use crate::config::units::Revolutions;
use crate::config::{validate_axis, AxisConfig, SystemConfig, DEFAULT_LIMIT_STOP_REVS};
use crate::error::{ConfigError, Error, Result};
use crate::telemetry::{NoDisplay, StatusSink};

use super::driver::StepperAxis;
use super::pins::AxisPins;
use super::state::AxisState;

/// Builder for creating StepperAxis instances.
///
/// Every axis needs a STEP pin, a DIR pin, a clock and a resolution. Axes
/// with limits also need both limit inputs; without limits they are ignored.
pub struct StepperAxisBuilder<STEP, DIR, IN, CLK, DISP = NoDisplay>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
    CLK: Clock,
    DISP: StatusSink,
{
    step_pin: Option<STEP>,
    dir_pin: Option<DIR>,
    button_pin: Option<IN>,
    end_limit: Option<IN>,
    home_limit: Option<IN>,
    clock: Option<CLK>,
    display: Option<DISP>,
    id: Option<heapless::String<16>>,
    has_limits: bool,
    steps_per_revolution: Option<u32>,
    limit_stop: Revolutions,
    invert_direction: bool,
    sensor_active_low: bool,
}

impl<STEP, DIR, IN, CLK> Default for StepperAxisBuilder<STEP, DIR, IN, CLK, NoDisplay>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
    CLK: Clock,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<STEP, DIR, IN, CLK> StepperAxisBuilder<STEP, DIR, IN, CLK, NoDisplay>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
    CLK: Clock,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            step_pin: None,
            dir_pin: None,
            button_pin: None,
            end_limit: None,
            home_limit: None,
            clock: None,
            display: None,
            id: None,
            has_limits: false,
            steps_per_revolution: None,
            limit_stop: DEFAULT_LIMIT_STOP_REVS,
            invert_direction: false,
            sensor_active_low: true,
        }
    }
}

impl<STEP, DIR, IN, CLK, DISP> StepperAxisBuilder<STEP, DIR, IN, CLK, DISP>
where
    STEP: OutputPin,
    DIR: OutputPin,
    IN: InputPin,
    CLK: Clock,
    DISP: StatusSink,
{
    /// Set the axis identifier used in status and logs.
    pub fn id(mut self, id: &str) -> Self {
        self.id = heapless::String::try_from(id).ok();
        self
    }

    /// Declare whether home/end limit sensors are wired.
    pub fn has_limits(mut self, has_limits: bool) -> Self {
        self.has_limits = has_limits;
        self
    }

    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: STEP) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the user button input.
    pub fn button_pin(mut self, pin: IN) -> Self {
        self.button_pin = Some(pin);
        self
    }

    /// Set the end and home limit inputs.
    pub fn limit_pins(mut self, end: IN, home: IN) -> Self {
        self.end_limit = Some(end);
        self.home_limit = Some(home);
        self
    }

    /// Set steps per output revolution.
    pub fn steps_per_revolution(mut self, steps: u32) -> Self {
        self.steps_per_revolution = Some(steps);
        self
    }

    /// Set the maximum travel allowed to stop after a limit trip.
    pub fn limit_stop_revs(mut self, revs: Revolutions) -> Self {
        self.limit_stop = revs;
        self
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Set whether sensors and button pull their line low when active.
    pub fn sensor_active_low(mut self, active_low: bool) -> Self {
        self.sensor_active_low = active_low;
        self
    }

    /// Set the time source.
    pub fn clock(mut self, clock: CLK) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Attach a status sink.
    pub fn display<D: StatusSink>(self, display: D) -> StepperAxisBuilder<STEP, DIR, IN, CLK, D> {
        StepperAxisBuilder {
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            button_pin: self.button_pin,
            end_limit: self.end_limit,
            home_limit: self.home_limit,
            clock: self.clock,
            display: Some(display),
            id: self.id,
            has_limits: self.has_limits,
            steps_per_revolution: self.steps_per_revolution,
            limit_stop: self.limit_stop,
            invert_direction: self.invert_direction,
            sensor_active_low: self.sensor_active_low,
        }
    }

    /// Configure from an AxisConfig.
    pub fn from_axis_config(mut self, config: &AxisConfig) -> Self {
        self.steps_per_revolution = Some(config.steps_per_revolution);
        self.has_limits = config.has_limits;
        self.limit_stop = config.limit_stop;
        self.invert_direction = config.invert_direction;
        self.sensor_active_low = config.sensor_active_low;
        self
    }

    /// Configure from SystemConfig by axis name. The name becomes the axis id.
    pub fn from_config(self, config: &SystemConfig, axis_name: &str) -> Result<Self> {
        let axis_config = config.axis(axis_name).ok_or_else(|| {
            Error::Config(ConfigError::AxisNotFound(
                heapless::String::try_from(axis_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.from_axis_config(axis_config).id(axis_name))
    }

    /// Build the StepperAxis.
    ///
    /// No pin is touched here: the direction line is first driven by the
    /// first motion command.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing, or if the resolution
    /// or soft-stop cap is invalid.
    pub fn build(self) -> Result<StepperAxis<STEP, DIR, IN, CLK, DISP>> {
        let steps_per_revolution = self
            .steps_per_revolution
            .ok_or(ConfigError::MissingField("steps_per_revolution"))?;

        validate_axis(&AxisConfig {
            steps_per_revolution,
            has_limits: self.has_limits,
            limit_stop: self.limit_stop,
            invert_direction: self.invert_direction,
            sensor_active_low: self.sensor_active_low,
        })?;

        let step_pin = self
            .step_pin
            .ok_or(ConfigError::MissingField("step_pin"))?;
        let dir_pin = self.dir_pin.ok_or(ConfigError::MissingField("dir_pin"))?;
        let clock = self.clock.ok_or(ConfigError::MissingField("clock"))?;

        let (end_limit, home_limit) = if self.has_limits {
            (
                Some(self.end_limit.ok_or(ConfigError::MissingField("end_limit_pin"))?),
                Some(self.home_limit.ok_or(ConfigError::MissingField("home_limit_pin"))?),
            )
        } else {
            (None, None)
        };

        let id = match self.id {
            Some(id) => id,
            None => heapless::String::try_from("1").unwrap_or_default(),
        };

        let pins = AxisPins::new(
            step_pin,
            dir_pin,
            self.button_pin,
            end_limit,
            home_limit,
            self.invert_direction,
            self.sensor_active_low,
        );
        let state = AxisState::new(id, self.has_limits, steps_per_revolution, self.limit_stop);

        Ok(StepperAxis::new(pins, clock, state, self.display))
    }
}
