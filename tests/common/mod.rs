//! Simulated axis rig shared by the integration tests.
//!
//! Every pin handle shares one [`Sim`]: a rising edge on STEP moves the
//! carriage one step in the direction selected by DIR (low = forward), and
//! the sensors are computed from the carriage position. Sensors and button
//! are active-low. The clock only advances when the engine waits on it.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stepper_axis::{AxisStatus, Clock, StatusSink, StepperAxis, StepperAxisBuilder};

/// Shared state of the simulated machine.
#[derive(Debug, Default)]
pub struct Sim {
    /// Carriage position in steps.
    pub pos: i64,
    pub dir_high: bool,
    pub step_high: bool,
    /// Rising edges seen on STEP.
    pub edges: u64,
    /// Writes to DIR.
    pub dir_writes: u32,
    /// Home sensor is triggered at or below this position.
    pub home_at: Option<i64>,
    /// End sensor is triggered at or above this position.
    pub end_at: Option<i64>,
    pub button: bool,
}

impl Sim {
    pub fn home_triggered(&self) -> bool {
        self.home_at.map_or(false, |home| self.pos <= home)
    }

    pub fn end_triggered(&self) -> bool {
        self.end_at.map_or(false, |end| self.pos >= end)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Step,
    Dir,
    Home,
    End,
    Button,
}

/// Handle onto one line of the simulated machine.
#[derive(Clone)]
pub struct SimPin {
    sim: Rc<RefCell<Sim>>,
    role: Role,
}

impl SimPin {
    fn active(&self) -> bool {
        let sim = self.sim.borrow();
        match self.role {
            Role::Home => sim.home_triggered(),
            Role::End => sim.end_triggered(),
            Role::Button => sim.button,
            Role::Step | Role::Dir => false,
        }
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut sim = self.sim.borrow_mut();
        match self.role {
            Role::Step => {
                if !sim.step_high {
                    sim.step_high = true;
                    sim.edges += 1;
                    sim.pos += if sim.dir_high { -1 } else { 1 };
                }
            }
            Role::Dir => {
                sim.dir_high = true;
                sim.dir_writes += 1;
            }
            _ => {}
        }
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        let mut sim = self.sim.borrow_mut();
        match self.role {
            Role::Step => sim.step_high = false,
            Role::Dir => {
                sim.dir_high = false;
                sim.dir_writes += 1;
            }
            _ => {}
        }
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.active())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.active())
    }
}

/// Clock that jumps straight to each deadline.
#[derive(Clone, Default)]
pub struct SimClock {
    now: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn advance(&self, us: u64) {
        self.now.set(self.now.get() + us);
    }
}

impl Clock for SimClock {
    fn now_us(&mut self) -> u64 {
        self.now.get()
    }

    fn wait_until_us(&mut self, deadline_us: u64) {
        if deadline_us > self.now.get() {
            self.now.set(deadline_us);
        }
    }
}

/// Status sink that keeps everything it is shown.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    pub shown: Rc<RefCell<Vec<AxisStatus>>>,
}

impl StatusSink for RecordingDisplay {
    fn show(&mut self, status: &AxisStatus) {
        self.shown.borrow_mut().push(status.clone());
    }
}

pub type SimAxis<D = stepper_axis::NoDisplay> = StepperAxis<SimPin, SimPin, SimPin, SimClock, D>;

pub const SPR: u32 = 200;

/// A simulated machine plus handles to build axes on it.
pub struct Rig {
    pub sim: Rc<RefCell<Sim>>,
    pub clock: SimClock,
}

impl Rig {
    /// Machine with the carriage at `start` and sensors at the given positions.
    pub fn new(start: i64, home_at: Option<i64>, end_at: Option<i64>) -> Self {
        let sim = Sim {
            pos: start,
            home_at,
            end_at,
            ..Sim::default()
        };
        Self {
            sim: Rc::new(RefCell::new(sim)),
            clock: SimClock::default(),
        }
    }

    /// Machine without sensors.
    pub fn bare() -> Self {
        Self::new(0, None, None)
    }

    pub fn pin(&self, role: Role) -> SimPin {
        SimPin {
            sim: Rc::clone(&self.sim),
            role,
        }
    }

    /// Builder with every line of the rig wired up.
    pub fn builder(&self, has_limits: bool) -> StepperAxisBuilder<SimPin, SimPin, SimPin, SimClock> {
        StepperAxis::builder()
            .id("1")
            .has_limits(has_limits)
            .steps_per_revolution(SPR)
            .step_pin(self.pin(Role::Step))
            .dir_pin(self.pin(Role::Dir))
            .button_pin(self.pin(Role::Button))
            .limit_pins(self.pin(Role::End), self.pin(Role::Home))
            .clock(self.clock.clone())
    }

    pub fn axis(&self) -> SimAxis {
        self.builder(true).build().unwrap()
    }

    pub fn axis_without_limits(&self) -> SimAxis {
        self.builder(false).build().unwrap()
    }

    pub fn pos(&self) -> i64 {
        self.sim.borrow().pos
    }

    pub fn edges(&self) -> u64 {
        self.sim.borrow().edges
    }

    pub fn dir_writes(&self) -> u32 {
        self.sim.borrow().dir_writes
    }

    pub fn set_button(&self, pressed: bool) {
        self.sim.borrow_mut().button = pressed;
    }
}
