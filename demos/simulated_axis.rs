//! Calibrate and exercise an axis on a simulated linear stage.
//!
//! Run with `cargo run --example simulated_axis`.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stepper_axis::{parse_config, AxisStatus, Clock, StatusSink, StepperAxis, UnitExt};

const CONFIG: &str = r#"
[axes.stage]
steps_per_revolution = 200
has_limits = true
limit_stop_revs = 1.0
"#;

/// Carriage travel in steps; sensors sit at both ends.
#[derive(Default)]
struct Stage {
    pos: i64,
    reverse: bool,
    step_high: bool,
}

const HOME_AT: i64 = 0;
const END_AT: i64 = 6_000;

#[derive(Clone, Copy)]
enum Line {
    Step,
    Dir,
    Home,
    End,
}

#[derive(Clone)]
struct StagePin {
    stage: Rc<RefCell<Stage>>,
    line: Line,
}

impl ErrorType for StagePin {
    type Error = Infallible;
}

impl OutputPin for StagePin {
    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut stage = self.stage.borrow_mut();
        match self.line {
            Line::Step if !stage.step_high => {
                stage.step_high = true;
                stage.pos += if stage.reverse { -1 } else { 1 };
            }
            Line::Dir => stage.reverse = true,
            _ => {}
        }
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        let mut stage = self.stage.borrow_mut();
        match self.line {
            Line::Step => stage.step_high = false,
            Line::Dir => stage.reverse = false,
            _ => {}
        }
        Ok(())
    }
}

impl InputPin for StagePin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        let pos = self.stage.borrow().pos;
        Ok(match self.line {
            Line::Home => pos <= HOME_AT,
            Line::End => pos >= END_AT,
            _ => false,
        })
    }
}

/// Simulated time: waiting jumps straight to the deadline.
#[derive(Clone, Default)]
struct FastClock(Rc<Cell<u64>>);

impl Clock for FastClock {
    fn now_us(&mut self) -> u64 {
        self.0.get()
    }

    fn wait_until_us(&mut self, deadline_us: u64) {
        self.0.set(self.0.get().max(deadline_us));
    }
}

struct Console;

impl StatusSink for Console {
    fn show(&mut self, status: &AxisStatus) {
        println!("[display] {}", status);
    }
}

fn main() -> stepper_axis::Result<()> {
    let config = parse_config(CONFIG)?;
    let stage = Rc::new(RefCell::new(Stage {
        pos: 2_500,
        ..Stage::default()
    }));
    let pin = |line| StagePin {
        stage: Rc::clone(&stage),
        line,
    };

    let mut axis = StepperAxis::builder()
        .from_config(&config, "stage")?
        .step_pin(pin(Line::Step))
        .dir_pin(pin(Line::Dir))
        .limit_pins(pin(Line::End), pin(Line::Home))
        .clock(FastClock::default())
        .display(Console)
        .build()?;

    let length = axis.calibrate(1.0_f32.rps())?;
    println!("Axis length: {} steps", length);

    if let Some(report) = axis.move_to_home(5.0_f32.rps())? {
        println!("{}\n", report);
    }

    let report = axis.timed_move(10.0_f32.revs(), 5.0_f32.rps(), 1.5_f32.secs())?;
    println!("{}\n", report);

    // Overshoots the end sensor and gets stopped within 1 rev.
    let report = axis.profile_move(2.0_f32.revs(), 20.0_f32.revs(), 2.0_f32.revs(), 4.0_f32.rps())?;
    println!("{}\n", report);

    if let Some(report) = axis.move_to_home(5.0_f32.rps())? {
        println!("{}", report);
    }

    Ok(())
}
