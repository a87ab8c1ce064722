//! Axis module for stepper-axis.
//!
//! Provides the axis driver, its builder, homing and position tracking.

mod builder;
mod driver;
mod homing;
mod pins;
mod position;
mod state;

pub use builder::StepperAxisBuilder;
pub use driver::StepperAxis;
pub use pins::{AxisPins, LimitSensor, NoSensor};
pub use position::Position;
pub use state::{AxisState, HomingState};
