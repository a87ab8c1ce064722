//! Motion module for stepper-axis.
//!
//! Provides profile synthesis, the step clock and limit-aware aborts.

mod abort;
mod executor;
mod profile;

pub(crate) use executor::StepClock;

pub use abort::{guarding_sensor, StopPlan};
pub use executor::{half_period_us, ramp_speed, MIN_SPEED};
pub use profile::{Direction, MovePlan, Phase, PhaseKind, ProfileShape};
