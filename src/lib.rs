//! # stepper-axis
//!
//! Step/direction motion engine for a single stepper axis with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Kinematic profiles**: trapezoidal ramps from phase distances, or from a
//!   distance and total time with automatic triangular fallback
//! - **Direct pulse generation**: symmetric STEP pulses timed against a
//!   microsecond [`Clock`]
//! - **Limit-aware aborts**: a tripped sensor in the direction of travel ends
//!   the move with a bounded stopping ramp
//! - **Homing and calibration**: repeatable origin and axis length
//! - **Move reports**: expected vs. actual phase durations for every move
//! - **no_std compatible**: core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_axis::{StepperAxis, UnitExt};
//!
//! let config = stepper_axis::load_config("axes.toml")?;
//!
//! let mut axis = StepperAxis::builder()
//!     .from_config(&config, "stage")?
//!     .step_pin(step)
//!     .dir_pin(dir)
//!     .limit_pins(end_sensor, home_sensor)
//!     .clock(clock)
//!     .build()?;
//!
//! let length = axis.calibrate(0.5.rps())?;
//! let report = axis.timed_move(10.0.revs(), 5.0.rps(), 2.5.secs())?;
//! axis.move_to_home(2.0.rps())?;
//! ```
//!
//! An axis without sensors or a button still needs a concrete input type;
//! use [`NoSensor`](axis::NoSensor):
//!
//! ```rust,ignore
//! let mut spindle = StepperAxisBuilder::<_, _, NoSensor, _>::new()
//!     .steps_per_revolution(200)
//!     .step_pin(step)
//!     .dir_pin(dir)
//!     .clock(clock)
//!     .build()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and [`StdClock`](clock::StdClock)
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Must come first so the logging macros are visible everywhere
#[macro_use]
mod fmt;

// Core modules
pub mod axis;
pub mod clock;
pub mod config;
pub mod error;
pub mod motion;
pub mod telemetry;

// Re-exports for ergonomic API
pub use axis::{HomingState, NoSensor, StepperAxis, StepperAxisBuilder};
pub use clock::Clock;
pub use config::{validate_config, AxisConfig, SystemConfig};
pub use error::{Error, Result};
pub use motion::{Direction, MovePlan, PhaseKind, ProfileShape};
pub use telemetry::{AxisStatus, LimitState, MoveReport, NoDisplay, StatusSink};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use clock::StdClock;
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Revolutions, RevsPerSec, Seconds, Steps, UnitExt};
