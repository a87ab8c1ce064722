//! Error types for stepper-axis.
//!
//! Provides unified error handling across configuration, axis I/O, and motion planning.
//! Limit-sensor trips are not errors: they are reported through
//! [`MoveReport::abort`](crate::telemetry::MoveReport::abort).

use core::fmt;

use crate::motion::PhaseKind;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-axis operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Axis hardware or capability error
    Axis(AxisError),
    /// Motion request rejected before any step was emitted
    Motion(MotionError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Steps per revolution must be > 0
    InvalidStepsPerRevolution(u32),
    /// Soft-stop cap must be finite and >= 0
    InvalidLimitStopRevs(f32),
    /// A required builder field was not supplied
    MissingField(&'static str),
    /// Axis name not found in configuration
    AxisNotFound(heapless::String<32>),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Axis capability errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisError {
    /// Pin operation failed
    PinError,
    /// Operation needs limit sensors but the axis was built without them
    LimitsNotConfigured,
    /// Operation needs a recorded end position (run `find_end` or `calibrate` first)
    NotCalibrated,
}

/// Motion request errors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Speed must be finite and > 0
    InvalidSpeed(f32),
    /// Move duration must be finite and > 0
    InvalidDuration(f32),
    /// A ramp phase rounds to zero steps while a cruise speed was requested
    DegeneratePhase {
        /// The zero-length ramp
        phase: PhaseKind,
        /// Requested cruise speed in rev/s
        cruise_rps: f32,
    },
    /// A non-empty phase has no usable rate (steps/s² for ramps, steps/s for cruise)
    InvalidRate {
        /// The offending phase
        phase: PhaseKind,
        /// The rate it was given
        value: f32,
    },
    /// Requested distance does not fit the step counter
    Overflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Axis(e) => write!(f, "Axis error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidStepsPerRevolution(v) => {
                write!(f, "Invalid steps per revolution: {}. Must be > 0", v)
            }
            ConfigError::InvalidLimitStopRevs(v) => {
                write!(f, "Invalid limit stop distance: {} rev. Must be finite and >= 0", v)
            }
            ConfigError::MissingField(field) => write!(f, "{} is required", field),
            ConfigError::AxisNotFound(name) => write!(f, "Axis '{}' not found", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for AxisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisError::PinError => write!(f, "GPIO pin operation failed"),
            AxisError::LimitsNotConfigured => write!(f, "Axis has no limit sensors configured"),
            AxisError::NotCalibrated => write!(f, "Axis end position has not been calibrated"),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::InvalidSpeed(v) => write!(f, "Invalid speed {} rev/s. Must be > 0", v),
            MotionError::InvalidDuration(v) => write!(f, "Invalid move duration {} s. Must be > 0", v),
            MotionError::DegeneratePhase { phase, cruise_rps } => write!(
                f,
                "{} phase has zero length but cruise speed is {} rev/s",
                phase, cruise_rps
            ),
            MotionError::InvalidRate { phase, value } => {
                write!(f, "{} phase has unusable rate {}. Must be finite and > 0", phase, value)
            }
            MotionError::Overflow => write!(f, "Move distance overflows the step counter"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<AxisError> for Error {
    fn from(e: AxisError) -> Self {
        Error::Axis(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for AxisError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}
