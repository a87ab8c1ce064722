//! Unit types for physical quantities.
//!
//! Provides type-safe representations of shaft travel, speed, time and motor
//! steps so a distance can't be passed where a speed is expected.

use serde::Deserialize;

/// Shaft travel in revolutions.
///
/// Used for configuration and the user-facing move API. Internally converted to [`Steps`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Revolutions(pub f32);

impl Revolutions {
    /// Create a new Revolutions value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Whole steps covered by this travel, truncated toward zero.
    #[inline]
    pub fn whole_steps(self, steps_per_rev: u32) -> u32 {
        (libm::fabsf(self.0) * steps_per_rev as f32) as u32
    }
}

/// Shaft speed in revolutions per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct RevsPerSec(pub f32);

impl RevsPerSec {
    /// Create a new RevsPerSec value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Convert to steps per second.
    #[inline]
    pub fn to_steps_per_sec(self, steps_per_rev: u32) -> f32 {
        self.0 * steps_per_rev as f32
    }

    /// Check that the speed is usable for motion (finite and > 0).
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

/// Duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Seconds(pub f32);

impl Seconds {
    /// Create a new Seconds value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Create from a microsecond count.
    #[inline]
    pub fn from_micros(us: u64) -> Self {
        Self(us as f32 / 1_000_000.0)
    }
}

/// Motor position in steps (absolute from origin).
///
/// Uses i64 for unlimited range in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Steps(pub i64);

impl Steps {
    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Convert to revolutions.
    #[inline]
    pub fn to_revolutions(self, steps_per_rev: u32) -> Revolutions {
        Revolutions(self.0 as f32 / steps_per_rev as f32)
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Revolutions.
    fn revs(self) -> Revolutions;
    /// Convert to RevsPerSec.
    fn rps(self) -> RevsPerSec;
    /// Convert to Seconds.
    fn secs(self) -> Seconds;
}

impl UnitExt for f32 {
    #[inline]
    fn revs(self) -> Revolutions {
        Revolutions(self)
    }

    #[inline]
    fn rps(self) -> RevsPerSec {
        RevsPerSec(self)
    }

    #[inline]
    fn secs(self) -> Seconds {
        Seconds(self)
    }
}
