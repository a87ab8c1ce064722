//! Position tracking for a stepper axis.
//!
//! Provides absolute position tracking in steps with revolution conversions.

use crate::config::units::{Revolutions, Steps};

/// Axis position tracker.
///
/// Maintains absolute position in steps and provides unit conversions.
/// Only the step executor moves it; homing resets the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct Position {
    /// Current position in steps (from origin)
    steps: Steps,
    /// Steps per revolution for conversions
    steps_per_rev: u32,
}

impl Position {
    /// Create a new position tracker at the origin.
    #[inline]
    pub fn new(steps_per_rev: u32) -> Self {
        Self {
            steps: Steps::default(),
            steps_per_rev,
        }
    }

    /// Create a position tracker at a specific position.
    #[inline]
    pub fn at(steps: Steps, steps_per_rev: u32) -> Self {
        Self {
            steps,
            steps_per_rev,
        }
    }

    /// Get current position in steps.
    #[inline]
    pub fn steps(&self) -> Steps {
        self.steps
    }

    /// Get current position in revolutions.
    #[inline]
    pub fn revolutions(&self) -> Revolutions {
        self.steps.to_revolutions(self.steps_per_rev)
    }

    /// Account for one emitted step in the direction given by `sign`.
    #[inline]
    pub(crate) fn advance(&mut self, sign: i64) {
        self.steps = Steps(self.steps.0.saturating_add(sign));
    }

    /// Set current position as the new origin.
    #[inline]
    pub(crate) fn set_origin(&mut self) {
        self.steps = Steps::default();
    }

    /// Signed step distance from here to `target`.
    #[inline]
    pub fn steps_to(&self, target: Steps) -> i64 {
        target.0.saturating_sub(self.steps.0)
    }
}
