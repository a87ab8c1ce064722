//! Diagnostics produced by the engine.
//!
//! Nothing here feeds back into control: the move report and the status
//! summary are advisory outputs for logs and displays.

use core::fmt;

use crate::motion::{Direction, PhaseKind, ProfileShape};

/// Minimum spacing between two status sink updates (10 Hz).
pub const STATUS_MIN_INTERVAL_US: u64 = 100_000;

/// Expected vs. measured duration of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseTiming {
    /// Steps planned for the phase.
    pub planned_steps: u32,
    /// Steps actually emitted (less than planned if the move was aborted).
    pub emitted_steps: u32,
    /// Duration predicted by the kinematic plan, in seconds.
    pub expected_secs: f32,
    /// Duration measured on the clock, in seconds.
    pub actual_secs: f32,
}

/// What happened after a limit sensor tripped.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AbortReport {
    /// Phase that was executing when the trip was seen.
    pub phase: PhaseKind,
    /// Axis position when the trip was seen.
    pub trip_position: i64,
    /// Speed at the trip, in steps/s.
    pub trip_speed: f32,
    /// Steps emitted by the stop ramp after the trip.
    pub stop_steps: u32,
    /// Deceleration used by the stop ramp, in steps/s² (0 for an immediate stop).
    pub stop_rate: f32,
}

/// Per-move diagnostic record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveReport {
    /// Velocity profile shape that was executed.
    pub shape: ProfileShape,
    /// Direction of travel.
    pub direction: Direction,
    /// Acceleration phase timing.
    pub accel: PhaseTiming,
    /// Cruise phase timing.
    pub cruise: PhaseTiming,
    /// Deceleration phase timing.
    pub decel: PhaseTiming,
    /// Axis position after the move.
    pub final_position: i64,
    /// Set when a limit trip truncated the move.
    pub abort: Option<AbortReport>,
}

impl MoveReport {
    /// Timing of one phase.
    pub fn phase(&self, kind: PhaseKind) -> &PhaseTiming {
        match kind {
            PhaseKind::Accelerate => &self.accel,
            PhaseKind::Cruise => &self.cruise,
            PhaseKind::Decelerate => &self.decel,
        }
    }

    pub(crate) fn phase_mut(&mut self, kind: PhaseKind) -> &mut PhaseTiming {
        match kind {
            PhaseKind::Accelerate => &mut self.accel,
            PhaseKind::Cruise => &mut self.cruise,
            PhaseKind::Decelerate => &mut self.decel,
        }
    }

    /// Steps the plan asked for.
    pub fn planned_steps(&self) -> u32 {
        self.accel.planned_steps + self.cruise.planned_steps + self.decel.planned_steps
    }

    /// Steps emitted, including any stop ramp after a trip.
    pub fn steps_emitted(&self) -> u32 {
        let stop = self.abort.map(|a| a.stop_steps).unwrap_or(0);
        self.accel.emitted_steps + self.cruise.emitted_steps + self.decel.emitted_steps + stop
    }

    /// Whether a limit trip cut the move short.
    pub fn was_aborted(&self) -> bool {
        self.abort.is_some()
    }

    /// Sum of the expected phase durations.
    pub fn expected_total_secs(&self) -> f32 {
        self.accel.expected_secs + self.cruise.expected_secs + self.decel.expected_secs
    }

    /// Sum of the measured phase durations.
    pub fn actual_total_secs(&self) -> f32 {
        self.accel.actual_secs + self.cruise.actual_secs + self.decel.actual_secs
    }

    /// Measured minus expected total duration.
    pub fn timing_error_secs(&self) -> f32 {
        self.actual_total_secs() - self.expected_total_secs()
    }

    /// Timing error relative to the expected total, in percent.
    pub fn timing_error_percent(&self) -> f32 {
        let expected = self.expected_total_secs();
        if expected > 0.0 {
            self.timing_error_secs() / expected * 100.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for MoveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Move Complete: {} ---", self.shape)?;
        writeln!(f, "Steps: {}", self.steps_emitted())?;
        writeln!(f, "Position: {}", self.final_position)?;
        for (label, timing) in [
            ("Accel: ", &self.accel),
            ("Cruise:", &self.cruise),
            ("Decel: ", &self.decel),
        ] {
            writeln!(
                f,
                "{} Expected={:.3}s, Actual={:.3}s",
                label, timing.expected_secs, timing.actual_secs
            )?;
        }
        write!(
            f,
            "Total:  Expected={:.3}s, Actual={:.3}s, Error={:.3}s ({:.2}%)",
            self.expected_total_secs(),
            self.actual_total_secs(),
            self.timing_error_secs(),
            self.timing_error_percent()
        )?;
        if let Some(abort) = &self.abort {
            write!(
                f,
                "\nLimit hit during {} at {}: stopped in {} steps",
                abort.phase, abort.trip_position, abort.stop_steps
            )?;
        }
        Ok(())
    }
}

/// Limit sensor summary for displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitState {
    /// Axis is built without limit sensors.
    NoLimits,
    /// Neither sensor is triggered.
    Clear,
    /// Home sensor triggered.
    AtHome,
    /// End sensor triggered.
    AtEnd,
    /// Both sensors triggered (wiring fault or very short axis).
    Both,
}

impl LimitState {
    /// Build from the two sensor readings.
    pub fn from_sensors(at_home: bool, at_end: bool) -> Self {
        match (at_home, at_end) {
            (true, true) => LimitState::Both,
            (true, false) => LimitState::AtHome,
            (false, true) => LimitState::AtEnd,
            (false, false) => LimitState::Clear,
        }
    }
}

impl fmt::Display for LimitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LimitState::NoLimits => "Motor Only",
            LimitState::Clear => "Status: OK",
            LimitState::AtHome => "** HOME LIMIT **",
            LimitState::AtEnd => "** END LIMIT **",
            LimitState::Both => "!!BOTH LIMITS!!",
        };
        f.write_str(text)
    }
}

/// Snapshot handed to a [`StatusSink`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisStatus {
    /// Axis identifier.
    pub id: heapless::String<16>,
    /// Position in revolutions from the origin.
    pub position_revs: f32,
    /// Limit sensor summary.
    pub limits: LimitState,
}

impl fmt::Display for AxisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{} Pos:{:6.2} rev | {}", self.id, self.position_revs, self.limits)
    }
}

/// Consumer of status summaries, typically a character display.
pub trait StatusSink {
    /// Show the latest status. Called at most every [`STATUS_MIN_INTERVAL_US`].
    fn show(&mut self, status: &AxisStatus);
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    fn show(&mut self, status: &AxisStatus) {
        (**self).show(status)
    }
}

/// Placeholder sink for axes without a display.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisplay;

impl StatusSink for NoDisplay {
    fn show(&mut self, _status: &AxisStatus) {}
}

/// Rate limiter for status updates.
#[derive(Debug, Clone, Copy)]
pub struct StatusThrottle {
    last_us: Option<u64>,
    min_interval_us: u64,
}

impl Default for StatusThrottle {
    fn default() -> Self {
        Self::new(STATUS_MIN_INTERVAL_US)
    }
}

impl StatusThrottle {
    /// Create a throttle with the given minimum spacing.
    pub const fn new(min_interval_us: u64) -> Self {
        Self {
            last_us: None,
            min_interval_us,
        }
    }

    /// Returns `true` (and arms the throttle) if an update is allowed at `now_us`.
    pub fn ready(&mut self, now_us: u64) -> bool {
        match self.last_us {
            Some(last) if now_us.saturating_sub(last) < self.min_interval_us => false,
            _ => {
                self.last_us = Some(now_us);
                true
            }
        }
    }
}
