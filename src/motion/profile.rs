//! Motion profile synthesis.
//!
//! Turns move requests into a [`MovePlan`]: three phase step-counts plus the
//! kinematic rates the executor needs. Two request shapes are supported:
//! explicit phase distances with a cruise speed, and total distance with a
//! speed cap and a total time (which falls back to a triangle when the cap is
//! unreachable).

use core::fmt;

use crate::config::units::{Revolutions, RevsPerSec, Seconds};
use crate::error::MotionError;

/// Direction of axis motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Away from home, toward the end sensor (positive step count).
    Forward,
    /// Toward the home sensor (negative step count).
    Reverse,
}

impl Direction {
    /// Get direction from signed step count.
    #[inline]
    pub fn from_steps(steps: i64) -> Self {
        if steps >= 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Direction of a signed distance; zero and negative map to `Reverse`.
    #[inline]
    pub fn from_revolutions(revs: Revolutions) -> Self {
        if revs.value() > 0.0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Forward => "Forward",
            Direction::Reverse => "Reverse",
        })
    }
}

/// One of the three segments of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseKind {
    /// Ramping up from rest toward cruise speed.
    Accelerate,
    /// Constant speed.
    Cruise,
    /// Ramping down from cruise speed to rest.
    Decelerate,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PhaseKind::Accelerate => "Accelerate",
            PhaseKind::Cruise => "Cruise",
            PhaseKind::Decelerate => "Decelerate",
        })
    }
}

/// Velocity-vs-time shape of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileShape {
    /// Ramp up, cruise, ramp down.
    Trapezoidal,
    /// Target speed unreachable: ramp up to a peak and straight back down.
    Triangular,
    /// No ramps at all.
    ConstantVelocity,
}

impl fmt::Display for ProfileShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProfileShape::Trapezoidal => "Trapezoidal",
            ProfileShape::Triangular => "Triangular",
            ProfileShape::ConstantVelocity => "Constant Velocity",
        })
    }
}

/// Parameters the executor needs for one phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    /// Which segment this is.
    pub kind: PhaseKind,
    /// Steps to emit.
    pub steps: u32,
    /// Ramp rate in steps/s² (unused while cruising).
    pub rate: f32,
    /// Deceleration the abort controller should assume if a limit trips
    /// during this phase. `None` means there is no ramp to honour.
    pub stop_rate: Option<f32>,
}

/// Computed plan for a move: phase lengths and kinematic rates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MovePlan {
    /// Shape of the velocity profile.
    pub shape: ProfileShape,

    /// Direction of motion.
    pub direction: Direction,

    /// Steps in acceleration phase.
    pub accel_steps: u32,

    /// Steps in cruise phase (constant velocity).
    pub cruise_steps: u32,

    /// Steps in deceleration phase.
    pub decel_steps: u32,

    /// Cruise (or triangle peak) speed in steps/sec.
    pub cruise_speed: f32,

    /// Acceleration rate in steps/sec².
    pub accel_rate: f32,

    /// Deceleration rate in steps/sec².
    pub decel_rate: f32,
}

impl MovePlan {
    /// Plan a move from explicit phase distances and a cruise speed.
    ///
    /// Direction follows the sign of `accel`. Each phase is truncated to whole
    /// steps; the ramp rates are the ones that reach `cruise` exactly at the end
    /// of the acceleration distance and stop exactly at the end of the
    /// deceleration distance (`a = v² / 2d`).
    ///
    /// # Errors
    ///
    /// - [`MotionError::InvalidSpeed`] if `cruise` is not a positive finite speed
    /// - [`MotionError::DegeneratePhase`] if either ramp rounds to zero steps
    /// - [`MotionError::Overflow`] if the total does not fit in `u32` steps
    pub fn phase_distance(
        accel: Revolutions,
        cruise_distance: Revolutions,
        decel: Revolutions,
        cruise: RevsPerSec,
        steps_per_rev: u32,
    ) -> Result<Self, MotionError> {
        if !cruise.is_valid() {
            return Err(MotionError::InvalidSpeed(cruise.value()));
        }

        Self::from_phase_steps(
            Direction::from_revolutions(accel),
            accel.whole_steps(steps_per_rev),
            cruise_distance.whole_steps(steps_per_rev),
            decel.whole_steps(steps_per_rev),
            cruise,
            steps_per_rev,
        )
    }

    /// Plan a ramped move from phase lengths already expressed in steps.
    pub(crate) fn from_phase_steps(
        direction: Direction,
        accel_steps: u32,
        cruise_steps: u32,
        decel_steps: u32,
        cruise: RevsPerSec,
        steps_per_rev: u32,
    ) -> Result<Self, MotionError> {
        if !cruise.is_valid() {
            return Err(MotionError::InvalidSpeed(cruise.value()));
        }
        if accel_steps == 0 {
            return Err(MotionError::DegeneratePhase {
                phase: PhaseKind::Accelerate,
                cruise_rps: cruise.value(),
            });
        }
        if decel_steps == 0 {
            return Err(MotionError::DegeneratePhase {
                phase: PhaseKind::Decelerate,
                cruise_rps: cruise.value(),
            });
        }
        accel_steps
            .checked_add(cruise_steps)
            .and_then(|s| s.checked_add(decel_steps))
            .ok_or(MotionError::Overflow)?;

        let cruise_speed = cruise.to_steps_per_sec(steps_per_rev);
        let v_squared = cruise_speed * cruise_speed;

        Ok(Self {
            shape: ProfileShape::Trapezoidal,
            direction,
            accel_steps,
            cruise_steps,
            decel_steps,
            cruise_speed,
            accel_rate: v_squared / (2.0 * accel_steps as f32),
            decel_rate: v_squared / (2.0 * decel_steps as f32),
        })
    }

    /// Plan a move from total distance, a speed cap and a total time.
    ///
    /// Solves `D = V·(T − t_a)` for the ramp time. When the cap cannot be
    /// honoured in the requested time (`t_a <= 0` or no room left to cruise)
    /// the plan falls back to a triangle with peak `2D/T`, split into two
    /// equal halves.
    ///
    /// # Errors
    ///
    /// - [`MotionError::InvalidSpeed`] if `max_speed` is not a positive finite speed
    /// - [`MotionError::InvalidDuration`] if `total_time` is not a positive finite time
    pub fn timed(
        revolutions: Revolutions,
        max_speed: RevsPerSec,
        total_time: Seconds,
        steps_per_rev: u32,
    ) -> Result<Self, MotionError> {
        if !max_speed.is_valid() {
            return Err(MotionError::InvalidSpeed(max_speed.value()));
        }
        let t_total = total_time.value();
        if !t_total.is_finite() || t_total <= 0.0 {
            return Err(MotionError::InvalidDuration(t_total));
        }

        let direction = Direction::from_revolutions(revolutions);
        let total_steps = revolutions.whole_steps(steps_per_rev);
        let distance = total_steps as f32;
        let speed = max_speed.to_steps_per_sec(steps_per_rev);

        let t_accel = t_total - distance / speed;
        let t_cruise = t_total - 2.0 * t_accel;

        if t_accel <= 0.0 || t_cruise < 0.0 {
            let peak = 2.0 * distance / t_total;
            let t_ramp = t_total / 2.0;
            let rate = peak / t_ramp;
            let half = total_steps / 2;

            return Ok(Self {
                shape: ProfileShape::Triangular,
                direction,
                accel_steps: half,
                cruise_steps: 0,
                decel_steps: total_steps - half,
                cruise_speed: peak,
                accel_rate: rate,
                decel_rate: rate,
            });
        }

        let rate = speed / t_accel;
        let accel_steps = ((0.5 * rate * t_accel * t_accel) as u32).min(total_steps);
        let cruise_steps = ((speed * t_cruise) as u32).min(total_steps - accel_steps);
        let decel_steps = total_steps - accel_steps - cruise_steps;

        Ok(Self {
            shape: ProfileShape::Trapezoidal,
            direction,
            accel_steps,
            cruise_steps,
            decel_steps,
            cruise_speed: speed,
            accel_rate: rate,
            decel_rate: rate,
        })
    }

    /// Plan a constant-velocity move with no ramps.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::InvalidSpeed`] if `speed` is not a positive finite speed.
    pub fn constant_velocity(
        revolutions: Revolutions,
        speed: RevsPerSec,
        steps_per_rev: u32,
    ) -> Result<Self, MotionError> {
        Self::constant_steps(
            Direction::from_revolutions(revolutions),
            revolutions.whole_steps(steps_per_rev),
            speed,
            steps_per_rev,
        )
    }

    pub(crate) fn constant_steps(
        direction: Direction,
        steps: u32,
        speed: RevsPerSec,
        steps_per_rev: u32,
    ) -> Result<Self, MotionError> {
        if !speed.is_valid() {
            return Err(MotionError::InvalidSpeed(speed.value()));
        }

        Ok(Self {
            shape: ProfileShape::ConstantVelocity,
            direction,
            accel_steps: 0,
            cruise_steps: steps,
            decel_steps: 0,
            cruise_speed: speed.to_steps_per_sec(steps_per_rev),
            accel_rate: 0.0,
            decel_rate: 0.0,
        })
    }

    /// Total steps across all phases.
    #[inline]
    pub fn total_steps(&self) -> u32 {
        self.accel_steps
            .saturating_add(self.cruise_steps)
            .saturating_add(self.decel_steps)
    }

    /// Check a plan before it is executed.
    ///
    /// Plans from the constructors always pass. A hand-built plan must give
    /// every non-empty phase a positive finite rate and fit its total in `u32`.
    ///
    /// # Errors
    ///
    /// - [`MotionError::Overflow`] if the phase counts do not sum in `u32`
    /// - [`MotionError::InvalidRate`] for the first non-empty phase without a usable rate
    pub fn validate(&self) -> Result<(), MotionError> {
        self.accel_steps
            .checked_add(self.cruise_steps)
            .and_then(|s| s.checked_add(self.decel_steps))
            .ok_or(MotionError::Overflow)?;

        let usable = |value: f32| value.is_finite() && value > 0.0;
        for phase in self.phases() {
            let value = match phase.kind {
                PhaseKind::Cruise => self.cruise_speed,
                _ => phase.rate,
            };
            if phase.steps > 0 && !usable(value) {
                return Err(MotionError::InvalidRate {
                    phase: phase.kind,
                    value,
                });
            }
        }
        Ok(())
    }

    /// The three phases in execution order.
    pub fn phases(&self) -> [Phase; 3] {
        let ramp = |rate: f32| if rate > 0.0 { Some(rate) } else { None };
        [
            Phase {
                kind: PhaseKind::Accelerate,
                steps: self.accel_steps,
                rate: self.accel_rate,
                stop_rate: ramp(self.accel_rate),
            },
            Phase {
                kind: PhaseKind::Cruise,
                steps: self.cruise_steps,
                rate: 0.0,
                stop_rate: ramp(self.decel_rate),
            },
            Phase {
                kind: PhaseKind::Decelerate,
                steps: self.decel_steps,
                rate: self.decel_rate,
                stop_rate: ramp(self.decel_rate),
            },
        ]
    }

    /// Expected duration of a phase in seconds.
    ///
    /// Ramps take `v / a`; the cruise takes `d / v`.
    pub fn expected_secs(&self, kind: PhaseKind) -> f32 {
        let (steps, rate) = match kind {
            PhaseKind::Accelerate => (self.accel_steps, self.accel_rate),
            PhaseKind::Decelerate => (self.decel_steps, self.decel_rate),
            PhaseKind::Cruise => {
                return if self.cruise_steps > 0 && self.cruise_speed > 0.0 {
                    self.cruise_steps as f32 / self.cruise_speed
                } else {
                    0.0
                };
            }
        };

        if steps > 0 && rate > 0.0 {
            self.cruise_speed / rate
        } else {
            0.0
        }
    }

    /// Estimate total duration of the plan in seconds.
    pub fn estimated_duration_secs(&self) -> f32 {
        self.expected_secs(PhaseKind::Accelerate)
            + self.expected_secs(PhaseKind::Cruise)
            + self.expected_secs(PhaseKind::Decelerate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPR: u32 = 200;

    #[test]
    fn test_phase_distance_rates() {
        let plan = MovePlan::phase_distance(
            Revolutions(1.0),
            Revolutions(3.0),
            Revolutions(2.0),
            RevsPerSec(2.0),
            SPR,
        )
        .unwrap();

        assert_eq!(plan.direction, Direction::Forward);
        assert_eq!(plan.accel_steps, 200);
        assert_eq!(plan.cruise_steps, 600);
        assert_eq!(plan.decel_steps, 400);
        assert_eq!(plan.cruise_speed, 400.0);
        // a = v² / 2d
        assert!((plan.accel_rate - 400.0).abs() < 1e-3);
        assert!((plan.decel_rate - 200.0).abs() < 1e-3);
        // Reaching v at a takes v / a
        assert!((plan.expected_secs(PhaseKind::Accelerate) - 1.0).abs() < 1e-4);
        assert!((plan.expected_secs(PhaseKind::Cruise) - 1.5).abs() < 1e-4);
        assert!((plan.expected_secs(PhaseKind::Decelerate) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_phase_distance_direction_from_accel_sign() {
        let plan = MovePlan::phase_distance(
            Revolutions(-0.5),
            Revolutions(-1.0),
            Revolutions(-0.5),
            RevsPerSec(1.0),
            SPR,
        )
        .unwrap();

        assert_eq!(plan.direction, Direction::Reverse);
        assert_eq!(plan.total_steps(), 400);
    }

    #[test]
    fn test_zero_ramp_is_degenerate() {
        let result = MovePlan::phase_distance(
            Revolutions(0.0),
            Revolutions(1.0),
            Revolutions(1.0),
            RevsPerSec(1.0),
            SPR,
        );
        assert_eq!(
            result,
            Err(MotionError::DegeneratePhase {
                phase: PhaseKind::Accelerate,
                cruise_rps: 1.0
            })
        );

        // Rounds to zero steps
        let result = MovePlan::phase_distance(
            Revolutions(1.0),
            Revolutions(1.0),
            Revolutions(0.004),
            RevsPerSec(1.0),
            SPR,
        );
        assert!(matches!(
            result,
            Err(MotionError::DegeneratePhase {
                phase: PhaseKind::Decelerate,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_cruise_speed() {
        for rps in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = MovePlan::phase_distance(
                Revolutions(1.0),
                Revolutions(1.0),
                Revolutions(1.0),
                RevsPerSec(rps),
                SPR,
            );
            assert!(matches!(result, Err(MotionError::InvalidSpeed(_))));
        }
    }

    #[test]
    fn test_timed_triangle_when_too_short() {
        // 10 rev at 5 rev/s needs 2 s at full speed; 1.5 s is not enough.
        let plan = MovePlan::timed(Revolutions(10.0), RevsPerSec(5.0), Seconds(1.5), SPR).unwrap();

        assert_eq!(plan.shape, ProfileShape::Triangular);
        assert_eq!(plan.cruise_steps, 0);
        assert_eq!(plan.total_steps(), 2000);
        assert_eq!(plan.accel_steps, 1000);
        assert_eq!(plan.decel_steps, 1000);
        // peak = 2D/T, rate = peak / (T/2)
        let peak = 2.0 * 2000.0 / 1.5;
        assert!((plan.cruise_speed - peak).abs() < 1e-2);
        assert!((plan.accel_rate - peak / 0.75).abs() < 1e-1);
        assert!((plan.estimated_duration_secs() - 1.5).abs() < 1e-3);
    }

    #[test]
    fn test_timed_triangle_odd_split() {
        let plan = MovePlan::timed(Revolutions(0.005), RevsPerSec(5.0), Seconds(1.0), SPR).unwrap();
        assert_eq!(plan.shape, ProfileShape::Triangular);
        assert_eq!(plan.accel_steps, 0);
        assert_eq!(plan.decel_steps, 1);
    }

    #[test]
    fn test_timed_triangle_when_too_slow() {
        // So much time that the ramps would overlap: t_cruise < 0.
        let plan = MovePlan::timed(Revolutions(10.0), RevsPerSec(5.0), Seconds(10.0), SPR).unwrap();
        assert_eq!(plan.shape, ProfileShape::Triangular);
        assert_eq!(plan.total_steps(), 2000);
    }

    #[test]
    fn test_timed_trapezoid() {
        // t_a = 2.5 - 2000/1000 = 0.5 s, t_c = 1.5 s
        let plan = MovePlan::timed(Revolutions(10.0), RevsPerSec(5.0), Seconds(2.5), SPR).unwrap();

        assert_eq!(plan.shape, ProfileShape::Trapezoidal);
        assert_eq!(plan.cruise_speed, 1000.0);
        assert!((plan.accel_rate - 2000.0).abs() < 1e-2);
        assert_eq!(plan.accel_steps, 250);
        assert_eq!(plan.cruise_steps, 1500);
        assert_eq!(plan.decel_steps, 250);
        assert_eq!(plan.total_steps(), 2000);
        assert!((plan.estimated_duration_secs() - 2.5).abs() < 1e-3);
    }

    #[test]
    fn test_timed_reverse() {
        let plan = MovePlan::timed(Revolutions(-3.0), RevsPerSec(2.0), Seconds(2.0), SPR).unwrap();
        assert_eq!(plan.direction, Direction::Reverse);
        assert_eq!(plan.total_steps(), 600);
    }

    #[test]
    fn test_timed_rejects_bad_inputs() {
        assert!(matches!(
            MovePlan::timed(Revolutions(1.0), RevsPerSec(0.0), Seconds(1.0), SPR),
            Err(MotionError::InvalidSpeed(_))
        ));
        assert!(matches!(
            MovePlan::timed(Revolutions(1.0), RevsPerSec(1.0), Seconds(0.0), SPR),
            Err(MotionError::InvalidDuration(_))
        ));
        assert!(matches!(
            MovePlan::timed(Revolutions(1.0), RevsPerSec(1.0), Seconds(f32::NAN), SPR),
            Err(MotionError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_constant_velocity_has_no_ramps() {
        let plan = MovePlan::constant_velocity(Revolutions(-2.0), RevsPerSec(3.0), SPR).unwrap();

        assert_eq!(plan.shape, ProfileShape::ConstantVelocity);
        assert_eq!(plan.direction, Direction::Reverse);
        assert_eq!(plan.cruise_steps, 400);
        assert_eq!(plan.accel_steps + plan.decel_steps, 0);
        let [_, cruise, _] = plan.phases();
        assert_eq!(cruise.stop_rate, None);
    }

    #[test]
    fn test_cruise_abort_uses_decel_rate() {
        let plan = MovePlan::phase_distance(
            Revolutions(1.0),
            Revolutions(1.0),
            Revolutions(2.0),
            RevsPerSec(2.0),
            SPR,
        )
        .unwrap();

        let [accel, cruise, decel] = plan.phases();
        assert_eq!(accel.stop_rate, Some(plan.accel_rate));
        assert_eq!(cruise.stop_rate, Some(plan.decel_rate));
        assert_eq!(decel.stop_rate, Some(plan.decel_rate));
    }

    #[test]
    fn test_constructed_plans_validate() {
        let plans = [
            MovePlan::phase_distance(Revolutions(1.0), Revolutions(1.0), Revolutions(2.0), RevsPerSec(2.0), SPR),
            MovePlan::timed(Revolutions(10.0), RevsPerSec(5.0), Seconds(1.5), SPR),
            MovePlan::timed(Revolutions(10.0), RevsPerSec(5.0), Seconds(10.0), SPR),
            MovePlan::timed(Revolutions(0.0), RevsPerSec(5.0), Seconds(1.0), SPR),
            MovePlan::constant_velocity(Revolutions(-2.0), RevsPerSec(3.0), SPR),
        ];
        for plan in plans {
            assert_eq!(plan.unwrap().validate(), Ok(()));
        }
    }

    #[test]
    fn test_validate_rejects_unusable_rates() {
        let good = MovePlan::phase_distance(
            Revolutions(1.0),
            Revolutions(1.0),
            Revolutions(1.0),
            RevsPerSec(2.0),
            SPR,
        )
        .unwrap();

        let mut plan = good.clone();
        plan.accel_rate = 0.0;
        assert_eq!(
            plan.validate(),
            Err(MotionError::InvalidRate {
                phase: PhaseKind::Accelerate,
                value: 0.0,
            })
        );

        let mut plan = good.clone();
        plan.cruise_speed = f32::INFINITY;
        assert!(matches!(
            plan.validate(),
            Err(MotionError::InvalidRate {
                phase: PhaseKind::Cruise,
                ..
            })
        ));

        let mut plan = good.clone();
        plan.decel_rate = f32::NAN;
        assert!(matches!(
            plan.validate(),
            Err(MotionError::InvalidRate {
                phase: PhaseKind::Decelerate,
                ..
            })
        ));

        // Empty phases don't need a rate
        let mut plan = good;
        plan.decel_steps = 0;
        plan.decel_rate = 0.0;
        assert_eq!(plan.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_overflowing_total() {
        let mut plan = MovePlan::constant_velocity(Revolutions(1.0), RevsPerSec(1.0), SPR).unwrap();
        plan.accel_steps = u32::MAX;
        plan.accel_rate = 100.0;

        assert_eq!(plan.total_steps(), u32::MAX);
        assert_eq!(plan.validate(), Err(MotionError::Overflow));
    }
}
