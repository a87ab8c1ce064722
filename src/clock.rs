//! Monotonic time source for step timing.
//!
//! All pulse timing goes through [`Clock`]: the executor reads `now_us` at the
//! start of each step and busy-waits with `wait_until_us` for each half-period.
//! Hardware targets wrap a free-running timer; tests substitute a simulated
//! clock that jumps straight to the deadline.

/// Monotonic microsecond clock.
pub trait Clock {
    /// Microseconds since an arbitrary, fixed epoch. Must never go backwards.
    fn now_us(&mut self) -> u64;

    /// Block until `now_us() >= deadline_us`.
    ///
    /// The default spins on `now_us`, which is the scheduling model of the
    /// engine: no yielding, the control thread is fully occupied.
    fn wait_until_us(&mut self, deadline_us: u64) {
        while self.now_us() < deadline_us {
            core::hint::spin_loop();
        }
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    #[inline]
    fn now_us(&mut self) -> u64 {
        (**self).now_us()
    }

    #[inline]
    fn wait_until_us(&mut self, deadline_us: u64) {
        (**self).wait_until_us(deadline_us)
    }
}

/// Wall-clock time source backed by `std::time::Instant`.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    epoch: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock whose epoch is now.
    pub fn new() -> Self {
        Self {
            epoch: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_us(&mut self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clock that advances a fixed amount on every read.
    struct TickingClock {
        now: u64,
        tick: u64,
        reads: u32,
    }

    impl Clock for TickingClock {
        fn now_us(&mut self) -> u64 {
            self.reads += 1;
            self.now += self.tick;
            self.now
        }
    }

    #[test]
    fn test_default_wait_spins_until_deadline() {
        let mut clock = TickingClock {
            now: 0,
            tick: 10,
            reads: 0,
        };

        clock.wait_until_us(95);
        assert!(clock.now >= 95);
        assert_eq!(clock.reads, 10);
    }

    #[test]
    fn test_wait_in_past_returns_immediately() {
        let mut clock = TickingClock {
            now: 1_000,
            tick: 1,
            reads: 0,
        };

        clock.wait_until_us(500);
        assert_eq!(clock.reads, 1);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_std_clock_is_monotonic() {
        let mut clock = StdClock::new();
        let a = clock.now_us();
        clock.wait_until_us(a + 200);
        assert!(clock.now_us() >= a + 200);
    }
}
