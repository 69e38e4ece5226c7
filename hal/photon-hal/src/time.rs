//! Elapsed-time abstractions
//!
//! The protocol stack measures mark/space durations in microseconds and
//! busy-waits for sub-tick delays. Millisecond-scale sleeps belong to the
//! task scheduler and are not part of this trait.

/// Free-running microsecond clock
///
/// `now_micros` must be monotonic modulo wraparound and callable from
/// interrupt context.
pub trait MonotonicClock {
    /// Microseconds since an arbitrary epoch
    fn now_micros(&self) -> u64;

    /// Milliseconds since the same epoch
    fn now_millis(&self) -> u64 {
        self.now_micros() / 1000
    }

    /// Busy-wait for the given number of microseconds
    ///
    /// Spins on `now_micros`; wrapping arithmetic keeps the wait correct
    /// across a counter wraparound.
    fn delay_us(&self, us: u32) {
        if us == 0 {
            return;
        }
        let start = self.now_micros();
        while self.now_micros().wrapping_sub(start) < us as u64 {
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Clock that advances a fixed step per query
    struct FakeClock {
        now: Cell<u64>,
        step: u64,
    }

    impl FakeClock {
        fn starting_at(now: u64, step: u64) -> Self {
            Self {
                now: Cell::new(now),
                step,
            }
        }
    }

    impl MonotonicClock for FakeClock {
        fn now_micros(&self) -> u64 {
            let t = self.now.get();
            self.now.set(t.wrapping_add(self.step));
            t
        }
    }

    #[test]
    fn test_millis_derived_from_micros() {
        let clock = FakeClock::starting_at(5_000, 0);
        assert_eq!(clock.now_millis(), 5);
    }

    #[test]
    fn test_delay_waits_full_duration() {
        let clock = FakeClock::starting_at(100, 10);
        clock.delay_us(50);
        // First query read the start; enough further queries must have
        // elapsed to cover the 50us window.
        assert!(clock.now.get() >= 150);
    }

    #[test]
    fn test_delay_zero_returns_immediately() {
        let clock = FakeClock::starting_at(0, 0);
        clock.delay_us(0);
        assert_eq!(clock.now.get(), 0);
    }

    #[test]
    fn test_delay_survives_counter_wraparound() {
        let clock = FakeClock::starting_at(u64::MAX - 15, 10);
        // Terminates even though the counter wraps mid-wait.
        clock.delay_us(40);
    }
}
