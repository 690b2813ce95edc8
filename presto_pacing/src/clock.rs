// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host clock for frame deadlines.
//!
//! On Unix the clock is `CLOCK_MONOTONIC` read through `rustix`; elsewhere it
//! counts from a process-wide [`Instant`](std::time::Instant) anchor. Either
//! way host ticks are nanoseconds.

use presto_core::time::{HostTime, Timebase};

#[cfg(unix)]
const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Returns the clock's [`Timebase`]: host ticks are nanoseconds.
#[must_use]
pub const fn timebase() -> Timebase {
    Timebase::NANOS
}

/// Returns the current monotonic host time.
#[cfg(unix)]
#[must_use]
pub fn now() -> HostTime {
    use rustix::time::{ClockId, clock_gettime};

    timespec_to_host_time(clock_gettime(ClockId::Monotonic))
}

/// Returns the current monotonic host time.
#[cfg(not(unix))]
#[must_use]
pub fn now() -> HostTime {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    let elapsed = ANCHOR.get_or_init(Instant::now).elapsed();
    HostTime(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
}

/// Time left until `deadline`, or `None` if it has passed.
#[must_use]
pub fn until(deadline: HostTime) -> Option<std::time::Duration> {
    let remaining = deadline.saturating_duration_since(now());
    if remaining.ticks() == 0 {
        None
    } else {
        Some(remaining.to_core(timebase()))
    }
}

#[cfg(unix)]
fn timespec_to_host_time(timespec: rustix::time::Timespec) -> HostTime {
    let seconds = u64::try_from(timespec.tv_sec).unwrap_or(0);
    let nanos = u64::try_from(timespec.tv_nsec)
        .unwrap_or(0)
        .min(999_999_999);

    let ticks = u128::from(seconds)
        .saturating_mul(NANOS_PER_SECOND)
        .saturating_add(u128::from(nanos));
    HostTime(u64::try_from(ticks).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use presto_core::time::Duration;

    #[test]
    fn now_is_monotonic_non_decreasing() {
        let first = now();
        let second = now();
        assert!(second >= first, "monotonic clock should not go backwards");
    }

    #[test]
    fn past_deadlines_have_no_remaining_time() {
        let past = HostTime(now().ticks().saturating_sub(1_000));
        assert_eq!(until(past), None);
    }

    #[test]
    fn future_deadlines_report_remaining_time() {
        let deadline = now().saturating_add(Duration(50_000_000));
        let remaining = until(deadline).expect("deadline is in the future");
        assert!(
            remaining <= std::time::Duration::from_millis(50),
            "remaining time never exceeds the offset"
        );
    }

    #[cfg(unix)]
    #[test]
    fn timespec_conversion_saturates_on_large_values() {
        let input = rustix::time::Timespec {
            tv_sec: i64::MAX,
            tv_nsec: 999_999_999,
        };
        assert_eq!(timespec_to_host_time(input), HostTime(u64::MAX));
    }
}
