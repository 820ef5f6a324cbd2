use std::time::Duration;

pub use nix::sys::time::TimeSpec;
pub use nix::time::ClockId;

use crate::error::Result;

const NSEC_PER_SEC: i128 = 1_000_000_000;

/// Read `clock` with `clock_gettime`.
pub fn clock_read(clock: ClockId) -> Result<TimeSpec> {
    nix::time::clock_gettime(clock)
}

/// Interval from `start` to `end`, or `None` if `end` is earlier.
pub fn time_diff(start: &TimeSpec, end: &TimeSpec) -> Option<Duration> {
    let nsecs = total_nanos(end) - total_nanos(start);
    u64::try_from(nsecs).ok().map(Duration::from_nanos)
}

pub fn timespec_nanos(ts: &TimeSpec) -> u64 {
    total_nanos(ts).clamp(0, u64::MAX as i128) as u64
}

pub fn timespec_secs(ts: &TimeSpec) -> f64 {
    ts.tv_sec() as f64 + ts.tv_nsec() as f64 / NSEC_PER_SEC as f64
}

fn total_nanos(ts: &TimeSpec) -> i128 {
    ts.tv_sec() as i128 * NSEC_PER_SEC + ts.tv_nsec() as i128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_does_not_go_back() {
        let t1 = clock_read(ClockId::CLOCK_MONOTONIC).unwrap();
        let t2 = clock_read(ClockId::CLOCK_MONOTONIC).unwrap();
        assert!(time_diff(&t1, &t2).is_some());
    }

    #[test]
    fn test_realtime_clock_is_after_epoch() {
        let now = clock_read(ClockId::CLOCK_REALTIME).unwrap();
        assert!(now.tv_sec() > 0);
    }

    #[test]
    fn test_invalid_clock() {
        let res = clock_read(ClockId::from_raw(-1));
        assert_eq!(res.err(), Some(nix::errno::Errno::EINVAL));
    }

    #[test]
    fn test_time_diff_borrows_across_seconds() {
        let t1 = TimeSpec::new(1, 900_000_000);
        let t2 = TimeSpec::new(3, 100_000_000);
        assert_eq!(time_diff(&t1, &t2), Some(Duration::from_millis(1200)));
        assert_eq!(time_diff(&t2, &t1), None);
        assert_eq!(time_diff(&t1, &t1), Some(Duration::ZERO));
    }

    #[test]
    fn test_conversions() {
        let ts = TimeSpec::new(2, 500_000_000);
        assert_eq!(timespec_nanos(&ts), 2_500_000_000);
        assert_eq!(timespec_secs(&ts), 2.5);
    }
}
