//! Time helpers
//!
//! Hour-aligned window arithmetic for the windowed refresh protocol, and
//! human-readable duration formatting for reports.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use std::time::Duration;

/// Truncate `t` to the start of its hour (minutes, seconds and sub-second
/// components zeroed).
pub fn hour_floor(t: DateTime<Utc>) -> DateTime<Utc> {
    // TimeDelta::hours(1) is always a valid rounding granule
    t.duration_trunc(TimeDelta::hours(1))
        .expect("hour truncation cannot fail for in-range timestamps")
}

/// Format a duration in human-readable form
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use loadpulse::util::time::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(12)), "12.00ms");
/// assert_eq!(format_duration(Duration::from_secs(5)), "5.00s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2}us", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2}ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", nanos as f64 / 1_000_000_000.0)
    }
}
