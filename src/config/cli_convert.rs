//! Conversion helpers from CLI strings to typed configuration

use super::cli::OperationArg;
use super::{DelayWindow, OperationKind};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::Duration;

/// Parse a `min:max` second window, e.g. `"0:30"`.
pub fn parse_window(s: &str) -> Result<DelayWindow> {
    let (min, max) = s
        .split_once(':')
        .with_context(|| format!("expected min:max seconds, got '{s}'"))?;
    let min_secs = min
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid window minimum '{min}'"))?;
    let max_secs = max
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid window maximum '{max}'"))?;
    Ok(DelayWindow { min_secs, max_secs })
}

/// Parse a `min:max` millisecond window into a duration pair.
pub fn parse_latency_window(s: &str) -> Result<(Duration, Duration)> {
    let (min, max) = s
        .split_once(':')
        .with_context(|| format!("expected min:max milliseconds, got '{s}'"))?;
    let min_ms = min
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid latency minimum '{min}'"))?;
    let max_ms = max
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid latency maximum '{max}'"))?;
    Ok((Duration::from_millis(min_ms), Duration::from_millis(max_ms)))
}

/// Parse a comma-separated job ID list, e.g. `"17,42"`.
pub fn parse_jobs(s: &str) -> Result<Vec<i64>> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .with_context(|| format!("invalid job ID '{part}'"))
        })
        .collect()
}

/// Parse a cursor timestamp. Accepts RFC 3339 or the space-separated
/// `YYYY-MM-DD HH:MM:SS` form (interpreted as UTC).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("invalid timestamp '{s}' (expected RFC 3339 or 'YYYY-MM-DD HH:MM:SS')"))?;
    Ok(naive.and_utc())
}

pub fn convert_operation(arg: OperationArg) -> OperationKind {
    match arg {
        OperationArg::Full => OperationKind::Full,
        OperationArg::Partial => OperationKind::Partial,
        OperationArg::Windowed => OperationKind::Windowed,
        OperationArg::Mutate => OperationKind::Mutate,
        OperationArg::MutateRefresh => OperationKind::MutateRefresh,
        OperationArg::Insert => OperationKind::Insert,
    }
}
