//! JSON report output
//!
//! Serializes the merged run statistics to a file for downstream tooling.
//! Durations carry both raw microseconds and a human-readable rendering.

use crate::config::RunConfig;
use crate::stats::StatsSnapshot;
use crate::util::time::format_duration;
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Duration with both microseconds and human-readable format
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuration {
    pub micros: u64,
    pub human: String,
}

impl JsonDuration {
    fn from_duration(d: Duration) -> Self {
        Self {
            micros: d.as_micros() as u64,
            human: format_duration(d),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonLatency {
    min: JsonDuration,
    mean: JsonDuration,
    max: JsonDuration,
    total: JsonDuration,
    percentiles: Vec<JsonPercentile>,
}

#[derive(Debug, Serialize)]
struct JsonPercentile {
    percentile: f64,
    latency: JsonDuration,
}

#[derive(Debug, Serialize)]
struct JsonReport {
    operation: String,
    users: usize,
    iterations: u32,
    elapsed: JsonDuration,
    completed: u64,
    failed: u64,
    attempted: u64,
    records_fetched: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency: Option<JsonLatency>,
    /// Whole-second bucket -> sample count.
    seconds_histogram: BTreeMap<u64, u64>,
}

/// Write the run report as pretty-printed JSON.
pub fn write_report(
    path: &Path,
    snapshot: &StatsSnapshot,
    elapsed: Duration,
    config: &RunConfig,
) -> Result<()> {
    let latency = match (snapshot.min, snapshot.mean, snapshot.max) {
        (Some(min), Some(mean), Some(max)) => Some(JsonLatency {
            min: JsonDuration::from_duration(min),
            mean: JsonDuration::from_duration(mean),
            max: JsonDuration::from_duration(max),
            total: JsonDuration::from_duration(snapshot.total),
            percentiles: snapshot
                .percentiles
                .iter()
                .map(|&(percentile, d)| JsonPercentile {
                    percentile,
                    latency: JsonDuration::from_duration(d),
                })
                .collect(),
        }),
        _ => None,
    };

    let report = JsonReport {
        operation: config.operation.to_string(),
        users: config.workers,
        iterations: config.iterations,
        elapsed: JsonDuration::from_duration(elapsed),
        completed: snapshot.count,
        failed: snapshot.errors,
        attempted: snapshot.attempted,
        records_fetched: snapshot.records_fetched,
        latency,
        seconds_histogram: snapshot.seconds.clone(),
    };

    let file = File::create(path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;
    serde_json::to_writer_pretty(file, &report).context("failed to serialize report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OperationKind;
    use crate::stats::WorkerStats;

    #[test]
    fn test_write_report_round_trips() {
        let mut stats = WorkerStats::new();
        stats.record(Duration::from_millis(1500));
        stats.record(Duration::from_millis(2500));
        stats.record_error();
        stats.record_fetched(3000);
        let snap = stats.snapshot();

        let mut config = RunConfig::for_test(OperationKind::Full);
        config.workers = 2;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report(&path, &snap, Duration::from_secs(10), &config).unwrap();

        let value: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["operation"], "full refresh");
        assert_eq!(value["users"], 2);
        assert_eq!(value["completed"], 2);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["attempted"], 3);
        assert_eq!(value["records_fetched"], 3000);
        assert_eq!(value["latency"]["min"]["micros"], 1_500_000);
        assert_eq!(value["seconds_histogram"]["2"], 1);
        assert_eq!(value["seconds_histogram"]["3"], 1);
    }

    #[test]
    fn test_write_report_empty_run_omits_latency() {
        let snap = WorkerStats::new().snapshot();
        let config = RunConfig::for_test(OperationKind::Full);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report(&path, &snap, Duration::ZERO, &config).unwrap();

        let value: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert!(value.get("latency").is_none());
        assert_eq!(value["completed"], 0);
    }
}
