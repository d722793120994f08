//! Run statistics
//!
//! Each worker accumulates into its own [`WorkerStats`] without any locking;
//! the scheduler merges all of them after join (see
//! [`aggregator::StatsAggregator`]) and finalizes a [`StatsSnapshot`] for
//! reporting. This keeps the hot path contention-free while guaranteeing no
//! sample is lost: every sample lives in exactly one worker's accumulator
//! until the single-threaded merge.

pub mod aggregator;
pub mod histogram;

use histogram::{LatencyHistogram, SecondsHistogram};
use std::collections::BTreeMap;
use std::time::Duration;

/// Percentiles included in every snapshot.
const REPORT_PERCENTILES: [f64; 5] = [50.0, 90.0, 95.0, 99.0, 99.9];

/// Per-worker statistics accumulator.
///
/// Owned by exactly one worker while the run is in flight; merged into the
/// aggregate after the worker has joined.
#[derive(Debug, Clone)]
pub struct WorkerStats {
    count: u64,
    total: Duration,
    min: Option<Duration>,
    max: Option<Duration>,
    seconds: SecondsHistogram,
    latency: LatencyHistogram,
    errors: u64,
    records: u64,
}

impl WorkerStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            total: Duration::ZERO,
            min: None,
            max: None,
            seconds: SecondsHistogram::new(),
            latency: LatencyHistogram::new(),
            errors: 0,
            records: 0,
        }
    }

    /// Record one successful operation's elapsed time.
    pub fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
        self.min = Some(self.min.map_or(elapsed, |m| m.min(elapsed)));
        self.max = Some(self.max.map_or(elapsed, |m| m.max(elapsed)));
        self.seconds.record(elapsed);
        self.latency.record(elapsed);
    }

    /// Count a failed operation. Failures are never folded into the latency
    /// figures.
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Count records returned by fetch operations.
    pub fn record_fetched(&mut self, records: u64) {
        self.records += records;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Successful plus failed operations.
    pub fn attempted(&self) -> u64 {
        self.count + self.errors
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn records_fetched(&self) -> u64 {
        self.records
    }

    /// Merge another worker's accumulator into this one.
    pub fn merge(&mut self, other: &WorkerStats) {
        self.count += other.count;
        self.total += other.total;
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.seconds.merge(&other.seconds);
        self.latency.merge(&other.latency);
        self.errors += other.errors;
        self.records += other.records;
    }

    /// Finalize into a report-ready snapshot.
    pub fn snapshot(&self) -> StatsSnapshot {
        let mean = if self.count > 0 {
            Some(self.total / self.count as u32)
        } else {
            None
        };
        let percentiles = if self.count > 0 {
            REPORT_PERCENTILES
                .iter()
                .map(|&p| (p, self.latency.percentile(p)))
                .collect()
        } else {
            Vec::new()
        };

        StatsSnapshot {
            count: self.count,
            errors: self.errors,
            attempted: self.attempted(),
            records_fetched: self.records,
            total: self.total,
            min: self.min,
            max: self.max,
            mean,
            seconds: self.seconds.buckets().clone(),
            percentiles,
        }
    }
}

impl Default for WorkerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Finalized run statistics.
///
/// `min`, `max` and `mean` are `None` when the run produced no successful
/// sample; reporting must state that explicitly rather than print zeros.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    /// Successful operations.
    pub count: u64,
    /// Failed operations (counted, never averaged in).
    pub errors: u64,
    /// Successful plus failed operations.
    pub attempted: u64,
    /// Records returned across all fetch operations.
    pub records_fetched: u64,
    /// Sum of all successful operation latencies.
    pub total: Duration,
    pub min: Option<Duration>,
    pub max: Option<Duration>,
    pub mean: Option<Duration>,
    /// Latency histogram: whole-second bucket -> sample count, ascending.
    pub seconds: BTreeMap<u64, u64>,
    /// `(percentile, latency)` pairs, empty when there are no samples.
    pub percentiles: Vec<(f64, Duration)>,
}
