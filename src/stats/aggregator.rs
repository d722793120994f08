//! Statistics aggregation
//!
//! Merges per-worker statistics into a single aggregate view after the
//! scheduler has joined all workers, while preserving the per-worker detail
//! for analysis.

use crate::stats::{StatsSnapshot, WorkerStats};
use std::collections::HashMap;

/// Statistics aggregator for multiple workers
///
/// # Usage
///
/// 1. Create with `new()`
/// 2. Add each joined worker's statistics with `add_worker()`
/// 3. Read the merged view with `aggregate()` or finalize with `snapshot()`
#[derive(Debug)]
pub struct StatsAggregator {
    /// Per-worker statistics (worker_id -> stats)
    workers: HashMap<usize, WorkerStats>,

    /// Cached aggregate statistics (computed on demand)
    aggregate_cache: Option<WorkerStats>,

    /// Whether aggregate cache is valid
    cache_valid: bool,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            workers: HashMap::new(),
            aggregate_cache: None,
            cache_valid: false,
        }
    }

    /// Add statistics from a joined worker.
    pub fn add_worker(&mut self, worker_id: usize, stats: WorkerStats) {
        self.workers.insert(worker_id, stats);
        self.cache_valid = false;
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Merged statistics across all workers. Cached until a new worker is
    /// added.
    pub fn aggregate(&mut self) -> &WorkerStats {
        if !self.cache_valid {
            self.compute_aggregate();
        }

        self.aggregate_cache.as_ref().unwrap()
    }

    fn compute_aggregate(&mut self) {
        let mut aggregate = WorkerStats::new();

        for stats in self.workers.values() {
            aggregate.merge(stats);
        }

        self.aggregate_cache = Some(aggregate);
        self.cache_valid = true;
    }

    /// Finalize the merged statistics into a report-ready snapshot.
    pub fn snapshot(&mut self) -> StatsSnapshot {
        self.aggregate().snapshot()
    }

    /// Statistics for one worker, if it was added.
    pub fn worker_stats(&self, worker_id: usize) -> Option<&WorkerStats> {
        self.workers.get(&worker_id)
    }

    /// Worker IDs in ascending order for consistent iteration.
    pub fn worker_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.workers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}
