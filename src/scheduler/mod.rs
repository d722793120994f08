//! Run scheduler
//!
//! Spawns one OS thread per simulated user, waits for all of them to finish
//! and merges their statistics. Workers share only immutable state (the run
//! configuration, the resolved targets, the record pool and the service
//! handle) plus one atomic stop flag; all mutable state stays thread-local
//! until the join.

use crate::client::{DataService, PipeRecord};
use crate::config::RunConfig;
use crate::stats::aggregator::StatsAggregator;
use crate::stats::{StatsSnapshot, WorkerStats};
use crate::target::TargetJob;
use crate::worker::Worker;
use crate::Result;
use anyhow::Context;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

pub struct Scheduler {
    config: Arc<RunConfig>,
    targets: Arc<Vec<TargetJob>>,
    pool: Arc<Vec<PipeRecord>>,
    service: Arc<dyn DataService>,
    stop: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(
        config: RunConfig,
        targets: Vec<TargetJob>,
        pool: Arc<Vec<PipeRecord>>,
        service: Arc<dyn DataService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            targets: Arc::new(targets),
            pool,
            service,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag that asks all workers to wind down after their current
    /// iteration. The bundled binary runs to completion; this is exposed for
    /// library consumers that wire their own interrupt handling.
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Execute the run to completion and return the merged statistics.
    pub fn run(&self) -> Result<StatsSnapshot> {
        if self.targets.is_empty() {
            anyhow::bail!("no target jobs resolved");
        }

        let mut handles = Vec::with_capacity(self.config.workers);
        for id in 0..self.config.workers {
            let worker = Worker::new(
                id,
                self.config.clone(),
                self.targets.clone(),
                self.pool.clone(),
                self.service.clone(),
                self.stop.clone(),
            );

            let handle = thread::Builder::new()
                .name(format!("user-{id}"))
                .spawn(move || worker.run())
                .with_context(|| format!("failed to spawn worker {id}"))?;
            handles.push((id, handle));
        }

        let mut aggregator = StatsAggregator::new();
        for (id, handle) in handles {
            match handle.join() {
                Ok(stats) => aggregator.add_worker(id, stats),
                Err(_) => {
                    // A panicked worker loses its in-flight samples; count it
                    // as one failed worker so the report cannot look clean.
                    eprintln!("worker {id} panicked");
                    let mut stats = WorkerStats::new();
                    stats.record_error();
                    aggregator.add_worker(id, stats);
                }
            }
        }

        if self.config.debug {
            for id in aggregator.worker_ids() {
                if let Some(stats) = aggregator.worker_stats(id) {
                    println!(
                        "worker {}: {} ok, {} failed, {} records",
                        id,
                        stats.count(),
                        stats.errors(),
                        stats.records_fetched()
                    );
                }
            }
        }

        Ok(aggregator.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{CallMethod, SimulatedService};
    use crate::config::{OperationKind, RunConfig};
    use crate::target;
    use chrono::Utc;
    use std::sync::atomic::Ordering;

    fn resolve(svc: &Arc<SimulatedService>, job_ids: &[i64]) -> Vec<TargetJob> {
        let targets = target::resolve_targets(svc.as_ref(), job_ids).unwrap();
        svc.clear_calls();
        targets
    }

    #[test]
    fn test_full_refresh_run_end_to_end() {
        let svc = Arc::new(SimulatedService::new().with_job(42, 7, "Job 42", 2500));
        let targets = resolve(&svc, &[42]);
        let mut config = RunConfig::for_test(OperationKind::Full);
        config.workers = 3;
        config.iterations = 2;

        let scheduler = Scheduler::new(config, targets, Arc::new(Vec::new()), svc.clone());
        let snap = scheduler.run().unwrap();

        // 3 workers x 2 iterations x 3 pages
        assert_eq!(snap.count, 18);
        assert_eq!(snap.errors, 0);
        assert_eq!(snap.records_fetched, 6 * 2500);
        assert_eq!(svc.calls_of(CallMethod::CountAndFetch).len(), 18);
        assert!(snap.min.is_some());
        assert!(snap.mean.is_some());
    }

    #[test]
    fn test_partial_refresh_run_end_to_end() {
        let svc = Arc::new(SimulatedService::new().with_job(42, 7, "Job 42", 5000));
        let targets = resolve(&svc, &[42]);
        let mut config = RunConfig::for_test(OperationKind::Partial);
        config.workers = 2;
        config.iterations = 2;
        config.initial_cursor = Some(Utc::now() - chrono::Duration::hours(1));

        let scheduler = Scheduler::new(config, targets, Arc::new(Vec::new()), svc.clone());
        let snap = scheduler.run().unwrap();

        // Each invocation contributes exactly one sample
        assert_eq!(snap.count, 4);
        assert_eq!(snap.errors, 0);
    }

    #[test]
    fn test_worker_error_does_not_poison_run() {
        let svc = Arc::new(SimulatedService::new().with_job(42, 7, "Job 42", 500));
        let targets = resolve(&svc, &[42]);
        svc.inject_error(crate::client::ServiceError::Remote("boom".into()));
        let mut config = RunConfig::for_test(OperationKind::Full);
        config.workers = 2;
        config.iterations = 2;

        let scheduler = Scheduler::new(config, targets, Arc::new(Vec::new()), svc.clone());
        let snap = scheduler.run().unwrap();

        // One iteration failed somewhere; the other three completed
        assert_eq!(snap.errors, 1);
        assert_eq!(snap.count, 3);
        assert_eq!(snap.attempted, 4);
    }

    #[test]
    fn test_stop_signal_short_circuits_run() {
        let svc = Arc::new(SimulatedService::new().with_job(42, 7, "Job 42", 500));
        let targets = resolve(&svc, &[42]);
        let mut config = RunConfig::for_test(OperationKind::Full);
        config.workers = 2;
        config.iterations = 100;

        let scheduler = Scheduler::new(config, targets, Arc::new(Vec::new()), svc.clone());
        scheduler.stop_signal().store(true, Ordering::Relaxed);
        let snap = scheduler.run().unwrap();

        assert_eq!(snap.attempted, 0);
        assert!(snap.min.is_none());
    }

    #[test]
    fn test_workers_spread_over_multiple_targets() {
        let svc = Arc::new(
            SimulatedService::new()
                .with_job(42, 7, "Job 42", 1000)
                .with_job(43, 7, "Job 43", 1000),
        );
        let targets = resolve(&svc, &[42, 43]);
        let mut config = RunConfig::for_test(OperationKind::Full);
        config.workers = 4;
        config.iterations = 8;

        let scheduler = Scheduler::new(config, targets, Arc::new(Vec::new()), svc.clone());
        let snap = scheduler.run().unwrap();

        assert_eq!(snap.count, 32);
        let calls = svc.calls_of(CallMethod::CountAndFetch);
        // With 32 uniform picks over two jobs, both should be exercised
        assert!(calls.iter().any(|c| c.job_id == 42));
        assert!(calls.iter().any(|c| c.job_id == 43));
    }

    #[test]
    fn test_no_targets_is_an_error() {
        let svc: Arc<SimulatedService> = Arc::new(SimulatedService::new());
        let config = RunConfig::for_test(OperationKind::Full);
        let scheduler = Scheduler::new(config, Vec::new(), Arc::new(Vec::new()), svc);
        assert!(scheduler.run().is_err());
    }
}
