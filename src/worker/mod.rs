//! Worker thread implementation
//!
//! A Worker is one simulated user. It owns everything it needs for the run
//! (RNG, pacing, cursor state, statistics accumulator) and shares nothing
//! mutable with other workers; its statistics leave the thread only as the
//! return value of [`Worker::run`].
//!
//! # Lifecycle
//!
//! Idle -> Staggering -> Running(0..iterations) -> Done. The stagger delay
//! decorrelates worker start times; every iteration executes one operation,
//! records its latency samples, and sleeps out a randomized downtime.
//!
//! # Failure policy
//!
//! A remote error or timeout spoils only that iteration: it is counted and
//! the worker proceeds to its downtime and next iteration. With `fail_fast`,
//! or on a non-remote error, the worker ends its own loop early. Neither
//! case affects the scheduler or any other worker.

use crate::client::{DataService, PipeRecord, ServiceError};
use crate::config::RunConfig;
use crate::ops::{self, OpContext};
use crate::pacing::PacingController;
use crate::stats::WorkerStats;
use crate::target::TargetJob;
use crate::util::time::format_duration;
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per-worker mutable state, owned exclusively by one worker.
///
/// The cursor is an explicit value handed into each protocol invocation;
/// incremental protocols read it at the start of an iteration and advance it
/// once the iteration's fetches complete.
#[derive(Debug, Clone, Default)]
pub struct WorkerState {
    /// Lower bound for the next incremental fetch.
    pub last_cursor: Option<DateTime<Utc>>,
    /// Completed iterations.
    pub sequence: u64,
}

impl WorkerState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One simulated user.
pub struct Worker {
    id: usize,
    config: Arc<RunConfig>,
    targets: Arc<Vec<TargetJob>>,
    pool: Arc<Vec<PipeRecord>>,
    service: Arc<dyn DataService>,
    stop: Arc<AtomicBool>,
    pacing: PacingController,
    rng: Xoshiro256PlusPlus,
    state: WorkerState,
    stats: WorkerStats,
}

impl Worker {
    pub fn new(
        id: usize,
        config: Arc<RunConfig>,
        targets: Arc<Vec<TargetJob>>,
        pool: Arc<Vec<PipeRecord>>,
        service: Arc<dyn DataService>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            config,
            targets,
            pool,
            service,
            stop,
            pacing: PacingController::new(),
            rng: Xoshiro256PlusPlus::from_entropy(),
            state: WorkerState::new(),
            stats: WorkerStats::new(),
        }
    }

    /// Run the worker to completion and return its statistics.
    pub fn run(mut self) -> WorkerStats {
        let stagger = self.pacing.delay(self.config.stagger);
        if self.config.debug {
            println!(
                "worker {}: staggering start by {}",
                self.id,
                format_duration(stagger)
            );
        }
        std::thread::sleep(stagger);

        for iteration in 0..self.config.iterations {
            if self.stop.load(Ordering::Relaxed) {
                if self.config.debug {
                    println!("worker {}: stop requested, exiting early", self.id);
                }
                break;
            }

            let target_index = if self.targets.len() > 1 {
                self.rng.gen_range(0..self.targets.len())
            } else {
                0
            };

            let outcome = {
                let target = &self.targets[target_index];
                let mut ctx = OpContext {
                    config: self.config.as_ref(),
                    service: self.service.as_ref(),
                    target,
                    pool: &self.pool,
                    state: &mut self.state,
                    rng: &mut self.rng,
                    worker_id: self.id,
                };
                ops::execute(self.config.operation, &mut ctx)
            };

            match outcome {
                Ok(result) => {
                    for sample in &result.samples {
                        self.stats.record(*sample);
                    }
                    self.stats.record_fetched(result.records);
                }
                Err(err) => {
                    self.stats.record_error();
                    eprintln!("worker {}: iteration {} failed: {:#}", self.id, iteration, err);

                    if self.config.fail_fast || !is_recoverable(&err) {
                        break;
                    }
                }
            }

            self.state.sequence += 1;
            std::thread::sleep(self.pacing.delay(self.config.downtime));
        }

        self.stats
    }
}

/// Remote errors and timeouts spoil one iteration; anything else ends the
/// worker's loop.
fn is_recoverable(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ServiceError>(),
        Some(ServiceError::Remote(_) | ServiceError::Timeout(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{CallMethod, SimulatedService};
    use crate::config::{OperationKind, RunConfig};
    use crate::target::TargetJob;

    fn harness(
        svc: SimulatedService,
        config: RunConfig,
    ) -> (Arc<SimulatedService>, Worker, Arc<AtomicBool>) {
        let svc = Arc::new(svc);
        let target = TargetJob::resolve(svc.as_ref(), 42).unwrap();
        svc.clear_calls();
        let stop = Arc::new(AtomicBool::new(false));
        let worker = Worker::new(
            0,
            Arc::new(config),
            Arc::new(vec![target]),
            Arc::new(Vec::new()),
            svc.clone(),
            stop.clone(),
        );
        (svc, worker, stop)
    }

    #[test]
    fn test_worker_runs_all_iterations() {
        let svc = SimulatedService::new().with_job(42, 7, "Job 42", 2500);
        let mut config = RunConfig::for_test(OperationKind::Full);
        config.iterations = 2;

        let (svc, worker, _stop) = harness(svc, config);
        let stats = worker.run();

        // 3 pages per iteration, 2 iterations
        assert_eq!(stats.count(), 6);
        assert_eq!(stats.errors(), 0);
        assert_eq!(svc.calls_of(CallMethod::CountAndFetch).len(), 6);
        assert_eq!(stats.records_fetched(), 5000);
    }

    #[test]
    fn test_remote_error_spoils_one_iteration_only() {
        let svc = SimulatedService::new().with_job(42, 7, "Job 42", 500);
        let mut config = RunConfig::for_test(OperationKind::Full);
        config.iterations = 3;

        let (svc, worker, _stop) = harness(svc, config);
        svc.inject_error(ServiceError::Remote("boom".into()));
        let stats = worker.run();

        assert_eq!(stats.errors(), 1);
        assert_eq!(stats.count(), 2);
        assert_eq!(stats.attempted(), 3);
    }

    #[test]
    fn test_fail_fast_ends_worker_after_first_error() {
        let svc = SimulatedService::new().with_job(42, 7, "Job 42", 500);
        let mut config = RunConfig::for_test(OperationKind::Full);
        config.iterations = 5;
        config.fail_fast = true;

        let (svc, worker, _stop) = harness(svc, config);
        svc.inject_error(ServiceError::Remote("boom".into()));
        let stats = worker.run();

        assert_eq!(stats.errors(), 1);
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.attempted(), 1);
    }

    #[test]
    fn test_timeout_treated_like_remote_error() {
        let svc = SimulatedService::new().with_job(42, 7, "Job 42", 500);
        let mut config = RunConfig::for_test(OperationKind::Full);
        config.iterations = 2;

        let (svc, worker, _stop) = harness(svc, config);
        svc.inject_error(ServiceError::Timeout(std::time::Duration::from_secs(120)));
        let stats = worker.run();

        assert_eq!(stats.errors(), 1);
        assert_eq!(stats.count(), 1);
    }

    #[test]
    fn test_stop_flag_exits_before_first_iteration() {
        let svc = SimulatedService::new().with_job(42, 7, "Job 42", 500);
        let mut config = RunConfig::for_test(OperationKind::Full);
        config.iterations = 10;

        let (svc, worker, stop) = harness(svc, config);
        stop.store(true, Ordering::Relaxed);
        let stats = worker.run();

        assert_eq!(stats.attempted(), 0);
        assert!(svc.calls_of(CallMethod::CountAndFetch).is_empty());
    }

    #[test]
    fn test_cursor_carried_across_iterations() {
        let svc = SimulatedService::new().with_job(42, 7, "Job 42", 5000);
        let t0 = Utc::now() - chrono::Duration::hours(2);
        let mut config = RunConfig::for_test(OperationKind::Partial);
        config.iterations = 2;
        config.initial_cursor = Some(t0);

        let (svc, worker, _stop) = harness(svc, config);
        let before = Utc::now();
        worker.run();

        let calls = svc.calls_of(CallMethod::FetchIncremental);
        assert!(calls.len() >= 2);
        // First iteration starts from the configured cursor; the second from
        // a cursor captured during the run
        assert_eq!(calls.first().unwrap().since, Some(t0));
        assert!(calls.last().unwrap().since.unwrap() >= before);
    }
}
