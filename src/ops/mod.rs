//! Operation catalog
//!
//! The executable protocols a worker can run against the remote service.
//! Dispatch is a match on [`OperationKind`]; every protocol receives the same
//! [`OpContext`] and produces an [`OperationResult`] that the worker folds
//! into its statistics.

pub mod full;
pub mod mutate;
pub mod partial;
pub mod windowed;

use crate::client::{DataService, PipeRecord};
use crate::config::{OperationKind, RunConfig};
use crate::target::TargetJob;
use crate::worker::WorkerState;
use crate::Result;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::Duration;

/// Everything one protocol invocation needs.
///
/// `state` and `rng` are the invoking worker's; nothing here is shared
/// across workers except the read-only service, target and pool.
pub struct OpContext<'a> {
    pub config: &'a RunConfig,
    pub service: &'a dyn DataService,
    pub target: &'a TargetJob,
    pub pool: &'a [PipeRecord],
    pub state: &'a mut WorkerState,
    pub rng: &'a mut Xoshiro256PlusPlus,
    pub worker_id: usize,
}

/// Outcome of one protocol invocation.
///
/// Full Refresh records one sample per page fetched; every other protocol
/// records one sample for the whole invocation.
#[derive(Debug, Clone, Default)]
pub struct OperationResult {
    pub samples: Vec<Duration>,
    pub records: u64,
}

impl OperationResult {
    pub fn single(elapsed: Duration, records: u64) -> Self {
        Self {
            samples: vec![elapsed],
            records,
        }
    }

    /// Fold another invocation's outcome into this one (used by the
    /// mutation+refresh chain).
    pub fn absorb(&mut self, other: OperationResult) {
        self.samples.extend(other.samples);
        self.records += other.records;
    }
}

/// Run one invocation of `kind`.
pub fn execute(kind: OperationKind, ctx: &mut OpContext<'_>) -> Result<OperationResult> {
    match kind {
        OperationKind::Full => full::run(ctx),
        OperationKind::Partial => partial::run(ctx),
        OperationKind::Windowed => windowed::run(ctx),
        OperationKind::Mutate => mutate::run(ctx),
        OperationKind::MutateRefresh => mutate::run_with_refresh(ctx),
        OperationKind::Insert => mutate::run_insert(ctx),
    }
}

/// Simulate per-record client-side processing, if configured.
pub(crate) fn simulate_processing(config: &RunConfig, records: usize) {
    if let Some(ms) = config.process_ms {
        if ms > 0 && records > 0 {
            std::thread::sleep(Duration::from_millis(ms * records as u64));
        }
    }
}
