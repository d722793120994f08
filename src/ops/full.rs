//! Full refresh
//!
//! Exhaustive paginated fetch of every record in the target job's scope.
//! The page count was computed once at startup from the cached record count;
//! the loop runs exactly that many pages and does not adapt to short pages
//! mid-run. One latency sample is recorded per page.

use super::{simulate_processing, OpContext, OperationResult};
use crate::client::{CacheMode, PipeFilter, SortSpec, PAGE_SIZE};
use crate::Result;
use std::time::Instant;

pub fn run(ctx: &mut OpContext<'_>) -> Result<OperationResult> {
    let job = &ctx.target.job;
    let filter = PipeFilter::job_scope(job.vendor_id, job.job_id);
    let mut result = OperationResult::default();

    for page in 0..ctx.target.page_count {
        let started = Instant::now();
        let (records, _total) = ctx.service.count_and_fetch(
            &filter,
            SortSpec::pipe_id_asc(),
            page,
            PAGE_SIZE,
            CacheMode::Bypass,
        )?;
        result.samples.push(started.elapsed());
        result.records += records.len() as u64;

        if ctx.config.debug {
            println!(
                "worker {}: full refresh: page {}/{} of job {} -> {} records",
                ctx.worker_id,
                page + 1,
                ctx.target.page_count,
                job.job_id,
                records.len()
            );
        }

        simulate_processing(ctx.config, records.len());
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use crate::client::mock::{CallMethod, SimulatedService};
    use crate::client::{CacheMode, PAGE_SIZE};
    use crate::config::{OperationKind, RunConfig};
    use crate::ops::{self, OpContext};
    use crate::target::TargetJob;
    use crate::worker::WorkerState;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_full_refresh_issues_exactly_page_count_fetches() {
        let svc = SimulatedService::new().with_job(42, 7, "Job 42", 2500);
        let target = TargetJob::resolve(&svc, 42).unwrap();
        assert_eq!(target.page_count, 3);
        svc.clear_calls();

        let config = RunConfig::for_test(OperationKind::Full);
        let mut state = WorkerState::new();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut ctx = OpContext {
            config: &config,
            service: &svc,
            target: &target,
            pool: &[],
            state: &mut state,
            rng: &mut rng,
            worker_id: 0,
        };

        let result = ops::execute(OperationKind::Full, &mut ctx).unwrap();

        let calls = svc.calls_of(CallMethod::CountAndFetch);
        assert_eq!(calls.len(), 3);
        for (i, call) in calls.iter().enumerate() {
            assert_eq!(call.page, i as u32);
            assert_eq!(call.page_size, PAGE_SIZE);
            assert_eq!(call.cache, CacheMode::Bypass);
        }

        // One sample per page, all 2500 records seen
        assert_eq!(result.samples.len(), 3);
        assert_eq!(result.records, 2500);
    }

    #[test]
    fn test_full_refresh_empty_job_issues_no_fetches() {
        let svc = SimulatedService::new().with_job(42, 7, "Job 42", 0);
        let target = TargetJob::resolve(&svc, 42).unwrap();
        assert_eq!(target.page_count, 0);
        svc.clear_calls();

        let config = RunConfig::for_test(OperationKind::Full);
        let mut state = WorkerState::new();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut ctx = OpContext {
            config: &config,
            service: &svc,
            target: &target,
            pool: &[],
            state: &mut state,
            rng: &mut rng,
            worker_id: 0,
        };

        let result = ops::execute(OperationKind::Full, &mut ctx).unwrap();
        assert!(result.samples.is_empty());
        assert!(svc.calls_of(CallMethod::CountAndFetch).is_empty());
    }
}
