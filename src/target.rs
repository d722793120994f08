//! Target job resolution
//!
//! A [`TargetJob`] pins down one vendor/job scope being exercised: the job
//! identity, its cached record count, and the derived page count. Targets are
//! resolved once at startup and are read-only for the rest of the run.

use crate::client::{CacheMode, DataService, Job, PipeFilter, PipeRecord, SortSpec, PAGE_SIZE};
use crate::Result;
use anyhow::Context;
use std::sync::Arc;

/// One job scope under load.
#[derive(Debug, Clone)]
pub struct TargetJob {
    pub job: Job,
    /// Total records in scope, fetched once at startup.
    pub total: u64,
    /// `ceil(total / PAGE_SIZE)`, computed once at startup and never
    /// refreshed mid-run.
    pub page_count: u32,
}

impl TargetJob {
    pub fn from_parts(job: Job, total: u64) -> Self {
        let page_count = total.div_ceil(PAGE_SIZE as u64) as u32;
        Self {
            job,
            total,
            page_count,
        }
    }

    /// Look up the job and probe its record count with a single-row fetch.
    pub fn resolve(service: &dyn DataService, job_id: i64) -> Result<Self> {
        let job = service
            .get_job(job_id)
            .with_context(|| format!("failed to look up job {job_id}"))?;

        let filter = PipeFilter::job_scope(job.vendor_id, job.job_id);
        let (_, total) = service
            .count_and_fetch(&filter, SortSpec::pipe_id_asc(), 0, 1, CacheMode::Bypass)
            .with_context(|| format!("failed to count records for job {job_id}"))?;

        Ok(Self::from_parts(job, total))
    }
}

/// Resolve every requested job, failing fast on the first unknown one.
pub fn resolve_targets(service: &dyn DataService, job_ids: &[i64]) -> Result<Vec<TargetJob>> {
    job_ids
        .iter()
        .map(|&id| TargetJob::resolve(service, id))
        .collect()
}

/// Load the read-only mutation pool: up to one page of records per target.
/// Workers pick from the pool by random index and submit mutated copies;
/// the pool itself is never written after this.
pub fn load_pool(service: &dyn DataService, targets: &[TargetJob]) -> Result<Arc<Vec<PipeRecord>>> {
    let mut pool = Vec::new();
    for target in targets {
        let filter = PipeFilter::job_scope(target.job.vendor_id, target.job.job_id);
        let (records, _) = service
            .count_and_fetch(&filter, SortSpec::pipe_id_asc(), 0, PAGE_SIZE, CacheMode::Bypass)
            .with_context(|| format!("failed to load mutation pool for job {}", target.job.job_id))?;
        pool.extend(records);
    }
    Ok(Arc::new(pool))
}
