//! Record mutation and insertion
//!
//! `run` picks a record uniformly from the pre-loaded pool, applies a fixed
//! mutation (alert flag plus last-updated timestamp) and submits it as an
//! update. The pool itself is never written; only a mutated copy travels to
//! the service.
//!
//! `run_with_refresh` chains a mutation with one incremental refresh after a
//! settle delay, measuring read-your-writes latency end to end. `run_insert`
//! submits a freshly generated record instead of mutating a pooled one.

use super::{partial, OpContext, OperationResult};
use crate::client::PipeRecord;
use crate::Result;
use chrono::Utc;
use rand::Rng;
use std::time::Instant;

/// Alert value stamped onto mutated records.
const MUTATION_ALERT: &str = "load-alert";

pub fn run(ctx: &mut OpContext<'_>) -> Result<OperationResult> {
    if ctx.pool.is_empty() {
        anyhow::bail!("mutation pool is empty");
    }

    let index = ctx.rng.gen_range(0..ctx.pool.len());
    let mut record = ctx.pool[index].clone();
    record.alert = MUTATION_ALERT.to_string();
    record.last_updated = Utc::now();

    let started = Instant::now();
    ctx.service.update(&record)?;
    let elapsed = started.elapsed();

    if ctx.config.debug {
        println!(
            "worker {}: mutated pipe {} of job {}",
            ctx.worker_id, record.pipe_id, record.job_id
        );
    }

    Ok(OperationResult::single(elapsed, 0))
}

/// Mutation, settle delay, then one incremental refresh with the worker's
/// existing cursor state.
pub fn run_with_refresh(ctx: &mut OpContext<'_>) -> Result<OperationResult> {
    let mut result = run(ctx)?;

    // Give the remote system time to process the write before reading back
    std::thread::sleep(ctx.config.settle);

    result.absorb(partial::run(ctx)?);
    Ok(result)
}

/// Insert-style load: generate a record in the target's scope and submit it.
pub fn run_insert(ctx: &mut OpContext<'_>) -> Result<OperationResult> {
    let job = &ctx.target.job;
    let record = generate_pipe(ctx.rng, job.vendor_id, job.job_id);

    let started = Instant::now();
    ctx.service.insert(&record)?;
    let elapsed = started.elapsed();

    if ctx.config.debug {
        println!(
            "worker {}: inserted pipe {} into job {}",
            ctx.worker_id, record.pipe_id, record.job_id
        );
    }

    Ok(OperationResult::single(elapsed, 0))
}

/// Generate a synthetic pipe payload for insert-style load (the record pool
/// only carries fetched records; inserts need fresh identities).
fn generate_pipe(rng: &mut impl Rng, vendor_id: i64, job_id: i64) -> PipeRecord {
    let pipe_id: i64 = rng.gen_range(1_000_000_000..i64::MAX);
    PipeRecord {
        pipe_id,
        barcode: format!("{pipe_id}bc"),
        number: format!("{pipe_id}nm"),
        vendor_id,
        job_id,
        status: "IN".to_string(),
        alert: String::new(),
        last_updated: Utc::now(),
    }
}
