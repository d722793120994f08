//! Windowed partial refresh
//!
//! Backfills a random number of whole-hour windows and finishes with the
//! current, still-open hour. Historical windows are immutable once the hour
//! has passed, so cached responses are acceptable for them; the final window
//! is partial by construction and must always come from live data.

use super::{simulate_processing, OpContext, OperationResult};
use crate::client::{CacheMode, PipeFilter, SortSpec, PAGE_SIZE};
use crate::util::time::hour_floor;
use crate::Result;
use chrono::{TimeDelta, Utc};
use rand::Rng;
use std::time::Instant;

/// Bounds for the randomized look-back, in hours (inclusive).
const LOOKBACK_HOURS_MIN: i64 = 1;
const LOOKBACK_HOURS_MAX: i64 = 5;

pub fn run(ctx: &mut OpContext<'_>) -> Result<OperationResult> {
    let job = &ctx.target.job;
    let hours = ctx.rng.gen_range(LOOKBACK_HOURS_MIN..=LOOKBACK_HOURS_MAX);
    let started = Instant::now();
    let now = Utc::now();
    let mut records = 0u64;

    // Oldest window first
    for i in (1..=hours).rev() {
        let window_start = hour_floor(now - TimeDelta::hours(i));
        let window_end = window_start + TimeDelta::hours(1);
        let filter =
            PipeFilter::updated_between(job.vendor_id, job.job_id, window_start, window_end);

        let batch = ctx.service.fetch_incremental(
            &filter,
            SortSpec::pipe_id_asc(),
            0,
            PAGE_SIZE,
            CacheMode::Accept,
        )?;
        records += batch.len() as u64;
        simulate_processing(ctx.config, batch.len());
    }

    // The open hour: partial by construction, never served from a cache
    let live_now = Utc::now();
    let filter =
        PipeFilter::updated_between(job.vendor_id, job.job_id, hour_floor(live_now), live_now);
    let batch = ctx.service.fetch_incremental(
        &filter,
        SortSpec::pipe_id_asc(),
        0,
        PAGE_SIZE,
        CacheMode::Bypass,
    )?;
    records += batch.len() as u64;
    simulate_processing(ctx.config, batch.len());

    if ctx.config.debug {
        println!(
            "worker {}: windowed refresh of job {}: {} backfill hours, {} records",
            ctx.worker_id, job.job_id, hours, records
        );
    }

    Ok(OperationResult::single(started.elapsed(), records))
}
