//! In-memory simulated data service
//!
//! Implements [`DataService`] against synthetic fixtures so the simulator can
//! run end-to-end without a live backend. The CLI builds one from the
//! `--sim-*` knobs; protocol tests assert against its recorded call log.

use super::{
    CacheMode, DataService, Job, PipeFilter, PipeRecord, ServiceError, SortSpec, WeldRecord,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Fixture describing one simulated job scope.
#[derive(Debug, Clone)]
pub struct JobFixture {
    pub job: Job,
    /// Total pipe records in the full job scope.
    pub total: u64,
    /// Pipe records matching any incremental (`updated_since`) filter.
    pub incremental_total: u64,
    /// Weld records matching any `since` filter.
    pub related_total: u64,
}

/// Which trait method a recorded call came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMethod {
    GetJob,
    CountAndFetch,
    FetchIncremental,
    FetchRelatedSince,
    Update,
    Insert,
}

/// One recorded service call, for protocol assertions.
#[derive(Debug, Clone)]
pub struct ServiceCall {
    pub method: CallMethod,
    pub job_id: i64,
    pub page: u32,
    pub page_size: u32,
    pub cache: CacheMode,
    pub since: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
}

/// In-memory [`DataService`] implementation.
///
/// Thread-safe: fixtures are immutable after construction, the call log is
/// mutex-guarded, and counters are atomic.
pub struct SimulatedService {
    jobs: HashMap<i64, JobFixture>,
    /// Artificial per-call latency window (uniform), if any.
    latency: Option<(Duration, Duration)>,
    /// Per-request bound; a drawn latency beyond it becomes a timeout.
    timeout: Option<Duration>,
    calls: Mutex<Vec<ServiceCall>>,
    /// Errors to inject, consumed one per data call in FIFO order.
    fail_next: Mutex<VecDeque<ServiceError>>,
    mutations: AtomicU64,
}

impl SimulatedService {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
            latency: None,
            timeout: None,
            calls: Mutex::new(Vec::new()),
            fail_next: Mutex::new(VecDeque::new()),
            mutations: AtomicU64::new(0),
        }
    }

    /// Add a job fixture. The incremental and related totals default to a
    /// tenth of the full scope; override with [`Self::with_fixture`].
    pub fn with_job(mut self, job_id: i64, vendor_id: i64, name: &str, total: u64) -> Self {
        self.jobs.insert(
            job_id,
            JobFixture {
                job: Job {
                    job_id,
                    vendor_id,
                    name: name.to_string(),
                },
                total,
                incremental_total: total / 10,
                related_total: total / 10,
            },
        );
        self
    }

    /// Add a fully specified job fixture.
    pub fn with_fixture(mut self, fixture: JobFixture) -> Self {
        self.jobs.insert(fixture.job.job_id, fixture);
        self
    }

    /// Sleep a uniform-random amount within `[min, max]` on every call.
    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        self.latency = Some((min, max));
        self
    }

    /// Bound every call; a drawn latency beyond the bound sleeps until the
    /// bound and fails with [`ServiceError::Timeout`].
    pub fn with_timeout(mut self, bound: Duration) -> Self {
        self.timeout = Some(bound);
        self
    }

    /// Queue an error to be returned by the next data call.
    pub fn inject_error(&self, err: ServiceError) {
        self.fail_next.lock().unwrap().push_back(err);
    }

    /// Snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls that came through `method`.
    pub fn calls_of(&self, method: CallMethod) -> Vec<ServiceCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Number of update/insert calls accepted.
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::Relaxed)
    }

    fn record_call(&self, call: ServiceCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn simulate_latency(&self) -> Result<(), ServiceError> {
        if let Some((min, max)) = self.latency {
            let span = max.saturating_sub(min);
            let jitter = if span.is_zero() {
                Duration::ZERO
            } else {
                let millis = rand::thread_rng().gen_range(0..=span.as_millis() as u64);
                Duration::from_millis(millis)
            };
            let drawn = min + jitter;

            if let Some(bound) = self.timeout {
                if drawn > bound {
                    std::thread::sleep(bound);
                    return Err(ServiceError::Timeout(bound));
                }
            }
            std::thread::sleep(drawn);
        }
        Ok(())
    }

    fn take_injected(&self) -> Result<(), ServiceError> {
        match self.fail_next.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fixture(&self, job_id: i64) -> Result<&JobFixture, ServiceError> {
        self.jobs.get(&job_id).ok_or(ServiceError::NotFound(job_id))
    }

    /// Number of records on page `page` of a result set with `total` rows.
    fn page_len(total: u64, page: u32, page_size: u32) -> u64 {
        total
            .saturating_sub(page as u64 * page_size as u64)
            .min(page_size as u64)
    }

    fn synth_pipe(fixture: &JobFixture, index: u64) -> PipeRecord {
        let pipe_id = fixture.job.job_id * 1_000_000 + index as i64;
        PipeRecord {
            pipe_id,
            barcode: format!("{pipe_id}bc"),
            number: format!("{pipe_id}nm"),
            vendor_id: fixture.job.vendor_id,
            job_id: fixture.job.job_id,
            status: "IN".to_string(),
            alert: String::new(),
            last_updated: Utc::now(),
        }
    }

    fn synth_weld(fixture: &JobFixture, index: u64) -> WeldRecord {
        WeldRecord {
            weld_id: fixture.job.job_id * 1_000_000 + index as i64,
            job_id: fixture.job.job_id,
            status: "Active".to_string(),
            last_updated: Utc::now(),
        }
    }
}

impl Default for SimulatedService {
    fn default() -> Self {
        Self::new()
    }
}

impl DataService for SimulatedService {
    fn get_job(&self, job_id: i64) -> Result<Job, ServiceError> {
        self.record_call(ServiceCall {
            method: CallMethod::GetJob,
            job_id,
            page: 0,
            page_size: 0,
            cache: CacheMode::Bypass,
            since: None,
            before: None,
        });
        Ok(self.fixture(job_id)?.job.clone())
    }

    fn count_and_fetch(
        &self,
        filter: &PipeFilter,
        _sort: SortSpec,
        page: u32,
        page_size: u32,
        cache: CacheMode,
    ) -> Result<(Vec<PipeRecord>, u64), ServiceError> {
        self.record_call(ServiceCall {
            method: CallMethod::CountAndFetch,
            job_id: filter.job_id,
            page,
            page_size,
            cache,
            since: filter.updated_since,
            before: filter.updated_before,
        });
        self.take_injected()?;
        self.simulate_latency()?;

        let fixture = self.fixture(filter.job_id)?;
        let n = Self::page_len(fixture.total, page, page_size);
        let offset = page as u64 * page_size as u64;
        let records = (offset..offset + n)
            .map(|i| Self::synth_pipe(fixture, i))
            .collect();
        Ok((records, fixture.total))
    }

    fn fetch_incremental(
        &self,
        filter: &PipeFilter,
        _sort: SortSpec,
        page: u32,
        page_size: u32,
        cache: CacheMode,
    ) -> Result<Vec<PipeRecord>, ServiceError> {
        self.record_call(ServiceCall {
            method: CallMethod::FetchIncremental,
            job_id: filter.job_id,
            page,
            page_size,
            cache,
            since: filter.updated_since,
            before: filter.updated_before,
        });
        self.take_injected()?;
        self.simulate_latency()?;

        let fixture = self.fixture(filter.job_id)?;
        let n = Self::page_len(fixture.incremental_total, page, page_size);
        let offset = page as u64 * page_size as u64;
        Ok((offset..offset + n)
            .map(|i| Self::synth_pipe(fixture, i))
            .collect())
    }

    fn fetch_related_since(
        &self,
        job_id: i64,
        since: Option<DateTime<Utc>>,
        page: u32,
        page_size: u32,
        cache: CacheMode,
    ) -> Result<Vec<WeldRecord>, ServiceError> {
        self.record_call(ServiceCall {
            method: CallMethod::FetchRelatedSince,
            job_id,
            page,
            page_size,
            cache,
            since,
            before: None,
        });
        self.take_injected()?;
        self.simulate_latency()?;

        let fixture = self.fixture(job_id)?;
        let n = Self::page_len(fixture.related_total, page, page_size);
        let offset = page as u64 * page_size as u64;
        Ok((offset..offset + n)
            .map(|i| Self::synth_weld(fixture, i))
            .collect())
    }

    fn update(&self, record: &PipeRecord) -> Result<(), ServiceError> {
        self.record_call(ServiceCall {
            method: CallMethod::Update,
            job_id: record.job_id,
            page: 0,
            page_size: 0,
            cache: CacheMode::Bypass,
            since: None,
            before: None,
        });
        self.take_injected()?;
        self.simulate_latency()?;
        self.fixture(record.job_id)?;
        self.mutations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn insert(&self, record: &PipeRecord) -> Result<(), ServiceError> {
        self.record_call(ServiceCall {
            method: CallMethod::Insert,
            job_id: record.job_id,
            page: 0,
            page_size: 0,
            cache: CacheMode::Bypass,
            since: None,
            before: None,
        });
        self.take_injected()?;
        self.simulate_latency()?;
        self.fixture(record.job_id)?;
        self.mutations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
