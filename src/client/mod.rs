//! Remote data service interface
//!
//! LoadPulse never implements the remote service; it consumes it through the
//! [`DataService`] trait. Query operations are paged, mutation operations are
//! single-record, and every request carries a cache-control toggle so the
//! refresh protocols can demand live data.
//!
//! The in-memory [`mock::SimulatedService`] implements this trait for tests
//! and as the binary's built-in backend.

pub mod mock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Page size used by every paginated protocol.
pub const PAGE_SIZE: u32 = 1000;

/// A vendor/job scope being exercised by the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: i64,
    pub vendor_id: i64,
    pub name: String,
}

/// A primary record. Payload fields beyond the ones the mutation protocol
/// touches are deliberately omitted; the simulator treats records as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeRecord {
    pub pipe_id: i64,
    pub barcode: String,
    pub number: String,
    pub vendor_id: i64,
    pub job_id: i64,
    pub status: String,
    pub alert: String,
    pub last_updated: DateTime<Utc>,
}

/// A dependent record refreshed alongside pipes by the incremental protocols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeldRecord {
    pub weld_id: i64,
    pub job_id: i64,
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

/// Record filter for paged queries.
///
/// `updated_since`/`updated_before` bound the `last_updated` field:
/// `since` is inclusive, `before` is exclusive. Both absent means an
/// unconstrained (full) scan of the job scope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipeFilter {
    pub vendor_id: Option<i64>,
    pub job_id: i64,
    pub updated_since: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
}

impl PipeFilter {
    /// Filter covering the whole `(vendor, job)` scope.
    pub fn job_scope(vendor_id: i64, job_id: i64) -> Self {
        Self {
            vendor_id: Some(vendor_id),
            job_id,
            ..Default::default()
        }
    }

    /// Filter for records updated at or after `since`.
    pub fn updated_since(vendor_id: i64, job_id: i64, since: DateTime<Utc>) -> Self {
        Self {
            vendor_id: Some(vendor_id),
            job_id,
            updated_since: Some(since),
            updated_before: None,
        }
    }

    /// Filter for records updated within `[since, before)`.
    pub fn updated_between(
        vendor_id: i64,
        job_id: i64,
        since: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Self {
        Self {
            vendor_id: Some(vendor_id),
            job_id,
            updated_since: Some(since),
            updated_before: Some(before),
        }
    }
}

/// Sort field for paged queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    PipeId,
    LastUpdated,
}

/// Sort direction for paged queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// Sort specification for paged queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub dir: SortDir,
}

impl SortSpec {
    /// Stable primary-key ordering used by the refresh protocols.
    pub fn pipe_id_asc() -> Self {
        Self {
            field: SortField::PipeId,
            dir: SortDir::Asc,
        }
    }
}

/// Per-request cache-control toggle.
///
/// `Bypass` signals the transport to skip any intermediate response cache;
/// the refresh protocols use it for every call that must observe live data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Cached responses are acceptable (historical backfill windows).
    Accept,
    /// Force retrieval of live, non-cached data.
    Bypass,
}

/// Errors surfaced by the remote service seam.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The referenced job does not exist. Fatal at startup.
    #[error("job {0} not found")]
    NotFound(i64),

    /// A query or mutation call failed or returned an error status.
    #[error("remote call failed: {0}")]
    Remote(String),

    /// A remote call exceeded its configured bound.
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),
}

/// The remote data service, as consumed by the simulator.
///
/// Implementations must be callable from many worker threads at once; the
/// simulator never serializes access on its side.
pub trait DataService: Send + Sync {
    /// Look up a job by ID. Fails with [`ServiceError::NotFound`] if unknown.
    fn get_job(&self, job_id: i64) -> Result<Job, ServiceError>;

    /// Fetch one page of records matching `filter` and return the total
    /// match count. A `page_size` of 0 or 1 is the cheap way to obtain the
    /// count alone.
    fn count_and_fetch(
        &self,
        filter: &PipeFilter,
        sort: SortSpec,
        page: u32,
        page_size: u32,
        cache: CacheMode,
    ) -> Result<(Vec<PipeRecord>, u64), ServiceError>;

    /// Fetch one page of records matching an incremental filter (one with
    /// `updated_since` set). No total count is computed.
    fn fetch_incremental(
        &self,
        filter: &PipeFilter,
        sort: SortSpec,
        page: u32,
        page_size: u32,
        cache: CacheMode,
    ) -> Result<Vec<PipeRecord>, ServiceError>;

    /// Fetch one page of dependent weld records updated at or after `since`.
    /// A `since` of `None` fetches the whole job scope.
    fn fetch_related_since(
        &self,
        job_id: i64,
        since: Option<DateTime<Utc>>,
        page: u32,
        page_size: u32,
        cache: CacheMode,
    ) -> Result<Vec<WeldRecord>, ServiceError>;

    /// Submit an update for an existing record.
    fn update(&self, record: &PipeRecord) -> Result<(), ServiceError>;

    /// Submit a new record.
    fn insert(&self, record: &PipeRecord) -> Result<(), ServiceError>;
}
