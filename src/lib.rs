//! LoadPulse - concurrent workload simulator for paged remote data services
//!
//! LoadPulse drives a remote CRUD/query service with many independently-paced
//! synthetic users, each repeatedly executing one of several data-access
//! protocols while per-operation latencies are collected.
//!
//! # Architecture
//!
//! - **Operation catalog**: full refresh, incremental refresh, windowed
//!   incremental refresh, record mutation, mutation+refresh chaining
//! - **Workers**: one OS thread per simulated user, staggered starts,
//!   randomized downtime between iterations
//! - **Service seam**: the remote service is consumed through the
//!   [`client::DataService`] trait; an in-memory simulated backend ships
//!   with the crate
//! - **Statistics**: per-worker accumulation merged at join time, with
//!   latency percentiles and a per-second histogram

pub mod client;
pub mod config;
pub mod ops;
pub mod output;
pub mod pacing;
pub mod scheduler;
pub mod stats;
pub mod target;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::RunConfig;
pub use scheduler::Scheduler;

/// Result type used throughout LoadPulse
pub type Result<T> = anyhow::Result<T>;
