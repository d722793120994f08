//! Run configuration
//!
//! An immutable [`RunConfig`] is built once from the CLI (optionally merged
//! with a TOML profile), validated, and passed explicitly into the scheduler,
//! workers and protocols. Nothing reads configuration from ambient globals.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The protocols a worker can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// Exhaustive paginated fetch of all records in scope.
    Full,
    /// Incremental fetch of records changed since a cursor.
    Partial,
    /// Incremental fetch broken into hour-aligned backfill windows plus one
    /// live, cache-bypassing window.
    Windowed,
    /// Uniform-random pool pick, fixed mutation, update call.
    Mutate,
    /// Mutation, settle delay, then one incremental refresh.
    MutateRefresh,
    /// Generated record submitted as an insert call.
    Insert,
}

impl OperationKind {
    /// Whether the protocol carries a cursor across iterations and therefore
    /// requires an initial cursor at startup.
    pub fn needs_cursor(&self) -> bool {
        matches!(self, OperationKind::Partial | OperationKind::MutateRefresh)
    }

    /// Whether the protocol mutates records from the pre-loaded pool.
    pub fn needs_pool(&self) -> bool {
        matches!(self, OperationKind::Mutate | OperationKind::MutateRefresh)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationKind::Full => "full refresh",
            OperationKind::Partial => "partial refresh",
            OperationKind::Windowed => "windowed partial refresh",
            OperationKind::Mutate => "record mutation",
            OperationKind::MutateRefresh => "mutation + refresh",
            OperationKind::Insert => "record insert",
        };
        f.write_str(name)
    }
}

/// Inclusive `[min, max]` second bounds for a randomized delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayWindow {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl DelayWindow {
    pub const ZERO: DelayWindow = DelayWindow {
        min_secs: 0,
        max_secs: 0,
    };
}

/// Immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Protocol every worker executes.
    pub operation: OperationKind,
    /// Number of simulated users.
    pub workers: usize,
    /// Iterations each worker performs.
    pub iterations: u32,
    /// Randomized delay before a worker's first operation.
    pub stagger: DelayWindow,
    /// Randomized delay between a worker's successive operations.
    pub downtime: DelayWindow,
    /// Lower bound for the first incremental fetch of each worker.
    pub initial_cursor: Option<DateTime<Utc>>,
    /// Simulated per-record processing time, if any.
    pub process_ms: Option<u64>,
    /// Settle delay between the write and the read-back in mutation+refresh.
    pub settle: Duration,
    /// Upper bound for a single remote call. Finite by design.
    pub request_timeout: Duration,
    /// Terminate a worker (not the run) on its first failed operation.
    pub fail_fast: bool,
    /// Verbose progress output.
    pub debug: bool,
}

impl RunConfig {
    /// A minimal configuration for tests: one worker, one iteration, no
    /// pacing delays.
    pub fn for_test(operation: OperationKind) -> Self {
        Self {
            operation,
            workers: 1,
            iterations: 1,
            stagger: DelayWindow::ZERO,
            downtime: DelayWindow::ZERO,
            initial_cursor: None,
            process_ms: None,
            settle: Duration::ZERO,
            request_timeout: Duration::from_secs(120),
            fail_fast: false,
            debug: false,
        }
    }
}

/// Build a validated-shape `RunConfig` plus the target job list. Precedence
/// per knob: explicit CLI argument, then profile value, then the built-in
/// default. CLI arguments are `Option`s so an explicit value is
/// distinguishable from an absent one even when it equals the default.
/// Bound checks happen in [`validator::validate_config`].
pub fn build(cli: &cli::Cli, profile: Option<&toml::Profile>) -> anyhow::Result<(RunConfig, Vec<i64>)> {
    use anyhow::Context;

    let empty = toml::Profile::default();
    let profile = profile.unwrap_or(&empty);

    let jobs = match &cli.jobs {
        Some(s) => cli_convert::parse_jobs(s).context("invalid --jobs")?,
        None => profile
            .jobs
            .clone()
            .context("no jobs specified (use --jobs or a profile)")?,
    };

    let operation = cli
        .operation
        .map(cli_convert::convert_operation)
        .or(profile.operation)
        .context("no operation specified (use --operation or a profile)")?;

    let stagger = match cli.stagger.as_deref().or(profile.stagger.as_deref()) {
        Some(s) => cli_convert::parse_window(s).context("invalid stagger window")?,
        None => DelayWindow::ZERO,
    };

    let downtime = match cli.downtime.as_deref().or(profile.downtime.as_deref()) {
        Some(s) => cli_convert::parse_window(s).context("invalid downtime window")?,
        None => DelayWindow::ZERO,
    };

    let initial_cursor = match cli.cursor.as_deref().or(profile.cursor.as_deref()) {
        Some(s) => Some(cli_convert::parse_timestamp(s).context("invalid cursor")?),
        None => None,
    };

    let workers = cli.users.or(profile.users).unwrap_or(1);
    let iterations = cli.iterations.or(profile.iterations).unwrap_or(1);
    let settle_secs = cli.settle_secs.or(profile.settle_secs).unwrap_or(2);
    let timeout_secs = cli.timeout_secs.or(profile.timeout_secs).unwrap_or(120);

    let config = RunConfig {
        operation,
        workers,
        iterations,
        stagger,
        downtime,
        initial_cursor,
        process_ms: cli.process_ms.or(profile.process_ms),
        settle: Duration::from_secs(settle_secs),
        request_timeout: Duration::from_secs(timeout_secs),
        fail_fast: cli.fail_fast || profile.fail_fast.unwrap_or(false),
        debug: cli.debug,
    };

    Ok((config, jobs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_cursor() {
        assert!(OperationKind::Partial.needs_cursor());
        assert!(OperationKind::MutateRefresh.needs_cursor());
        assert!(!OperationKind::Full.needs_cursor());
        assert!(!OperationKind::Windowed.needs_cursor());
        assert!(!OperationKind::Mutate.needs_cursor());
    }

    #[test]
    fn test_needs_pool() {
        assert!(OperationKind::Mutate.needs_pool());
        assert!(OperationKind::MutateRefresh.needs_pool());
        assert!(!OperationKind::Partial.needs_pool());
        assert!(!OperationKind::Insert.needs_pool());
    }

    #[test]
    fn test_build_from_cli_only() {
        use clap::Parser;
        let cli = cli::Cli::parse_from([
            "loadpulse", "-j", "17,42", "-o", "full", "-u", "3", "-n", "2", "-s", "1:4",
        ]);
        let (config, jobs) = build(&cli, None).unwrap();

        assert_eq!(jobs, vec![17, 42]);
        assert_eq!(config.operation, OperationKind::Full);
        assert_eq!(config.workers, 3);
        assert_eq!(config.iterations, 2);
        assert_eq!(config.stagger, DelayWindow { min_secs: 1, max_secs: 4 });
        assert_eq!(config.downtime, DelayWindow::ZERO);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_build_cli_overrides_profile() {
        use clap::Parser;
        let cli = cli::Cli::parse_from(["loadpulse", "-o", "partial", "-u", "5", "--cursor", "2015-08-13 17:20:00"]);
        let profile = toml::Profile {
            jobs: Some(vec![7]),
            operation: Some(OperationKind::Full),
            users: Some(50),
            iterations: Some(9),
            ..Default::default()
        };
        let (config, jobs) = build(&cli, Some(&profile)).unwrap();

        assert_eq!(jobs, vec![7]); // from profile
        assert_eq!(config.operation, OperationKind::Partial); // CLI wins
        assert_eq!(config.workers, 5); // CLI wins
        assert_eq!(config.iterations, 9); // profile fills default
        assert!(config.initial_cursor.is_some());
    }

    #[test]
    fn test_build_explicit_default_value_beats_profile() {
        // -u 1 and -s 0:0 equal the built-in defaults but are explicit, so
        // the profile must not override them
        use clap::Parser;
        let cli = cli::Cli::parse_from(["loadpulse", "-j", "42", "-o", "full", "-u", "1", "-s", "0:0"]);
        let profile = toml::Profile {
            users: Some(50),
            stagger: Some("10:20".into()),
            iterations: Some(9),
            ..Default::default()
        };
        let (config, _) = build(&cli, Some(&profile)).unwrap();

        assert_eq!(config.workers, 1);
        assert_eq!(config.stagger, DelayWindow::ZERO);
        // Knobs the CLI left absent still come from the profile
        assert_eq!(config.iterations, 9);
    }

    #[test]
    fn test_build_requires_jobs_and_operation() {
        use clap::Parser;
        let cli = cli::Cli::parse_from(["loadpulse"]);
        assert!(build(&cli, None).is_err());
    }
}
