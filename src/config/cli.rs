//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Operation selector as it appears on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OperationArg {
    /// Exhaustive paginated fetch of all records in scope
    Full,
    /// Incremental fetch of records changed since a cursor
    Partial,
    /// Hour-aligned backfill windows plus one live window
    Windowed,
    /// Random pool pick, fixed mutation, update call
    Mutate,
    /// Mutation followed by an incremental refresh
    MutateRefresh,
    /// Generated record submitted as an insert
    Insert,
}

/// LoadPulse - concurrent workload simulator for paged data services
#[derive(Parser, Debug)]
#[command(name = "loadpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Comma-separated list of job IDs to exercise
    #[arg(short = 'j', long)]
    pub jobs: Option<String>,

    /// Operation every simulated user executes
    #[arg(short = 'o', long, value_enum)]
    pub operation: Option<OperationArg>,

    /// Number of simulated users [default: 1]
    #[arg(short = 'u', long)]
    pub users: Option<usize>,

    /// Number of operations each user performs [default: 1]
    #[arg(short = 'n', long)]
    pub iterations: Option<u32>,

    /// Stagger user start times by min:max seconds [default: 0:0]
    #[arg(short = 's', long)]
    pub stagger: Option<String>,

    /// Downtime between a user's operations, min:max seconds [default: 0:0]
    #[arg(short = 'd', long)]
    pub downtime: Option<String>,

    /// Initial cursor for incremental operations
    /// (RFC 3339 or "YYYY-MM-DD HH:MM:SS", UTC)
    #[arg(long)]
    pub cursor: Option<String>,

    /// Simulated processing time per fetched record, in milliseconds
    #[arg(long)]
    pub process_ms: Option<u64>,

    /// Settle delay between mutation and read-back, in seconds [default: 2]
    #[arg(long)]
    pub settle_secs: Option<u64>,

    /// Per-request timeout in seconds [default: 120]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Terminate a user on its first failed operation
    /// (other users are unaffected)
    #[arg(long)]
    pub fail_fast: bool,

    // === Simulated backend ===
    /// Records per job in the simulated backend
    #[arg(long, default_value = "2500")]
    pub sim_records: u64,

    /// Records matching incremental filters in the simulated backend
    #[arg(long, default_value = "250")]
    pub sim_incremental: u64,

    /// Artificial backend latency, min:max milliseconds
    #[arg(long)]
    pub sim_latency_ms: Option<String>,

    // === Output ===
    /// Write a JSON report to this path in addition to the console summary
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// TOML run profile; command-line arguments take precedence
    #[arg(long, env = "LOADPULSE_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Verbose progress output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
