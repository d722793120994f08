//! LoadPulse CLI entry point

use anyhow::{Context, Result};
use loadpulse::client::mock::{JobFixture, SimulatedService};
use loadpulse::client::{DataService, Job};
use loadpulse::config::{self, cli::Cli, cli_convert, toml::Profile, validator, RunConfig};
use loadpulse::{output, target, Scheduler};
use std::sync::Arc;
use std::time::Instant;

fn main() -> Result<()> {
    println!("LoadPulse v{}", env!("CARGO_PKG_VERSION"));
    println!("Concurrent workload simulator for paged data services");
    println!();

    let cli = Cli::parse_args();

    let profile = match &cli.profile {
        Some(path) => Some(Profile::load(path)?),
        None => None,
    };

    let (run_config, job_ids) = config::build(&cli, profile.as_ref())?;
    validator::validate_config(&run_config).context("configuration validation failed")?;

    let service = build_service(&cli, &run_config, &job_ids)?;

    println!("getting jobs...");
    let targets = target::resolve_targets(service.as_ref(), &job_ids)?;
    for target in &targets {
        println!(
            "  job {} '{}': {} records, {} pages",
            target.job.job_id, target.job.name, target.total, target.page_count
        );
    }

    let pool = if run_config.operation.needs_pool() {
        let pool = target::load_pool(service.as_ref(), &targets)?;
        if pool.is_empty() {
            anyhow::bail!("no records available to mutate");
        }
        println!("loaded {} records into the mutation pool", pool.len());
        pool
    } else {
        Arc::new(Vec::new())
    };

    print_configuration(&run_config, &job_ids);

    println!();
    println!("Starting run...");
    println!();

    let started = Instant::now();
    let scheduler = Scheduler::new(run_config.clone(), targets, pool, service);
    let snapshot = scheduler.run()?;
    let elapsed = started.elapsed();

    output::text::print_report(&snapshot, elapsed, &run_config);

    if let Some(path) = &cli.report_json {
        output::json::write_report(path, &snapshot, elapsed, &run_config)?;
        println!("JSON report written to {}", path.display());
    }

    Ok(())
}

/// Build the simulated backend from CLI knobs. The per-request timeout from
/// the run configuration is enforced at the service boundary.
fn build_service(cli: &Cli, config: &RunConfig, job_ids: &[i64]) -> Result<Arc<dyn DataService>> {
    let mut service = SimulatedService::new();
    for &job_id in job_ids {
        service = service.with_fixture(JobFixture {
            job: Job {
                job_id,
                vendor_id: 1,
                name: format!("Simulated job {job_id}"),
            },
            total: cli.sim_records,
            incremental_total: cli.sim_incremental,
            related_total: cli.sim_incremental,
        });
    }

    if let Some(window) = &cli.sim_latency_ms {
        let (min, max) =
            cli_convert::parse_latency_window(window).context("invalid --sim-latency-ms")?;
        service = service.with_latency(min, max);
    }

    Ok(Arc::new(service.with_timeout(config.request_timeout)))
}

/// Echo the effective configuration before the run starts.
fn print_configuration(config: &RunConfig, job_ids: &[i64]) {
    println!();
    println!("Configuration:");
    println!("  Operation:  {}", config.operation);
    println!("  Jobs:       {job_ids:?}");
    println!("  Users:      {}", config.workers);
    println!("  Iterations: {} per user", config.iterations);
    println!(
        "  Stagger:    {}..{}s",
        config.stagger.min_secs, config.stagger.max_secs
    );
    println!(
        "  Downtime:   {}..{}s",
        config.downtime.min_secs, config.downtime.max_secs
    );
    if let Some(cursor) = config.initial_cursor {
        println!("  Cursor:     {cursor}");
    }
    if let Some(ms) = config.process_ms {
        println!("  Processing: {ms}ms per record");
    }
    println!("  Timeout:    {}s", config.request_timeout.as_secs());
    if config.fail_fast {
        println!("  Fail fast:  enabled");
    }
}
