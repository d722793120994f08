//! Human-readable text output

use crate::config::RunConfig;
use crate::stats::StatsSnapshot;
use crate::util::time::format_duration;
use std::time::Duration;

/// Widest bar drawn in the latency histogram.
const HISTOGRAM_WIDTH: u64 = 50;

/// Print run results to console
///
/// Displays:
/// - Operation counts and failures
/// - Latency min/mean/max and percentiles
/// - A per-second latency histogram
pub fn print_report(snapshot: &StatsSnapshot, elapsed: Duration, config: &RunConfig) {
    println!("═══════════════════════════════════════════════════════════");
    println!("                    RUN RESULTS");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    println!("Operation:    {}", config.operation);
    println!(
        "Users:        {} x {} iterations",
        config.workers, config.iterations
    );
    println!("Elapsed Time: {:.3}s", elapsed.as_secs_f64());
    println!();

    println!("Operations:");
    println!("  Completed: {}", format_number(snapshot.count));
    if snapshot.errors > 0 {
        println!(
            "  Failed:    {} out of {} attempted",
            format_number(snapshot.errors),
            format_number(snapshot.attempted)
        );
    }
    if snapshot.records_fetched > 0 {
        println!("  Records:   {}", format_number(snapshot.records_fetched));
    }
    println!();

    println!("Latency:");
    match (snapshot.min, snapshot.mean, snapshot.max) {
        (Some(min), Some(mean), Some(max)) => {
            println!("  Min:    {}", format_duration(min));
            println!("  Mean:   {}", format_duration(mean));
            println!("  Max:    {}", format_duration(max));
            println!("  Total:  {}", format_duration(snapshot.total));
            println!();
            println!("  Percentiles:");
            for &(p, latency) in &snapshot.percentiles {
                println!("    p{:5.2}: {}", p, format_duration(latency));
            }
        }
        _ => println!("  No successful operations; latency figures unavailable"),
    }
    println!();

    if !snapshot.seconds.is_empty() {
        println!("Latency distribution (whole seconds):");
        print_histogram(snapshot);
        println!();
    }

    println!("═══════════════════════════════════════════════════════════");
}

fn print_histogram(snapshot: &StatsSnapshot) {
    let peak = snapshot.seconds.values().copied().max().unwrap_or(0);
    if peak == 0 {
        return;
    }

    for (&secs, &count) in &snapshot.seconds {
        let width = (count * HISTOGRAM_WIDTH).div_ceil(peak);
        let bar: String = std::iter::repeat('#').take(width as usize).collect();
        println!("  {:>4}s | {:<50} {}", secs, bar, format_number(count));
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let mut count = 0;

    for c in s.chars().rev() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
        count += 1;
    }

    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_print_report_handles_empty_run() {
        // Must not panic on a run with zero samples
        let snap = crate::stats::WorkerStats::new().snapshot();
        let config = RunConfig::for_test(crate::config::OperationKind::Full);
        print_report(&snap, Duration::from_secs(1), &config);
    }
}
