//! Configuration validation
//!
//! Every check here is fatal at startup: the run does not begin with a
//! malformed configuration.

use super::{DelayWindow, RunConfig};
use anyhow::Result;

/// Validate complete configuration
pub fn validate_config(config: &RunConfig) -> Result<()> {
    validate_window("stagger", config.stagger)?;
    validate_window("downtime", config.downtime)?;

    if config.workers == 0 {
        anyhow::bail!("at least one user is required");
    }

    if config.iterations == 0 {
        anyhow::bail!("at least one iteration per user is required");
    }

    if config.request_timeout.is_zero() {
        anyhow::bail!("request timeout must be positive");
    }

    if config.operation.needs_cursor() && config.initial_cursor.is_none() {
        anyhow::bail!(
            "{} requires an initial cursor (--cursor)",
            config.operation
        );
    }

    Ok(())
}

/// Validate delay window bounds: `0 <= min <= max`.
pub fn validate_window(name: &str, window: DelayWindow) -> Result<()> {
    if window.min_secs > window.max_secs {
        anyhow::bail!(
            "{} window minimum {} exceeds maximum {}",
            name,
            window.min_secs,
            window.max_secs
        );
    }
    Ok(())
}
