//! TOML run profiles
//!
//! A profile file carries the same knobs as the CLI; explicit command-line
//! arguments take precedence over profile values.
//!
//! ```toml
//! jobs = [17, 42]
//! operation = "partial"
//! users = 25
//! iterations = 10
//! stagger = "0:30"
//! downtime = "5:60"
//! cursor = "2015-08-13 17:20:00"
//! ```

use crate::config::OperationKind;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub jobs: Option<Vec<i64>>,
    pub operation: Option<OperationKind>,
    pub users: Option<usize>,
    pub iterations: Option<u32>,
    pub stagger: Option<String>,
    pub downtime: Option<String>,
    pub cursor: Option<String>,
    pub process_ms: Option<u64>,
    pub settle_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub fail_fast: Option<bool>,
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse profile {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_profile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
jobs = [17, 42]
operation = "partial"
users = 25
stagger = "0:30"
cursor = "2015-08-13 17:20:00"
"#
        )
        .unwrap();

        let profile = Profile::load(file.path()).unwrap();
        assert_eq!(profile.jobs, Some(vec![17, 42]));
        assert_eq!(profile.operation, Some(OperationKind::Partial));
        assert_eq!(profile.users, Some(25));
        assert_eq!(profile.stagger.as_deref(), Some("0:30"));
        assert!(profile.iterations.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "warp_factor = 9").unwrap();
        assert!(Profile::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(Profile::load(Path::new("/nonexistent/profile.toml")).is_err());
    }
}
