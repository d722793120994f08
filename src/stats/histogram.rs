//! Latency histograms
//!
//! Two views of the same samples:
//!
//! - [`SecondsHistogram`]: integer-second buckets (bucket key = latency
//!   rounded to the nearest whole second) for the final report's bar chart.
//! - [`LatencyHistogram`]: an HDR histogram at microsecond resolution for
//!   percentile reporting.

use hdrhistogram::Histogram;
use std::collections::BTreeMap;
use std::time::Duration;

/// Histogram with one bucket per whole second of latency.
///
/// Bucket key is the sample rounded to the nearest second; iteration order
/// is ascending by key.
#[derive(Debug, Clone, Default)]
pub struct SecondsHistogram {
    buckets: BTreeMap<u64, u64>,
}

impl SecondsHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, latency: Duration) {
        let key = (latency.as_millis() as u64 + 500) / 1000;
        *self.buckets.entry(key).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: &SecondsHistogram) {
        for (&key, &count) in &other.buckets {
            *self.buckets.entry(key).or_insert(0) += count;
        }
    }

    /// Buckets sorted ascending by second.
    pub fn buckets(&self) -> &BTreeMap<u64, u64> {
        &self.buckets
    }

    pub fn len(&self) -> u64 {
        self.buckets.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// HDR histogram wrapper for percentile reporting.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    inner: Histogram<u64>,
}

impl LatencyHistogram {
    pub fn new() -> Self {
        Self {
            // Auto-resizing, 3 significant figures, microsecond values
            inner: Histogram::new(3).expect("3 significant figures is a valid histogram config"),
        }
    }

    pub fn record(&mut self, latency: Duration) {
        let micros = (latency.as_micros() as u64).max(1);
        self.inner
            .record(micros)
            .expect("auto-resizing histogram accepts any value");
    }

    pub fn merge(&mut self, other: &LatencyHistogram) {
        self.inner
            .add(&other.inner)
            .expect("histograms share configuration");
    }

    /// Latency at `percentile` (0.0 to 100.0).
    pub fn percentile(&self, percentile: f64) -> Duration {
        Duration::from_micros(self.inner.value_at_quantile(percentile / 100.0))
    }

    pub fn len(&self) -> u64 {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_bucket_rounds_to_nearest() {
        let mut hist = SecondsHistogram::new();
        hist.record(Duration::from_millis(400)); // -> 0
        hist.record(Duration::from_millis(500)); // -> 1
        hist.record(Duration::from_millis(1499)); // -> 1
        hist.record(Duration::from_millis(2600)); // -> 3

        assert_eq!(hist.buckets().get(&0), Some(&1));
        assert_eq!(hist.buckets().get(&1), Some(&2));
        assert_eq!(hist.buckets().get(&3), Some(&1));
        assert_eq!(hist.len(), 4);
    }

    #[test]
    fn test_seconds_buckets_sorted() {
        let mut hist = SecondsHistogram::new();
        hist.record(Duration::from_secs(9));
        hist.record(Duration::from_secs(1));
        hist.record(Duration::from_secs(4));

        let keys: Vec<u64> = hist.buckets().keys().copied().collect();
        assert_eq!(keys, vec![1, 4, 9]);
    }

    #[test]
    fn test_seconds_merge() {
        let mut a = SecondsHistogram::new();
        let mut b = SecondsHistogram::new();
        a.record(Duration::from_secs(1));
        b.record(Duration::from_secs(1));
        b.record(Duration::from_secs(2));

        a.merge(&b);
        assert_eq!(a.buckets().get(&1), Some(&2));
        assert_eq!(a.buckets().get(&2), Some(&1));
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_latency_percentiles() {
        let mut hist = LatencyHistogram::new();
        for i in 1..=100 {
            hist.record(Duration::from_millis(i));
        }

        let p50 = hist.percentile(50.0);
        assert!(p50 >= Duration::from_millis(45) && p50 <= Duration::from_millis(55));

        let p99 = hist.percentile(99.0);
        assert!(p99 >= Duration::from_millis(95));
    }

    #[test]
    fn test_latency_merge() {
        let mut a = LatencyHistogram::new();
        let mut b = LatencyHistogram::new();
        a.record(Duration::from_millis(10));
        b.record(Duration::from_millis(20));

        a.merge(&b);
        assert_eq!(a.len(), 2);
    }
}
