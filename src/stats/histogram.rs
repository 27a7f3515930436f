//! Interval histogram using HdrHistogram
//!
//! Records the waits the traffic generator actually scheduled between
//! queries, so a run report can show how the sampled cadence looked
//! (mean, percentiles) next to the hit rate it produced.
//!
//! # Example
//!
//! ```
//! use cachepulse::stats::histogram::IntervalHistogram;
//! use std::time::Duration;
//!
//! let mut hist = IntervalHistogram::new();
//! hist.record(Duration::from_millis(100));
//! hist.record(Duration::from_millis(900));
//!
//! assert_eq!(hist.len(), 2);
//! let p50 = hist.percentile(50.0);
//! ```

use hdrhistogram::Histogram;
use std::time::Duration;

/// Upper bound of recordable waits: 1 hour in microseconds
const MAX_MICROS: u64 = 3_600_000_000;

/// Wait-time histogram with microsecond resolution
///
/// Tracks values from 1µs to 1 hour with 3 significant digits. Zero waits
/// are counted separately since HdrHistogram's lowest bucket starts at 1.
#[derive(Debug, Clone)]
pub struct IntervalHistogram {
    histogram: Histogram<u64>,
    zero_waits: u64,
    total: Duration,
}

impl IntervalHistogram {
    pub fn new() -> Self {
        let histogram = Histogram::new_with_bounds(1, MAX_MICROS, 3)
            .expect("Failed to create histogram with valid bounds");

        Self {
            histogram,
            zero_waits: 0,
            total: Duration::ZERO,
        }
    }

    /// Record one scheduled wait
    ///
    /// Values above one hour are clamped.
    #[inline]
    pub fn record(&mut self, wait: Duration) {
        self.total = self.total.saturating_add(wait);
        let micros = wait.as_micros().min(MAX_MICROS as u128) as u64;
        if micros == 0 {
            self.zero_waits += 1;
            return;
        }
        let _ = self.histogram.record(micros);
    }

    /// Number of waits recorded (including zero-length ones)
    pub fn len(&self) -> u64 {
        self.histogram.len() + self.zero_waits
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all recorded waits (unclamped)
    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn mean(&self) -> Option<Duration> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        Some(Duration::from_nanos((self.total.as_nanos() / n as u128) as u64))
    }

    pub fn min(&self) -> Option<Duration> {
        if self.zero_waits > 0 {
            return Some(Duration::ZERO);
        }
        if self.histogram.is_empty() {
            return None;
        }
        Some(Duration::from_micros(self.histogram.min()))
    }

    pub fn max(&self) -> Option<Duration> {
        if self.histogram.is_empty() {
            return if self.zero_waits > 0 { Some(Duration::ZERO) } else { None };
        }
        Some(Duration::from_micros(self.histogram.max()))
    }

    /// Wait at the given percentile (0.0 - 100.0)
    pub fn percentile(&self, percentile: f64) -> Option<Duration> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        // Zero waits occupy the bottom of the distribution
        let zero_share = self.zero_waits as f64 / n as f64 * 100.0;
        if percentile <= zero_share || self.histogram.is_empty() {
            return Some(Duration::ZERO);
        }
        let adjusted = (percentile - zero_share) / (100.0 - zero_share) * 100.0;
        Some(Duration::from_micros(self.histogram.value_at_percentile(adjusted.min(100.0))))
    }

    pub fn reset(&mut self) {
        self.histogram.reset();
        self.zero_waits = 0;
        self.total = Duration::ZERO;
    }
}

impl Default for IntervalHistogram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_histogram() {
        let hist = IntervalHistogram::new();
        assert!(hist.is_empty());
        assert!(hist.mean().is_none());
        assert!(hist.percentile(50.0).is_none());
    }

    #[test]
    fn test_percentile() {
        let mut hist = IntervalHistogram::new();
        for i in 1..=100 {
            hist.record(Duration::from_millis(i * 10));
        }

        let p50 = hist.percentile(50.0).unwrap();
        let p99 = hist.percentile(99.0).unwrap();

        assert!(p50.as_millis() >= 490 && p50.as_millis() <= 510);
        assert!(p99.as_millis() >= 980 && p99.as_millis() <= 1000);
    }

    #[test]
    fn test_mean_and_total() {
        let mut hist = IntervalHistogram::new();
        hist.record(Duration::from_millis(100));
        hist.record(Duration::from_millis(200));
        hist.record(Duration::from_millis(300));

        assert_eq!(hist.total(), Duration::from_millis(600));
        assert_eq!(hist.mean(), Some(Duration::from_millis(200)));
    }

    #[test]
    fn test_mean_over_many_waits() {
        let mut hist = IntervalHistogram::new();
        hist.record(Duration::from_nanos(1));
        hist.record(Duration::from_nanos(2));
        assert_eq!(hist.mean(), Some(Duration::from_nanos(1)));

        // The divisor is never narrowed, so large counts stay exact
        hist.zero_waits = 1u64 << 32;
        assert_eq!(hist.len(), (1u64 << 32) + 2);
        assert_eq!(hist.mean(), Some(Duration::ZERO));
    }

    #[test]
    fn test_total_saturates() {
        let mut hist = IntervalHistogram::new();
        hist.record(Duration::MAX);
        hist.record(Duration::from_secs(1));
        assert_eq!(hist.total(), Duration::MAX);
        assert_eq!(hist.len(), 2);
    }

    #[test]
    fn test_zero_waits_counted() {
        let mut hist = IntervalHistogram::new();
        hist.record(Duration::ZERO);
        hist.record(Duration::ZERO);
        hist.record(Duration::from_millis(10));

        assert_eq!(hist.len(), 3);
        assert_eq!(hist.min(), Some(Duration::ZERO));
        assert_eq!(hist.percentile(50.0), Some(Duration::ZERO));
        let max = hist.max().unwrap();
        assert!(max.as_micros() >= 9_990 && max.as_micros() <= 10_010);
    }

    #[test]
    fn test_only_zero_waits() {
        let mut hist = IntervalHistogram::new();
        hist.record(Duration::ZERO);
        assert_eq!(hist.max(), Some(Duration::ZERO));
        assert_eq!(hist.percentile(99.0), Some(Duration::ZERO));
    }

    #[test]
    fn test_reset() {
        let mut hist = IntervalHistogram::new();
        hist.record(Duration::from_millis(5));
        hist.record(Duration::ZERO);
        hist.reset();
        assert!(hist.is_empty());
        assert_eq!(hist.total(), Duration::ZERO);
    }
}
