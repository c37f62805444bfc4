//! Progress reporting for batch runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use tracing::info;

/// Counts finished snapshot pairs and logs `index/total` with elapsed time.
///
/// Shared by reference between rayon workers; the counter is atomic.
#[derive(Debug)]
pub struct ProgressReporter {
    start_instant: Instant,
    total: usize,
    done: AtomicUsize,
}

impl ProgressReporter {
    /// Start the clock for `total` pairs.
    pub fn new(total: usize) -> Self {
        Self {
            start_instant: Instant::now(),
            total,
            done: AtomicUsize::new(0),
        }
    }

    /// Total number of pairs.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of pairs recorded so far.
    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    /// Wall time since construction, in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_instant.elapsed().as_secs_f64()
    }

    /// Record one finished pair and log progress. Returns its 1-based index.
    pub fn record(&self, name: &str) -> usize {
        let index = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let elapsed = self.elapsed_secs();
        info!(
            "[{index}/{}] {name} | elapsed={} ({:.2} min)",
            self.total,
            format_duration(elapsed),
            elapsed / 60.0
        );
        index
    }
}

/// Format elapsed seconds for progress lines: `42.5s`, `3m07s`, `3h25m`, `2d04h`.
///
/// Sub-minute values keep one decimal; longer ones are rounded to whole
/// seconds first so a carry never shows up as `60s` or `60m`.
pub fn format_duration(secs: f64) -> String {
    if secs < 59.95 {
        return format!("{secs:.1}s");
    }
    let total = secs.round() as u64;
    let (days, hours) = (total / 86_400, total / 3600 % 24);
    let (mins, s) = (total / 60 % 60, total % 60);
    if total < 3600 {
        format!("{mins}m{s:02}s")
    } else if days == 0 {
        format!("{hours}h{mins:02}m")
    } else {
        format!("{days}d{hours:02}h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts() {
        let reporter = ProgressReporter::new(3);
        assert_eq!(reporter.record("a"), 1);
        assert_eq!(reporter.record("b"), 2);
        assert_eq!(reporter.done(), 2);
        assert_eq!(reporter.total(), 3);
        assert!(reporter.elapsed_secs() >= 0.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30.0s");
        assert_eq!(format_duration(90.0), "1m30s");
        assert_eq!(format_duration(3700.0), "1h01m");
    }

    #[test]
    fn test_format_duration_carries() {
        assert_eq!(format_duration(59.97), "1m00s");
        assert_eq!(format_duration(119.6), "2m00s");
        assert_eq!(format_duration(3599.7), "1h00m");
    }

    #[test]
    fn test_format_duration_long_batches() {
        // one region of hourly snapshots at ~4.5 s each
        assert_eq!(format_duration(3.0 * 3600.0 + 25.0 * 60.0 + 10.0), "3h25m");
        // full 3301-snapshot archive at ~55 s per pair
        assert_eq!(format_duration(3301.0 * 55.0), "2d02h");
        assert_eq!(format_duration(0.04), "0.0s");
    }
}
