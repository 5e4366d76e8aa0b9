//! Statistics for capture cycles

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::capture::CaptureError;
use crate::color::ColorSource;

/// Pipeline-wide counters, updated lock-free from concurrent cycles
#[derive(Debug, Default)]
pub struct CaptureStats {
    cycles: AtomicU64,
    live: AtomicU64,
    simulated: AtomicU64,
    resolve_failures: AtomicU64,
    extract_failures: AtomicU64,
    timeouts: AtomicU64,
    decode_failures: AtomicU64,
    io_failures: AtomicU64,
    rejected_blank: AtomicU64,
    last_cycle_ms: AtomicU64,
}

impl CaptureStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one finished cycle
    pub fn record_cycle(&self, source: ColorSource, elapsed: Duration) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        match source {
            ColorSource::Live => self.live.fetch_add(1, Ordering::Relaxed),
            ColorSource::Simulated => self.simulated.fetch_add(1, Ordering::Relaxed),
        };
        self.last_cycle_ms
            .store(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a failed candidate attempt
    pub fn record_failure(&self, error: &CaptureError) {
        let counter = match error {
            CaptureError::Resolve(_) => &self.resolve_failures,
            CaptureError::Extract(_) => &self.extract_failures,
            CaptureError::Timeout(_) => &self.timeouts,
            CaptureError::Decode(_) => &self.decode_failures,
            CaptureError::Io(_) => &self.io_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame that reduced to a near-black color
    pub fn record_rejected(&self) {
        self.rejected_blank.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> CaptureStatsSnapshot {
        CaptureStatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            live: self.live.load(Ordering::Relaxed),
            simulated: self.simulated.load(Ordering::Relaxed),
            resolve_failures: self.resolve_failures.load(Ordering::Relaxed),
            extract_failures: self.extract_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            io_failures: self.io_failures.load(Ordering::Relaxed),
            rejected_blank: self.rejected_blank.load(Ordering::Relaxed),
            last_cycle_ms: self.last_cycle_ms.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of [`CaptureStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaptureStatsSnapshot {
    /// Completed capture cycles
    pub cycles: u64,
    /// Cycles that produced a live color
    pub live: u64,
    /// Cycles that fell back to simulation
    pub simulated: u64,
    pub resolve_failures: u64,
    pub extract_failures: u64,
    pub timeouts: u64,
    pub decode_failures: u64,
    pub io_failures: u64,
    /// Frames discarded by the validity policy
    pub rejected_blank: u64,
    /// Duration of the most recent cycle
    pub last_cycle_ms: u64,
}

impl CaptureStatsSnapshot {
    /// Fraction of cycles that produced live data
    pub fn live_ratio(&self) -> f64 {
        if self.cycles > 0 {
            self.live as f64 / self.cycles as f64
        } else {
            0.0
        }
    }

    /// Total failed candidate attempts of any kind
    pub fn failures(&self) -> u64 {
        self.resolve_failures
            + self.extract_failures
            + self.timeouts
            + self.decode_failures
            + self.io_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let snapshot = CaptureStats::new().snapshot();
        assert_eq!(snapshot, CaptureStatsSnapshot::default());
        assert_eq!(snapshot.live_ratio(), 0.0);
    }

    #[test]
    fn test_record_cycles() {
        let stats = CaptureStats::new();
        stats.record_cycle(ColorSource::Live, Duration::from_millis(1500));
        stats.record_cycle(ColorSource::Simulated, Duration::from_millis(20));
        stats.record_cycle(ColorSource::Simulated, Duration::from_millis(40));
        stats.record_cycle(ColorSource::Live, Duration::from_millis(900));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cycles, 4);
        assert_eq!(snapshot.live, 2);
        assert_eq!(snapshot.simulated, 2);
        assert_eq!(snapshot.last_cycle_ms, 900);
        assert_eq!(snapshot.live_ratio(), 0.5);
    }

    #[test]
    fn test_record_failures_by_kind() {
        let stats = CaptureStats::new();
        stats.record_failure(&CaptureError::Resolve("x".into()));
        stats.record_failure(&CaptureError::Resolve("y".into()));
        stats.record_failure(&CaptureError::Timeout(Duration::from_secs(20)));
        stats.record_failure(&CaptureError::Decode("z".into()));
        stats.record_rejected();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.resolve_failures, 2);
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.decode_failures, 1);
        assert_eq!(snapshot.extract_failures, 0);
        assert_eq!(snapshot.rejected_blank, 1);
        assert_eq!(snapshot.failures(), 4);
    }
}
