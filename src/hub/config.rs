//! Broadcast hub configuration

use std::time::Duration;

use crate::capture::CaptureMode;

/// Broadcast hub options
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Interval between periodic capture-and-broadcast cycles
    pub tick_interval: Duration,

    /// Per-subscriber queue depth; updates beyond it are dropped for that subscriber
    pub subscriber_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self::for_mode(CaptureMode::Live)
    }
}

impl HubConfig {
    /// Defaults suited to a capture mode: live capture is slow, so it ticks less often
    pub fn for_mode(mode: CaptureMode) -> Self {
        let tick_interval = match mode {
            CaptureMode::Live => Duration::from_secs(5),
            CaptureMode::Simulation => Duration::from_secs(2),
        };
        Self {
            tick_interval,
            subscriber_capacity: 4,
        }
    }

    /// Set the tick interval; zero is raised to 1 ms
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set the per-subscriber queue depth (minimum 1)
    pub fn subscriber_capacity(mut self, capacity: usize) -> Self {
        self.subscriber_capacity = capacity.max(1);
        self
    }
}
