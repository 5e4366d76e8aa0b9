//! Capture pipeline statistics

pub mod metrics;

pub use metrics::{CaptureStats, CaptureStatsSnapshot};
