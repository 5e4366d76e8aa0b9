//! Live frame capture
//!
//! This module provides:
//! - Source resolution (`yt-dlp`) behind the [`SourceResolver`] trait
//! - Single-frame extraction (`ffmpeg`) behind the [`FrameProvider`] trait
//! - The scratch directory holding transient frame images
//! - The [`CaptureOrchestrator`] that ties them to the reducer, validity
//!   policy and simulator

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod resolver;
pub mod sampler;
pub mod scratch;

pub use config::{CaptureConfig, CaptureMode};
pub use error::CaptureError;
pub use orchestrator::CaptureOrchestrator;
pub use resolver::{DirectResolver, SourceResolver, YtDlpResolver};
pub use sampler::{FfmpegFrameProvider, FrameProvider};
pub use scratch::ScratchDir;
