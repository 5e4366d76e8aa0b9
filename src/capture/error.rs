//! Capture error types
//!
//! Every variant is non-fatal: the orchestrator logs it and moves on to the
//! next candidate source.

use std::time::Duration;

/// Error type for a single capture attempt
#[derive(Debug)]
pub enum CaptureError {
    /// Candidate could not be resolved to a playable URL
    Resolve(String),
    /// Frame extraction process failed
    Extract(String),
    /// Operation exceeded its deadline
    Timeout(Duration),
    /// Extracted frame could not be decoded
    Decode(String),
    /// Filesystem or process spawn failure
    Io(std::io::Error),
}

impl CaptureError {
    /// Short label for logs and stats
    pub fn kind(&self) -> &'static str {
        match self {
            CaptureError::Resolve(_) => "resolve",
            CaptureError::Extract(_) => "extract",
            CaptureError::Timeout(_) => "timeout",
            CaptureError::Decode(_) => "decode",
            CaptureError::Io(_) => "io",
        }
    }
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::Resolve(msg) => write!(f, "Resolution failed: {}", msg),
            CaptureError::Extract(msg) => write!(f, "Frame extraction failed: {}", msg),
            CaptureError::Timeout(after) => write!(f, "Timed out after {:?}", after),
            CaptureError::Decode(msg) => write!(f, "Frame decode failed: {}", msg),
            CaptureError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(e: std::io::Error) -> Self {
        CaptureError::Io(e)
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(e: image::ImageError) -> Self {
        CaptureError::Decode(e.to_string())
    }
}
