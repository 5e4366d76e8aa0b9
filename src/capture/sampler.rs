//! Single-frame extraction
//!
//! [`FrameProvider`] is the capability the orchestrator depends on;
//! [`FfmpegFrameProvider`] implements it by running `ffmpeg` against the
//! resolved stream and decoding the resulting still image.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::error::CaptureError;
use super::scratch::ScratchDir;
use crate::color::{PixelBuffer, PixelFormat};

/// Extracts one decoded frame from a stream URL
#[async_trait]
pub trait FrameProvider: Send + Sync {
    async fn sample(&self, url: &str) -> Result<PixelBuffer, CaptureError>;
}

/// Frame provider backed by the `ffmpeg` command line tool
#[derive(Debug, Clone)]
pub struct FfmpegFrameProvider {
    program: String,
    scratch: ScratchDir,
    timeout: Duration,
}

impl FfmpegFrameProvider {
    pub fn new(scratch: ScratchDir, timeout: Duration) -> Self {
        Self {
            program: "ffmpeg".to_string(),
            scratch,
            timeout,
        }
    }

    /// Use a different executable
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl FrameProvider for FfmpegFrameProvider {
    async fn sample(&self, url: &str) -> Result<PixelBuffer, CaptureError> {
        // Removed when dropped, on every return path
        let frame_path = self.scratch.frame_path()?;

        let mut cmd = Command::new(&self.program);
        cmd.args(["-hide_banner", "-loglevel", "error", "-i", url])
            .args(["-vframes", "1", "-q:v", "2", "-y"])
            .arg(frame_path.as_os_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn()?;
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => return Err(CaptureError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::Extract(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.lines().last().unwrap_or("").trim()
            )));
        }

        let path = frame_path.to_path_buf();
        let buffer = tokio::task::spawn_blocking(move || decode_frame(&path))
            .await
            .map_err(|e| CaptureError::Decode(format!("decode task failed: {}", e)))??;

        tracing::trace!(
            width = buffer.width(),
            height = buffer.height(),
            "Frame extracted"
        );

        Ok(buffer)
    }
}

/// Decode an image file into an RGBA pixel buffer
///
/// The format is detected from the file contents, not its extension.
pub fn decode_frame(path: &Path) -> Result<PixelBuffer, CaptureError> {
    let image = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgba8();
    let (width, height) = image.dimensions();
    PixelBuffer::new(width, height, PixelFormat::Rgba, image.into_raw())
}
