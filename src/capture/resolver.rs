//! Source resolution
//!
//! Turns a candidate reference (typically a video page URL) into a direct,
//! short-lived stream URL that the frame sampler can open.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::config::DEFAULT_FORMAT_SELECTOR;
use super::error::CaptureError;

/// Resolves a candidate reference to a playable stream URL
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Resolve one reference. Failures are returned, never raised.
    async fn resolve(&self, reference: &str) -> Result<String, CaptureError>;
}

/// Resolver backed by the `yt-dlp` command line tool
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    program: String,
    format: String,
    timeout: Duration,
    passthrough_on_unavailable: bool,
}

impl YtDlpResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "yt-dlp".to_string(),
            format: DEFAULT_FORMAT_SELECTOR.to_string(),
            timeout,
            passthrough_on_unavailable: true,
        }
    }

    /// Use a different executable
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the `--format` selector
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Return the raw reference when the executable cannot be spawned
    pub fn passthrough_on_unavailable(mut self, enabled: bool) -> Self {
        self.passthrough_on_unavailable = enabled;
        self
    }
}

#[async_trait]
impl SourceResolver for YtDlpResolver {
    async fn resolve(&self, reference: &str) -> Result<String, CaptureError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--get-url", "--format", &self.format, reference])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound && self.passthrough_on_unavailable => {
                tracing::warn!(
                    program = %self.program,
                    reference = %reference,
                    "Resolver unavailable, passing reference through"
                );
                return Ok(reference.to_string());
            }
            Err(e) => return Err(CaptureError::Io(e)),
        };

        // Dropping the wait future on timeout kills the child
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => return Err(CaptureError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::Resolve(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.lines().next().unwrap_or("").trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_stream_url(&stdout)
            .ok_or_else(|| CaptureError::Resolve(format!("no stream URL in output for {}", reference)))
    }
}

/// Resolver that hands every reference back unchanged
///
/// For candidate lists that already hold direct stream URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectResolver;

#[async_trait]
impl SourceResolver for DirectResolver {
    async fn resolve(&self, reference: &str) -> Result<String, CaptureError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(CaptureError::Resolve("empty reference".to_string()));
        }
        Ok(reference.to_string())
    }
}

/// First non-empty output line, if it looks like an http(s) URL
pub fn parse_stream_url(output: &str) -> Option<String> {
    let line = output.lines().map(str::trim).find(|l| !l.is_empty())?;
    let rest = line
        .strip_prefix("https://")
        .or_else(|| line.strip_prefix("http://"))?;

    if rest.is_empty() || line.contains(char::is_whitespace) {
        return None;
    }
    Some(line.to_string())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Instant;

    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    /// Write an executable shell script standing in for `yt-dlp`
    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-resolver.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_parse_single_url() {
        let out = "https://rr1.example.com/videoplayback?id=1&itag=160\n";
        assert_eq!(
            parse_stream_url(out).as_deref(),
            Some("https://rr1.example.com/videoplayback?id=1&itag=160")
        );
    }

    #[test]
    fn test_parse_takes_first_of_several() {
        let out = "\n  http://a.example/v.m3u8  \nhttps://b.example/a.m3u8\n";
        assert_eq!(parse_stream_url(out).as_deref(), Some("http://a.example/v.m3u8"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_stream_url(""), None);
        assert_eq!(parse_stream_url("   \n\n"), None);
        assert_eq!(parse_stream_url("ERROR: video unavailable"), None);
        assert_eq!(parse_stream_url("https://"), None);
        assert_eq!(parse_stream_url("ftp://example.com/x"), None);
        assert_eq!(parse_stream_url("https://a.example/x y"), None);
    }

    #[tokio::test]
    async fn test_missing_binary_passthrough() {
        let resolver = YtDlpResolver::new(Duration::from_secs(1))
            .program("livehue-definitely-not-installed");

        let url = assert_ok!(resolver.resolve("https://example.com/watch?v=1").await);
        assert_eq!(url, "https://example.com/watch?v=1");
    }

    #[tokio::test]
    async fn test_missing_binary_without_passthrough() {
        let resolver = YtDlpResolver::new(Duration::from_secs(1))
            .program("livehue-definitely-not-installed")
            .passthrough_on_unavailable(false);

        let err = assert_err!(resolver.resolve("https://example.com/watch?v=1").await);
        assert!(matches!(err, CaptureError::Io(_)));
    }

    #[tokio::test]
    async fn test_direct_resolver() {
        let resolver = DirectResolver;

        assert_eq!(
            assert_ok!(resolver.resolve(" https://cdn.example/live.m3u8 ").await),
            "https://cdn.example/live.m3u8"
        );
        assert!(matches!(
            resolver.resolve("  ").await,
            Err(CaptureError::Resolve(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_resolve_error() {
        let resolver = YtDlpResolver::new(Duration::from_secs(5)).program("false");

        let err = assert_err!(resolver.resolve("https://example.com/watch?v=1").await);
        assert!(matches!(err, CaptureError::Resolve(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_without_url_is_resolve_error() {
        // echo prints its arguments, none of which is a stream URL
        let resolver = YtDlpResolver::new(Duration::from_secs(5)).program("echo");

        let err = assert_err!(resolver.resolve("x").await);
        assert!(matches!(err, CaptureError::Resolve(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_url_output_is_returned() {
        let dir = TempDir::new().unwrap();
        let program = script(dir.path(), "echo https://cdn.example/live.m3u8");
        let resolver = YtDlpResolver::new(Duration::from_secs(5)).program(program.to_string_lossy());

        let url = assert_ok!(resolver.resolve("https://example.com/watch?v=1").await);
        assert_eq!(url, "https://cdn.example/live.m3u8");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_resolver_is_killed_at_deadline() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("finished");
        let program = script(
            dir.path(),
            &format!("sleep 1\ntouch '{}'", marker.display()),
        );
        let resolver =
            YtDlpResolver::new(Duration::from_millis(200)).program(program.to_string_lossy());

        let started = Instant::now();
        let err = assert_err!(resolver.resolve("https://example.com/watch?v=1").await);
        assert!(matches!(err, CaptureError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(1));

        // A surviving child would have created the marker by now
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }
}
