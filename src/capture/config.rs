//! Capture configuration

use std::sync::Arc;
use std::time::Duration;

use crate::color::policy::DEFAULT_BLACK_THRESHOLD;
use crate::color::SamplingMode;

/// Default live source tried when none is configured
pub const DEFAULT_SOURCE: &str = "https://www.youtube.com/watch?v=fO9e9jnhYK8";

/// Default yt-dlp format selector; small renditions are plenty for one averaged frame
pub const DEFAULT_FORMAT_SELECTOR: &str = "worst[height<=480]";

/// Whether capture cycles attempt live sources at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Walk the candidate list, falling back to simulation
    Live,
    /// Never spawn external tools; always simulate
    Simulation,
}

impl CaptureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Live => "live",
            CaptureMode::Simulation => "simulation",
        }
    }

    /// Parse `live` / `simulation` (also `sim`), case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "live" => Some(CaptureMode::Live),
            "simulation" | "sim" | "simulated" => Some(CaptureMode::Simulation),
            _ => None,
        }
    }
}

/// Capture pipeline options
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Live or simulation-only
    pub mode: CaptureMode,

    /// Candidate source references, tried in order every cycle
    pub sources: Arc<[String]>,

    /// Deadline for resolving one candidate
    pub resolve_timeout: Duration,

    /// Hard deadline for extracting one frame
    pub sample_timeout: Duration,

    /// Pixel sampling strategy for the reducer
    pub sampling: SamplingMode,

    /// Near-black threshold for the validity policy
    pub black_threshold: u8,

    /// Pass the raw reference through when the resolver binary is missing
    pub passthrough_on_unavailable: bool,

    /// Format selector handed to the resolver
    pub format_selector: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Live,
            sources: Arc::from(vec![DEFAULT_SOURCE.to_string()]),
            resolve_timeout: Duration::from_secs(15),
            sample_timeout: Duration::from_secs(20),
            sampling: SamplingMode::default(),
            black_threshold: DEFAULT_BLACK_THRESHOLD,
            passthrough_on_unavailable: true,
            format_selector: DEFAULT_FORMAT_SELECTOR.to_string(),
        }
    }
}

impl CaptureConfig {
    /// Set the capture mode
    pub fn mode(mut self, mode: CaptureMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the candidate list
    pub fn sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Set the resolve deadline
    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// Set the frame extraction deadline
    pub fn sample_timeout(mut self, timeout: Duration) -> Self {
        self.sample_timeout = timeout;
        self
    }

    /// Set the sampling strategy
    pub fn sampling(mut self, sampling: SamplingMode) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the near-black threshold
    pub fn black_threshold(mut self, threshold: u8) -> Self {
        self.black_threshold = threshold;
        self
    }

    /// Disable passing raw references through when the resolver is missing
    pub fn disable_passthrough(mut self) -> Self {
        self.passthrough_on_unavailable = false;
        self
    }
}
