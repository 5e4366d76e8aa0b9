//! Server configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::capture::{CaptureConfig, CaptureMode};
use crate::color::SamplingMode;
use crate::hub::HubConfig;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Capture pipeline options
    pub capture: CaptureConfig,

    /// Broadcast hub options
    pub hub: HubConfig,

    /// WebSocket ping interval
    pub heartbeat_interval: Duration,

    /// Scratch directory for transient frame images
    pub scratch_dir: PathBuf,

    /// Directory served as static files (viewer page), if any
    pub public_dir: Option<PathBuf>,

    /// CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            capture: CaptureConfig::default(),
            hub: HubConfig::default(),
            heartbeat_interval: Duration::from_secs(30),
            scratch_dir: PathBuf::from("./temp"),
            public_dir: Some(PathBuf::from("./public")),
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Build a configuration from process environment variables
    ///
    /// Unset or malformed values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let port = parsed(&lookup, "PORT").unwrap_or(DEFAULT_PORT);
        let host = lookup("HOST")
            .and_then(|h| parse_host(&h))
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        config.bind_addr = SocketAddr::new(host, port);

        if let Some(mode) = lookup("LIVEHUE_MODE").and_then(|m| CaptureMode::parse(&m)) {
            config.capture.mode = mode;
        }
        config.hub = HubConfig::for_mode(config.capture.mode);

        if let Some(sources) = lookup("LIVEHUE_SOURCES") {
            let sources = split_list(&sources);
            if !sources.is_empty() {
                config.capture = config.capture.sources(sources);
            }
        }
        if let Some(ms) = parsed::<u64, _>(&lookup, "LIVEHUE_UPDATE_INTERVAL_MS") {
            config.hub = config.hub.tick_interval(Duration::from_millis(ms));
        }
        if let Some(ms) = parsed::<u64, _>(&lookup, "LIVEHUE_CAPTURE_TIMEOUT_MS") {
            config.capture.sample_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parsed::<u64, _>(&lookup, "LIVEHUE_RESOLVE_TIMEOUT_MS") {
            config.capture.resolve_timeout = Duration::from_millis(ms);
        }
        if let Some(threshold) = parsed::<u8, _>(&lookup, "LIVEHUE_BLACK_THRESHOLD") {
            config.capture.black_threshold = threshold;
        }
        if let Some(sampling) = lookup("LIVEHUE_SAMPLING").and_then(|s| parse_sampling(&s)) {
            config.capture.sampling = sampling;
        }
        if let Some(ms) = parsed::<u64, _>(&lookup, "LIVEHUE_HEARTBEAT_INTERVAL_MS") {
            config.heartbeat_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(dir) = lookup("LIVEHUE_SCRATCH_DIR").filter(|d| !d.trim().is_empty()) {
            config.scratch_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("LIVEHUE_PUBLIC_DIR") {
            config.public_dir = if dir.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            config.allowed_origins = split_list(&origins);
        }

        config
    }

    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set capture options
    pub fn capture(mut self, capture: CaptureConfig) -> Self {
        self.capture = capture;
        self
    }

    /// Set hub options
    pub fn hub(mut self, hub: HubConfig) -> Self {
        self.hub = hub;
        self
    }

    /// Set the WebSocket ping interval
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set the scratch directory
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Set or clear the static file directory
    pub fn public_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.public_dir = dir;
        self
    }

    /// Restrict CORS to the given origins
    pub fn allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key = key, value = %raw, "Ignoring malformed setting");
            None
        }
    }
}

fn parse_host(host: &str) -> Option<IpAddr> {
    match host.trim() {
        "localhost" => Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        other => other.parse().ok(),
    }
}

fn parse_sampling(value: &str) -> Option<SamplingMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "uniform" => Some(SamplingMode::default()),
        "center" | "centre" | "center-crop" => Some(SamplingMode::CenterCrop),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.capture.mode, CaptureMode::Live);
        assert_eq!(config.hub.tick_interval, Duration::from_secs(5));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_empty_env_matches_default() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        let default = ServerConfig::default();

        assert_eq!(config.bind_addr, default.bind_addr);
        assert_eq!(config.capture.sources, default.capture.sources);
        assert_eq!(config.hub.tick_interval, default.hub.tick_interval);
    }

    #[test]
    fn test_from_lookup_full() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("HOST", "localhost"),
            ("LIVEHUE_MODE", "live"),
            ("LIVEHUE_SOURCES", "https://a.example/1, ,https://b.example/2"),
            ("LIVEHUE_UPDATE_INTERVAL_MS", "3000"),
            ("LIVEHUE_CAPTURE_TIMEOUT_MS", "15000"),
            ("LIVEHUE_RESOLVE_TIMEOUT_MS", "9000"),
            ("LIVEHUE_BLACK_THRESHOLD", "0"),
            ("LIVEHUE_SAMPLING", "center"),
            ("LIVEHUE_HEARTBEAT_INTERVAL_MS", "10000"),
            ("LIVEHUE_SCRATCH_DIR", "/tmp/livehue"),
            ("LIVEHUE_PUBLIC_DIR", ""),
            ("ALLOWED_ORIGINS", "http://localhost:3000,https://example.com"),
        ]));

        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(
            &*config.capture.sources,
            &["https://a.example/1".to_string(), "https://b.example/2".to_string()]
        );
        assert_eq!(config.hub.tick_interval, Duration::from_secs(3));
        assert_eq!(config.capture.sample_timeout, Duration::from_secs(15));
        assert_eq!(config.capture.resolve_timeout, Duration::from_secs(9));
        assert_eq!(config.capture.black_threshold, 0);
        assert_eq!(config.capture.sampling, SamplingMode::CenterCrop);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(10));
        assert_eq!(config.scratch_dir, PathBuf::from("/tmp/livehue"));
        assert_eq!(config.public_dir, None);
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_simulation_mode_ticks_faster() {
        let config = ServerConfig::from_lookup(lookup(&[("LIVEHUE_MODE", "simulation")]));

        assert_eq!(config.capture.mode, CaptureMode::Simulation);
        assert_eq!(config.hub.tick_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_malformed_values_ignored() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "eighty"),
            ("HOST", "not-an-ip"),
            ("LIVEHUE_MODE", "replay"),
            ("LIVEHUE_BLACK_THRESHOLD", "300"),
            ("LIVEHUE_SAMPLING", "random"),
            ("LIVEHUE_SOURCES", " , "),
        ]));
        let default = ServerConfig::default();

        assert_eq!(config.bind_addr, default.bind_addr);
        assert_eq!(config.capture.mode, CaptureMode::Live);
        assert_eq!(config.capture.black_threshold, 1);
        assert_eq!(config.capture.sampling, SamplingMode::default());
        assert_eq!(config.capture.sources, default.capture.sources);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .heartbeat_interval(Duration::from_secs(5))
            .scratch_dir("/tmp/x")
            .public_dir(None)
            .allowed_origins(["https://example.com"]);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(config.scratch_dir, PathBuf::from("/tmp/x"));
        assert!(config.public_dir.is_none());
        assert_eq!(config.allowed_origins, vec!["https://example.com".to_string()]);
        assert_eq!(ServerConfig::with_addr(addr).bind_addr, addr);
    }
}
