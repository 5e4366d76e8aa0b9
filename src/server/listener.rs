//! Color server
//!
//! Wires the capture pipeline to the broadcast hub and serves it over HTTP.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

use super::config::ServerConfig;
use super::handlers::{self, AppState};
use crate::capture::{CaptureOrchestrator, FfmpegFrameProvider, ScratchDir, YtDlpResolver};
use crate::error::{Error, Result};
use crate::hub::BroadcastHub;

/// HTTP server pushing live colors to viewers
pub struct ColorServer {
    config: ServerConfig,
    hub: Arc<BroadcastHub>,
    scratch: ScratchDir,
    started_at: Instant,
}

impl ColorServer {
    /// Create a server backed by `yt-dlp` and `ffmpeg`
    ///
    /// Fails if the scratch directory cannot be created.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let scratch = ScratchDir::create(&config.scratch_dir)?;

        let capture = &config.capture;
        let resolver = YtDlpResolver::new(capture.resolve_timeout)
            .format(capture.format_selector.clone())
            .passthrough_on_unavailable(capture.passthrough_on_unavailable);
        let provider = FfmpegFrameProvider::new(scratch.clone(), capture.sample_timeout);
        let orchestrator =
            CaptureOrchestrator::new(capture.clone(), Arc::new(resolver), Arc::new(provider));

        Ok(Self::with_orchestrator(config, orchestrator, scratch))
    }

    /// Create a server around an existing orchestrator
    pub fn with_orchestrator(
        config: ServerConfig,
        orchestrator: CaptureOrchestrator,
        scratch: ScratchDir,
    ) -> Self {
        let hub = Arc::new(BroadcastHub::new(Arc::new(orchestrator), config.hub.clone()));
        Self {
            config,
            hub,
            scratch,
            started_at: Instant::now(),
        }
    }

    /// Get a reference to the broadcast hub
    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Build the axum router
    pub fn router(&self) -> Router {
        let state = AppState {
            hub: Arc::clone(&self.hub),
            heartbeat_interval: self.config.heartbeat_interval,
            started_at: self.started_at,
        };

        let mut app = Router::new()
            .route("/ws", get(handlers::ws_upgrade))
            .route("/average-color", get(handlers::average_color))
            .route("/status", get(handlers::status))
            .route("/stats", get(handlers::stats))
            .layer(cors_layer(&self.config.allowed_origins))
            .with_state(state);

        if let Some(ref path) = self.config.public_dir {
            if path.exists() {
                tracing::info!(path = %path.display(), "Serving static files");
                app = app.fallback_service(ServeDir::new(path).append_index_html_on_directories(true));
            } else {
                tracing::warn!(path = %path.display(), "Public directory missing, static files disabled");
            }
        }

        app
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.bind_addr;
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(source) => {
                self.remove_scratch();
                return Err(Error::Bind { addr, source });
            }
        };

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// Starts the broadcast ticker, and on shutdown stops it, closes every
    /// viewer connection and removes the scratch directory.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        tracing::info!(
            addr = %local_addr,
            mode = self.hub.orchestrator().mode().as_str(),
            sources = self.config.capture.sources.len(),
            "Color server listening"
        );

        self.hub.spawn_ticker();

        // Closing the hub ends every WebSocket session, which lets the
        // graceful shutdown complete.
        let hub = Arc::clone(&self.hub);
        let signal = async move {
            shutdown.await;
            tracing::info!("Shutdown signal received");
            hub.shutdown().await;
        };

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await;

        // Covers the error path, where the signal future never ran
        self.hub.shutdown().await;
        self.remove_scratch();

        result.map_err(Error::from)
    }

    fn remove_scratch(&self) {
        if let Err(e) = self.scratch.clone().remove() {
            tracing::warn!(error = %e, "Failed to remove scratch directory");
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET])
        .allow_headers(Any)
}
