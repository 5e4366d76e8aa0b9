//! HTTP and WebSocket handlers
//!
//! - `GET /ws`            live color updates (JSON text frames)
//! - `GET /average-color` latest color, captured on demand if none yet
//! - `GET /status`        server status and connected viewer count
//! - `GET /stats`         capture pipeline counters

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::{IntoResponse, Json};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

use crate::capture::CaptureMode;
use crate::color::ColorUpdate;
use crate::hub::BroadcastHub;
use crate::stats::CaptureStatsSnapshot;

/// Shared state for all handlers
#[derive(Clone)]
pub(super) struct AppState {
    pub(super) hub: Arc<BroadcastHub>,
    pub(super) heartbeat_interval: Duration,
    pub(super) started_at: Instant,
}

impl AppState {
    fn mode(&self) -> CaptureMode {
        self.hub.orchestrator().mode()
    }
}

/// Body of `GET /status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub mode: String,
    pub clients: usize,
    /// Response time in epoch milliseconds, on the capture clock
    pub timestamp: u64,
}

/// Body of `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub capture: CaptureStatsSnapshot,
    pub clients: usize,
    pub uptime_secs: u64,
    pub latest: Option<ColorUpdate>,
}

/// WebSocket upgrade handler
pub(super) async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// GET /average-color
pub(super) async fn average_color(State(state): State<AppState>) -> Json<ColorUpdate> {
    Json(state.hub.latest_or_capture().await)
}

/// GET /status
pub(super) async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "running".to_string(),
        mode: state.mode().as_str().to_string(),
        clients: state.hub.subscriber_count().await,
        timestamp: state.hub.orchestrator().now_ms(),
    })
}

/// GET /stats
pub(super) async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        capture: state.hub.orchestrator().stats().snapshot(),
        clients: state.hub.subscriber_count().await,
        uptime_secs: state.started_at.elapsed().as_secs(),
        latest: state.hub.latest().await,
    })
}

/// Handle a single viewer connection
///
/// Registers a hub subscriber for the lifetime of the socket and forwards
/// each update as a JSON text frame. Pings keep intermediaries from timing
/// the connection out.
async fn handle_ws(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subscription = state.hub.subscribe().await;
    let id = subscription.id();

    let period = state.heartbeat_interval;
    let mut heartbeat = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

    loop {
        tokio::select! {
            update = subscription.recv() => {
                // None: the hub dropped us (shutdown)
                let Some(update) = update else { break };
                let text = match serde_json::to_string(&update) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(subscriber = %id, error = %e, "Failed to encode update");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            _ = heartbeat.tick() => {
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(subscriber = %id, error = %e, "WebSocket read error");
                        break;
                    }
                    _ => {} // Pongs and client chatter are ignored
                }
            }
        }
    }

    state.hub.unsubscribe(id).await;
    let _ = ws_tx.close().await;
}
