//! livehue: live video color capture and broadcast
//!
//! Continuously samples a frame from a live video feed, reduces it to a single
//! representative RGB value and pushes that value to every connected viewer.
//! When no live source yields a usable frame, a deterministic simulated color
//! sequence takes its place.
//!
//! # Pipeline
//!
//! ```text
//!   candidate sources ──► SourceResolver ──► FrameProvider ──► reduce()
//!          (ordered)         (yt-dlp)          (ffmpeg)           │
//!                                                                 ▼
//!                       Simulator ◄── exhausted ── ValidityPolicy
//!                           │                            │ accepted
//!                           └──────────► ColorUpdate ◄───┘
//!                                             │
//!                                       BroadcastHub
//!                                  (tick + on-connect push)
//!                                             │
//!                              ┌──────────────┼──────────────┐
//!                              ▼              ▼              ▼
//!                          [viewer]       [viewer]       [viewer]
//! ```
//!
//! # Example
//!
//! ```no_run
//! use livehue::{ColorServer, ServerConfig};
//!
//! # async fn example() -> livehue::error::Result<()> {
//! let config = ServerConfig::from_env();
//! let server = ColorServer::new(config)?;
//! server.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await
//! # }
//! ```

pub mod capture;
pub mod color;
pub mod error;
pub mod hub;
pub mod server;
pub mod stats;

pub use capture::{CaptureConfig, CaptureError, CaptureMode, CaptureOrchestrator};
pub use color::{Color, ColorSource, ColorUpdate};
pub use error::{Error, Result};
pub use hub::{BroadcastHub, HubConfig};
pub use server::{ColorServer, ServerConfig};
