//! Broadcast hub for color updates
//!
//! The hub owns the set of connected viewers and pushes every capture result
//! to them. Each viewer has its own bounded `mpsc` queue so that one slow
//! connection never holds up the others.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<BroadcastHub>
//!                  ┌──────────────────────────┐
//!      ticker ───► │ run_cycle() ─► broadcast │
//!   (interval)     │ subscribers: HashMap<    │
//!                  │   SubscriberId,          │
//!                  │   SubscriberEntry { tx } │
//!                  │ >                        │
//!                  └────────────┬─────────────┘
//!                               │ try_send
//!         ┌─────────────────────┼─────────────────────┐
//!         ▼                     ▼                     ▼
//!   [Subscription]        [Subscription]        [Subscription]
//!    rx.recv()             rx.recv()             rx.recv()
//!         │                     │                     │
//!         └──► WebSocket ◄──────┴─────────────────────┘
//! ```
//!
//! A new subscriber triggers its own capture cycle and receives the result
//! immediately, without waiting for the next tick.

pub mod config;
pub mod store;
pub mod subscriber;

pub use config::HubConfig;
pub use store::BroadcastHub;
pub use subscriber::{SubscriberId, Subscription};
