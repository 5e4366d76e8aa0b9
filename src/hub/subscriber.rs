//! Subscriber handles
//!
//! The hub keeps a [`SubscriberEntry`] (the sending half) per connected
//! viewer; the connection task owns the matching [`Subscription`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::color::ColorUpdate;

/// Unique identifier for a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(super) u64);

impl SubscriberId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Outcome of pushing one update to one subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Delivery {
    Sent,
    /// Queue full; this update is dropped for the subscriber
    Lagging,
    /// Receiving half is gone
    Closed,
}

/// Hub-side state for one subscriber
#[derive(Debug)]
pub(super) struct SubscriberEntry {
    tx: mpsc::Sender<ColorUpdate>,
    connected_at: Instant,
    delivered: AtomicU64,
}

impl SubscriberEntry {
    pub(super) fn new(tx: mpsc::Sender<ColorUpdate>) -> Self {
        Self {
            tx,
            connected_at: Instant::now(),
            delivered: AtomicU64::new(0),
        }
    }

    /// Non-blocking push; never waits on a slow viewer
    pub(super) fn push(&self, update: ColorUpdate) -> Delivery {
        match self.tx.try_send(update) {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                Delivery::Sent
            }
            Err(TrySendError::Full(_)) => Delivery::Lagging,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    pub(super) fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub(super) fn connected_at(&self) -> Instant {
        self.connected_at
    }
}

/// Receiving end held by a connection
///
/// `recv` yields `None` once the hub has dropped this subscriber (on
/// unsubscribe or shutdown).
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<ColorUpdate>,
}

impl Subscription {
    pub(super) fn new(id: SubscriberId, rx: mpsc::Receiver<ColorUpdate>) -> Self {
        Self { id, rx }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next update
    pub async fn recv(&mut self) -> Option<ColorUpdate> {
        self.rx.recv().await
    }

    /// Take an already queued update, if any
    pub fn try_recv(&mut self) -> Option<ColorUpdate> {
        self.rx.try_recv().ok()
    }
}
