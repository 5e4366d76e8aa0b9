//! Broadcast hub implementation
//!
//! Owns the subscriber set and the periodic ticker, and routes capture
//! results to subscribers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::config::HubConfig;
use super::subscriber::{Delivery, SubscriberEntry, SubscriberId, Subscription};
use crate::capture::CaptureOrchestrator;
use crate::color::ColorUpdate;

/// Fan-out point between the capture orchestrator and connected viewers
///
/// Thread-safe via `RwLock`. Broadcasting takes the read lock; only
/// connect, disconnect and pruning of closed subscribers take the write lock.
pub struct BroadcastHub {
    /// Map of subscriber ID to its sending half
    subscribers: RwLock<HashMap<SubscriberId, SubscriberEntry>>,

    next_id: AtomicU64,

    orchestrator: Arc<CaptureOrchestrator>,

    /// Most recent update from any cycle
    latest: RwLock<Option<ColorUpdate>>,

    ticker: Mutex<Option<JoinHandle<()>>>,

    closed: AtomicBool,

    config: HubConfig,
}

impl BroadcastHub {
    /// Create a hub; call [`spawn_ticker`](Self::spawn_ticker) to start periodic broadcasts
    pub fn new(orchestrator: Arc<CaptureOrchestrator>, config: HubConfig) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            orchestrator,
            latest: RwLock::new(None),
            ticker: Mutex::new(None),
            closed: AtomicBool::new(false),
            config,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &Arc<CaptureOrchestrator> {
        &self.orchestrator
    }

    /// Register a new subscriber
    ///
    /// A capture cycle is started immediately for the new subscriber alone;
    /// its result arrives without waiting for the next tick.
    pub async fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.config.subscriber_capacity);

        let count = {
            let mut subscribers = self.subscribers.write().await;
            if self.closed.load(Ordering::Acquire) {
                // Sender dropped here, so the subscription reports closed right away
                tracing::debug!(subscriber = %id, "Subscribe after shutdown");
                return Subscription::new(id, rx);
            }
            subscribers.insert(id, SubscriberEntry::new(tx));
            subscribers.len()
        };

        tracing::info!(subscriber = %id, subscribers = count, "Subscriber connected");

        let hub = Arc::clone(self);
        tokio::spawn(async move {
            let update = hub.orchestrator.run_cycle().await;
            hub.set_latest(update).await;
            hub.push_to(id, update).await;
        });

        Subscription::new(id, rx)
    }

    /// Remove a subscriber; returns false if it was already gone
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let (entry, remaining) = {
            let mut subscribers = self.subscribers.write().await;
            let entry = subscribers.remove(&id);
            (entry, subscribers.len())
        };

        match entry {
            Some(entry) => {
                tracing::info!(
                    subscriber = %id,
                    subscribers = remaining,
                    delivered = entry.delivered(),
                    connected_secs = entry.connected_at().elapsed().as_secs(),
                    "Subscriber disconnected"
                );
                true
            }
            None => false,
        }
    }

    /// Push an update to a single subscriber
    ///
    /// A no-op for unknown or disconnected subscribers. Returns whether the
    /// update was queued.
    pub async fn push_to(&self, id: SubscriberId, update: ColorUpdate) -> bool {
        let delivery = {
            let subscribers = self.subscribers.read().await;
            match subscribers.get(&id) {
                Some(entry) => entry.push(update),
                None => return false,
            }
        };

        match delivery {
            Delivery::Sent => true,
            Delivery::Lagging => {
                tracing::debug!(subscriber = %id, "Subscriber lagging, update dropped");
                false
            }
            Delivery::Closed => {
                self.unsubscribe(id).await;
                false
            }
        }
    }

    /// Push an update to every subscriber
    ///
    /// Closed subscribers are pruned. Returns the number of subscribers the
    /// update was queued for.
    pub async fn broadcast(&self, update: ColorUpdate) -> usize {
        self.set_latest(update).await;

        let mut delivered = 0;
        let mut closed = Vec::new();
        {
            let subscribers = self.subscribers.read().await;
            for (id, entry) in subscribers.iter() {
                match entry.push(update) {
                    Delivery::Sent => delivered += 1,
                    Delivery::Lagging => {
                        tracing::debug!(subscriber = %id, "Subscriber lagging, update dropped")
                    }
                    Delivery::Closed => closed.push(*id),
                }
            }
        }

        for id in closed {
            self.unsubscribe(id).await;
        }

        delivered
    }

    /// Number of connected subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Whether a subscriber is still registered
    pub async fn is_connected(&self, id: SubscriberId) -> bool {
        self.subscribers.read().await.contains_key(&id)
    }

    /// Most recent update produced by any cycle
    pub async fn latest(&self) -> Option<ColorUpdate> {
        *self.latest.read().await
    }

    /// Latest update, or a freshly captured one if no cycle has finished yet
    pub async fn latest_or_capture(&self) -> ColorUpdate {
        if let Some(update) = self.latest().await {
            return update;
        }
        let update = self.orchestrator.run_cycle().await;
        self.set_latest(update).await;
        update
    }

    async fn set_latest(&self, update: ColorUpdate) {
        let mut latest = self.latest.write().await;
        // Concurrent cycles may finish out of order; keep the newest capture
        if latest.map_or(true, |prev| prev.timestamp <= update.timestamp) {
            *latest = Some(update);
        }
    }

    /// Spawn the periodic capture-and-broadcast task
    ///
    /// The first tick fires one interval from now. Each cycle is awaited
    /// before the next tick, so periodic cycles never overlap. The task runs
    /// until [`shutdown`](Self::shutdown).
    pub fn spawn_ticker(self: &Arc<Self>) {
        let hub = Arc::clone(self);
        let period = self.config.tick_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let update = hub.orchestrator.run_cycle().await;
                let delivered = hub.broadcast(update).await;
                tracing::debug!(
                    color = %update.color,
                    source = update.source.as_str(),
                    delivered = delivered,
                    "Tick broadcast"
                );
            }
        });

        let mut ticker = self.ticker.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = ticker.replace(handle) {
            previous.abort();
        }

        tracing::info!(interval_ms = period.as_millis() as u64, "Broadcast ticker started");
    }

    /// Stop the ticker and close every subscriber channel
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);

        let handle = self
            .ticker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }

        let closed = {
            let mut subscribers = self.subscribers.write().await;
            let count = subscribers.len();
            subscribers.clear();
            count
        };

        tracing::info!(subscribers = closed, "Broadcast hub shut down");
    }
}
