//! End-to-end capture pipeline tests through the public API

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use livehue::capture::{FrameProvider, SourceResolver};
use livehue::color::{ManualClock, PixelBuffer, Simulator};
use livehue::{
    BroadcastHub, CaptureConfig, CaptureError, CaptureMode, CaptureOrchestrator, Color,
    ColorSource, HubConfig,
};

/// Resolves only the references it was told about
#[derive(Default)]
struct TableResolver {
    table: HashMap<String, String>,
    calls: AtomicUsize,
}

impl TableResolver {
    fn with(mut self, reference: &str, url: &str) -> Self {
        self.table.insert(reference.to_string(), url.to_string());
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceResolver for TableResolver {
    async fn resolve(&self, reference: &str) -> Result<String, CaptureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table
            .get(reference)
            .cloned()
            .ok_or_else(|| CaptureError::Resolve(format!("cannot resolve {}", reference)))
    }
}

/// Serves a solid frame per URL
#[derive(Default)]
struct SolidProvider {
    frames: HashMap<String, Color>,
    calls: AtomicUsize,
}

impl SolidProvider {
    fn with(mut self, url: &str, color: Color) -> Self {
        self.frames.insert(url.to_string(), color);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameProvider for SolidProvider {
    async fn sample(&self, url: &str) -> Result<PixelBuffer, CaptureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.frames
            .get(url)
            .map(|color| PixelBuffer::solid(16, 9, *color))
            .ok_or_else(|| CaptureError::Extract(format!("no frame at {}", url)))
    }
}

fn sources() -> CaptureConfig {
    CaptureConfig::default().sources(["feed-a", "feed-b", "feed-c"])
}

#[tokio::test]
async fn third_candidate_supplies_live_color() {
    let resolver = Arc::new(TableResolver::default().with("feed-c", "https://cdn.example/c"));
    let provider =
        Arc::new(SolidProvider::default().with("https://cdn.example/c", Color::new(120, 130, 140)));
    let clock = Arc::new(ManualClock::new(50_000, 10));

    let orchestrator = CaptureOrchestrator::new(sources(), resolver.clone(), provider.clone())
        .with_clock(clock);

    let update = orchestrator.run_cycle().await;

    assert_eq!(update.source, ColorSource::Live);
    assert_eq!(update.color, Color::new(120, 130, 140));
    assert_eq!(update.timestamp, 50_000);
    assert_eq!(resolver.calls(), 3);
    assert_eq!(provider.calls(), 1);

    let stats = orchestrator.stats().snapshot();
    assert_eq!(stats.live, 1);
    assert_eq!(stats.resolve_failures, 2);
}

#[tokio::test]
async fn exhausted_candidates_fall_back_to_simulation() {
    let resolver = Arc::new(TableResolver::default());
    let provider = Arc::new(SolidProvider::default());
    let clock = Arc::new(ManualClock::new(7_500, 22));

    let orchestrator = CaptureOrchestrator::new(sources(), resolver.clone(), provider.clone())
        .with_clock(clock.clone());

    let update = orchestrator.run_cycle().await;

    assert_eq!(update.source, ColorSource::Simulated);
    assert_eq!(update.color, Simulator::default().current(clock.as_ref()));
    assert_eq!(resolver.calls(), 3);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn first_usable_candidate_stops_the_walk() {
    let resolver = Arc::new(
        TableResolver::default()
            .with("feed-a", "https://cdn.example/a")
            .with("feed-b", "https://cdn.example/b"),
    );
    let provider = Arc::new(
        SolidProvider::default()
            // Blank frame is rejected, the walk moves on
            .with("https://cdn.example/a", Color::new(0, 0, 0))
            .with("https://cdn.example/b", Color::new(200, 10, 10)),
    );

    let orchestrator = CaptureOrchestrator::new(sources(), resolver.clone(), provider.clone())
        .with_clock(Arc::new(ManualClock::new(1_000, 12)));

    let update = orchestrator.run_cycle().await;

    assert_eq!(update.color, Color::new(200, 10, 10));
    assert_eq!(resolver.calls(), 2);
    assert_eq!(provider.calls(), 2);
    assert_eq!(orchestrator.stats().snapshot().rejected_blank, 1);
}

#[tokio::test]
async fn simulation_mode_never_touches_sources() {
    let resolver = Arc::new(TableResolver::default().with("feed-a", "https://cdn.example/a"));
    let provider =
        Arc::new(SolidProvider::default().with("https://cdn.example/a", Color::new(9, 9, 9)));

    let orchestrator = CaptureOrchestrator::new(
        sources().mode(CaptureMode::Simulation),
        resolver.clone(),
        provider.clone(),
    );

    let update = orchestrator.run_cycle().await;

    assert!(!update.is_live());
    assert_eq!(resolver.calls(), 0);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn new_viewer_receives_color_before_first_tick() {
    let resolver = Arc::new(TableResolver::default().with("feed-a", "https://cdn.example/a"));
    let provider =
        Arc::new(SolidProvider::default().with("https://cdn.example/a", Color::new(40, 80, 160)));
    let orchestrator = CaptureOrchestrator::new(sources(), resolver, provider)
        .with_clock(Arc::new(ManualClock::new(3_000, 9)));

    let hub = Arc::new(BroadcastHub::new(
        Arc::new(orchestrator),
        HubConfig::default().tick_interval(Duration::from_secs(60)),
    ));
    hub.spawn_ticker();

    let mut viewer = hub.subscribe().await;
    let update = tokio::time::timeout(Duration::from_secs(1), viewer.recv())
        .await
        .expect("update arrives well before the first tick")
        .expect("subscription open");

    assert_eq!(update.color, Color::new(40, 80, 160));
    assert_eq!(update.source, ColorSource::Live);
    assert_eq!(hub.subscriber_count().await, 1);

    hub.shutdown().await;
    assert!(viewer.recv().await.is_none());
}
