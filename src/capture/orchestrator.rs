//! Capture orchestrator
//!
//! Walks the candidate source list once per cycle:
//!
//! ```text
//!   for candidate in sources:
//!       resolve ──✗──► next
//!       sample (deadline) ──✗──► next
//!       reduce
//!       policy accepts? ──✓──► return live
//!                       ──✗──► next
//!   return simulated
//! ```
//!
//! No candidate failure is fatal, and a cycle always produces a
//! [`ColorUpdate`]. The orchestrator holds no per-cycle mutable state, so
//! concurrent cycles (the periodic tick and on-connect pushes) are safe.

use std::sync::Arc;
use std::time::Instant;

use super::config::{CaptureConfig, CaptureMode};
use super::error::CaptureError;
use super::resolver::SourceResolver;
use super::sampler::FrameProvider;
use crate::color::{self, Clock, Color, ColorUpdate, Simulator, SystemClock, ValidityPolicy};
use crate::stats::CaptureStats;

/// Result of one candidate that produced a frame
enum Attempt {
    Accepted(Color),
    Rejected(Color),
}

/// Runs capture cycles over the configured candidate sources
pub struct CaptureOrchestrator {
    config: CaptureConfig,
    resolver: Arc<dyn SourceResolver>,
    provider: Arc<dyn FrameProvider>,
    clock: Arc<dyn Clock>,
    simulator: Simulator,
    policy: ValidityPolicy,
    stats: Arc<CaptureStats>,
}

impl CaptureOrchestrator {
    /// Create an orchestrator using the system clock and default palettes
    pub fn new(
        config: CaptureConfig,
        resolver: Arc<dyn SourceResolver>,
        provider: Arc<dyn FrameProvider>,
    ) -> Self {
        let policy = ValidityPolicy::new(config.black_threshold);
        Self {
            config,
            resolver,
            provider,
            clock: Arc::new(SystemClock),
            simulator: Simulator::default(),
            policy,
            stats: Arc::new(CaptureStats::new()),
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the fallback simulator
    pub fn with_simulator(mut self, simulator: Simulator) -> Self {
        self.simulator = simulator;
        self
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn mode(&self) -> CaptureMode {
        self.config.mode
    }

    pub fn stats(&self) -> &Arc<CaptureStats> {
        &self.stats
    }

    /// Current time on the orchestrator's clock, in epoch milliseconds
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Run one full capture cycle
    pub async fn run_cycle(&self) -> ColorUpdate {
        let started = Instant::now();
        let update = match self.config.mode {
            CaptureMode::Simulation => self.simulated(),
            CaptureMode::Live => self.walk_candidates().await,
        };

        self.stats.record_cycle(update.source, started.elapsed());
        update
    }

    /// Simulator output for the current instant
    pub fn simulated(&self) -> ColorUpdate {
        let color = self.simulator.current(self.clock.as_ref());
        ColorUpdate::simulated(color, self.clock.now_ms())
    }

    async fn walk_candidates(&self) -> ColorUpdate {
        for (index, reference) in self.config.sources.iter().enumerate() {
            match self.try_candidate(reference).await {
                Ok(Attempt::Accepted(color)) => {
                    tracing::debug!(candidate = index, color = %color, "Live color captured");
                    return ColorUpdate::live(color, self.clock.now_ms());
                }
                Ok(Attempt::Rejected(color)) => {
                    self.stats.record_rejected();
                    tracing::debug!(
                        candidate = index,
                        color = %color,
                        threshold = self.policy.threshold(),
                        "Near-black frame rejected"
                    );
                }
                Err(e) => {
                    self.stats.record_failure(&e);
                    tracing::debug!(
                        candidate = index,
                        reference = %reference,
                        kind = e.kind(),
                        error = %e,
                        "Candidate failed"
                    );
                }
            }
        }

        tracing::info!(
            candidates = self.config.sources.len(),
            "No live source usable, using simulated color"
        );
        self.simulated()
    }

    async fn try_candidate(&self, reference: &str) -> Result<Attempt, CaptureError> {
        // Hard deadlines regardless of each capability's own timeout handling
        let timeout = self.config.resolve_timeout;
        let url = tokio::time::timeout(timeout, self.resolver.resolve(reference))
            .await
            .map_err(|_| CaptureError::Timeout(timeout))??;

        let timeout = self.config.sample_timeout;
        let buffer = tokio::time::timeout(timeout, self.provider.sample(&url))
            .await
            .map_err(|_| CaptureError::Timeout(timeout))??;

        let color = color::reduce(&buffer, self.config.sampling);
        if self.policy.accepts(Some(color)) {
            Ok(Attempt::Accepted(color))
        } else {
            Ok(Attempt::Rejected(color))
        }
    }
}
