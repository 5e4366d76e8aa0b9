//! Fallback color simulator
//!
//! Produces a time-varying color without touching any external resource. The
//! palette depends on the local hour and the entry advances at a fixed period,
//! independent of the broadcast tick, so viewers still see motion when no live
//! source is reachable.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::Timelike;

use super::Color;

/// First hour (inclusive) that uses the day palette
pub const DAY_START_HOUR: u32 = 6;
/// Last hour (inclusive) that uses the day palette
pub const DAY_END_HOUR: u32 = 18;

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;

    /// Hour of day in local time, 0-23
    fn local_hour(&self) -> u32;
}

/// Clock backed by the system time and local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn local_hour(&self) -> u32 {
        chrono::Local::now().hour()
    }
}

/// Settable clock for deterministic tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
    hour: AtomicU32,
}

impl ManualClock {
    pub fn new(now_ms: u64, hour: u32) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
            hour: AtomicU32::new(hour),
        }
    }

    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn set_hour(&self, hour: u32) {
        self.hour.store(hour, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn local_hour(&self) -> u32 {
        self.hour.load(Ordering::SeqCst)
    }
}

/// Ordered colors cycled at a fixed period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
    period_ms: u64,
}

impl Palette {
    /// Create a palette; a zero period is raised to 1 ms
    pub fn new(colors: Vec<Color>, period: Duration) -> Self {
        Self {
            colors,
            period_ms: (period.as_millis() as u64).max(1),
        }
    }

    /// Earth and sky as seen in daylight
    pub fn day() -> Self {
        Self::new(
            vec![
                Color::new(0, 100, 200),   // atmosphere
                Color::new(100, 150, 50),  // land
                Color::new(200, 200, 100), // cloud
                Color::new(255, 255, 255), // sun glare
                Color::new(50, 100, 150),  // ocean
                Color::new(150, 200, 255), // sky
            ],
            Duration::from_millis(3000),
        )
    }

    /// Space and city lights at night
    pub fn night() -> Self {
        Self::new(
            vec![
                Color::new(0, 0, 0),
                Color::new(20, 20, 40),
                Color::new(50, 50, 100),
                Color::new(100, 50, 50), // city lights
                Color::new(30, 30, 60),
                Color::new(80, 40, 80), // aurora
            ],
            Duration::from_millis(4000),
        )
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Entry index shown at `now_ms`
    pub fn index_at(&self, now_ms: u64) -> usize {
        if self.colors.is_empty() {
            return 0;
        }
        ((now_ms / self.period_ms) % self.colors.len() as u64) as usize
    }

    /// Entry shown at `now_ms`; black for an empty palette
    pub fn color_at(&self, now_ms: u64) -> Color {
        self.colors
            .get(self.index_at(now_ms))
            .copied()
            .unwrap_or(Color::BLACK)
    }
}

/// Deterministic fallback color source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulator {
    day: Palette,
    night: Palette,
}

impl Simulator {
    pub fn new(day: Palette, night: Palette) -> Self {
        Self { day, night }
    }

    /// Palette in effect at the given local hour
    pub fn palette_for(&self, hour: u32) -> &Palette {
        if (DAY_START_HOUR..=DAY_END_HOUR).contains(&hour) {
            &self.day
        } else {
            &self.night
        }
    }

    /// Color for an explicit instant and hour
    pub fn color_at(&self, now_ms: u64, hour: u32) -> Color {
        self.palette_for(hour).color_at(now_ms)
    }

    /// Color for the clock's current instant
    pub fn current(&self, clock: &dyn Clock) -> Color {
        self.color_at(clock.now_ms(), clock.local_hour())
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(Palette::day(), Palette::night())
    }
}
