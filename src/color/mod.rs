//! Color values and the pure stages of the pipeline
//!
//! This module provides:
//! - [`Color`] and [`ColorUpdate`], the values pushed to viewers
//! - Pixel buffer reduction to a single color
//! - The validity policy that rejects blank captures
//! - The time-driven fallback simulator

pub mod policy;
pub mod reducer;
pub mod simulator;

use serde::{Deserialize, Serialize};

pub use policy::ValidityPolicy;
pub use reducer::{reduce, PixelBuffer, PixelFormat, SamplingMode};
pub use simulator::{Clock, ManualClock, Palette, Simulator, SystemClock};

/// An RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Pure black
    pub const BLACK: Color = Color::new(0, 0, 0);

    /// Create a color from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Where a color came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSource {
    /// Reduced from a frame of a live source
    Live,
    /// Computed by the simulator after every candidate failed
    Simulated,
}

impl ColorSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorSource::Live => "live",
            ColorSource::Simulated => "simulated",
        }
    }
}

/// A color tagged with its capture instant and origin
///
/// Serializes flat, as viewers expect: `{"r":..,"g":..,"b":..,"timestamp":..,"source":".."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorUpdate {
    #[serde(flatten)]
    pub color: Color,
    /// Capture instant in epoch milliseconds
    pub timestamp: u64,
    pub source: ColorSource,
}

impl ColorUpdate {
    pub fn live(color: Color, timestamp: u64) -> Self {
        Self {
            color,
            timestamp,
            source: ColorSource::Live,
        }
    }

    pub fn simulated(color: Color, timestamp: u64) -> Self {
        Self {
            color,
            timestamp,
            source: ColorSource::Simulated,
        }
    }

    pub fn is_live(&self) -> bool {
        self.source == ColorSource::Live
    }
}
