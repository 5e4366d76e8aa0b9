//! Pixel buffer reduction
//!
//! Reduces a decoded frame to one representative color by averaging a bounded,
//! deterministic subset of its pixels.

use bytes::Bytes;

use super::Color;
use crate::capture::CaptureError;

/// Default cap on visited pixels for uniform sampling
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

/// Step between sampled pixels in center-crop mode
const CENTER_STEP: usize = 2;

/// Pixel layout of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// One decoded frame
///
/// Cheap to clone: the pixel data is reference counted.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Bytes,
}

impl PixelBuffer {
    /// Create a buffer, checking that `data` covers `width * height` pixels
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: impl Into<Bytes>,
    ) -> Result<Self, CaptureError> {
        let data = data.into();
        let needed = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() < needed {
            return Err(CaptureError::Decode(format!(
                "pixel data too short: {} bytes for {}x{} {:?}",
                data.len(),
                width,
                height,
                format
            )));
        }

        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Create a buffer filled with one color
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&[color.r, color.g, color.b, 0xFF]);
        }
        Self {
            width,
            height,
            format: PixelFormat::Rgba,
            data: Bytes::from(data),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGB of the pixel at `(x, y)`, or `None` if it lies outside the data
    fn rgb_at(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        let bpp = self.format.bytes_per_pixel();
        let offset = (y * self.width as usize + x) * bpp;
        self.data
            .get(offset..offset + 3)
            .map(|px| [px[0], px[1], px[2]])
    }
}

/// Which pixels feed the average
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// Uniform stride over the whole frame, visiting at most `max_samples` pixels
    Uniform { max_samples: usize },
    /// Square around the center with half-side `min(w, h) / 4`, every 2nd pixel on each axis
    CenterCrop,
}

impl Default for SamplingMode {
    fn default() -> Self {
        SamplingMode::Uniform {
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

/// Running per-channel sums
#[derive(Debug, Default)]
struct Accumulator {
    r: u64,
    g: u64,
    b: u64,
    count: u64,
}

impl Accumulator {
    fn add(&mut self, [r, g, b]: [u8; 3]) {
        self.r += r as u64;
        self.g += g as u64;
        self.b += b as u64;
        self.count += 1;
    }

    fn mean(&self) -> Color {
        if self.count == 0 {
            return Color::BLACK;
        }
        // Round half up
        let avg = |sum: u64| ((sum + self.count / 2) / self.count).min(255) as u8;
        Color::new(avg(self.r), avg(self.g), avg(self.b))
    }
}

/// Reduce a frame to its mean color over the sampled pixels
///
/// Returns black when no pixel is sampled.
pub fn reduce(buffer: &PixelBuffer, mode: SamplingMode) -> Color {
    let mut acc = Accumulator::default();

    match mode {
        SamplingMode::Uniform { max_samples } => sample_uniform(buffer, max_samples, &mut acc),
        SamplingMode::CenterCrop => sample_center(buffer, &mut acc),
    }

    acc.mean()
}

fn sample_uniform(buffer: &PixelBuffer, max_samples: usize, acc: &mut Accumulator) {
    let width = buffer.width as usize;
    let total = width * buffer.height as usize;
    if total == 0 || max_samples == 0 {
        return;
    }

    let stride = total.div_ceil(max_samples).max(1);
    for index in (0..total).step_by(stride) {
        if let Some(px) = buffer.rgb_at(index % width, index / width) {
            acc.add(px);
        }
    }
}

fn sample_center(buffer: &PixelBuffer, acc: &mut Accumulator) {
    let (width, height) = (buffer.width as usize, buffer.height as usize);
    let half = width.min(height) / 4;
    let (cx, cy) = (width / 2, height / 2);

    for y in (cy - half..cy + half).step_by(CENTER_STEP) {
        for x in (cx - half..cx + half).step_by(CENTER_STEP) {
            if let Some(px) = buffer.rgb_at(x, y) {
                acc.add(px);
            }
        }
    }
}
