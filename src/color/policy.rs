//! Capture validity policy
//!
//! A stream that has not finished loading decodes to a black placeholder
//! frame. Such a frame is well-formed but says nothing about the feed, so
//! near-black results are treated as failed captures.

use super::Color;

/// Default near-black threshold; a channel must exceed it to count
pub const DEFAULT_BLACK_THRESHOLD: u8 = 1;

/// Decides whether a reduced color may be broadcast as live data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityPolicy {
    threshold: u8,
}

impl ValidityPolicy {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// A color is usable when present and at least one channel exceeds the threshold
    pub fn accepts(&self, color: Option<Color>) -> bool {
        match color {
            Some(c) => c.r > self.threshold || c.g > self.threshold || c.b > self.threshold,
            None => false,
        }
    }
}

impl Default for ValidityPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BLACK_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = ValidityPolicy::default();

        assert!(!policy.accepts(None));
        assert!(!policy.accepts(Some(Color::new(0, 0, 0))));
        assert!(!policy.accepts(Some(Color::new(1, 1, 1))));
        assert!(policy.accepts(Some(Color::new(2, 0, 0))));
        assert!(policy.accepts(Some(Color::new(0, 0, 2))));
    }

    #[test]
    fn test_zero_threshold() {
        let policy = ValidityPolicy::new(0);

        assert!(!policy.accepts(Some(Color::BLACK)));
        assert!(policy.accepts(Some(Color::new(0, 1, 0))));
    }

    #[test]
    fn test_max_threshold_rejects_everything() {
        let policy = ValidityPolicy::new(255);
        assert!(!policy.accepts(Some(Color::new(255, 255, 255))));
    }
}
