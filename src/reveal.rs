//! A one-shot visibility latch for scroll-reveal animations.
//!
//! Feed it intersection observations as a viewport reports them.  The first
//! observation that is intersecting at or above the threshold reveals the
//! element for good; after that the latch stops observing.

use std::time::Duration;

/// Fraction of the element that must be visible by default.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// A latch flipped by the first sufficiently visible observation.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealOnce {
    threshold: f64,
    delay_ms: u64,
    visible: bool,
}

impl RevealOnce {
    /// A hidden latch with the default threshold and no delay.
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            delay_ms: 0,
            visible: false,
        }
    }

    /// Set the visible fraction required to reveal, clamped to `0.0..=1.0`.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = if threshold.is_nan() {
            DEFAULT_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        self
    }

    /// Set the delay applied to the reveal transition.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Visible fraction required to reveal.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Transition delay before the element appears.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Returns true once revealed.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns true while observations still matter.
    pub fn is_observing(&self) -> bool {
        !self.visible
    }

    /// Record one observation.
    ///
    /// Returns true only for the observation that reveals the element.
    pub fn observe(&mut self, is_intersecting: bool, intersection_ratio: f64) -> bool {
        if self.visible {
            return false;
        }
        if is_intersecting && intersection_ratio >= self.threshold {
            self.visible = true;
            return true;
        }
        false
    }
}

impl Default for RevealOnce {
    fn default() -> Self {
        Self::new()
    }
}
