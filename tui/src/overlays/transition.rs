//! Slide-in transition for overlays
//!
//! When an overlay becomes open its layer enters from the right edge and
//! settles over the configured duration. Closing removes it at once. State
//! is kept per key by the surface; the core knows nothing about it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use room_core::OverlayKey;

use super::RoomStack;

/// Enter transitions of the currently rendered overlays
#[derive(Debug)]
pub struct SlideIn {
    duration: Duration,
    started: HashMap<OverlayKey, Instant>,
}

impl SlideIn {
    /// Transitions lasting `duration` (zero disables them)
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: HashMap::new(),
        }
    }

    /// Start transitions for newly rendered overlays, forget closed ones
    pub fn sync(&mut self, stack: &RoomStack, now: Instant) {
        self.started
            .retain(|key, _| stack.layers().iter().any(|l| &l.key == key));
        for layer in stack {
            self.started.entry(layer.key.clone()).or_insert_with(|| {
                tracing::debug!(key = %layer.key, "Overlay entering");
                now
            });
        }
    }

    /// Horizontal offset of a layer `width` columns wide
    pub fn offset(&self, key: &OverlayKey, width: u16, now: Instant) -> u16 {
        let remaining = 1.0 - self.progress(key, now);
        // Whole columns only
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let offset = (f64::from(width) * remaining).round() as u16;
        offset.min(width)
    }

    /// Whether any overlay is still moving
    pub fn is_animating(&self, now: Instant) -> bool {
        self.started.keys().any(|key| self.progress(key, now) < 1.0)
    }

    /// Progress in `0.0..=1.0` with ease-out
    fn progress(&self, key: &OverlayKey, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let Some(started) = self.started.get(key) else {
            return 1.0;
        };
        let t = (now.saturating_duration_since(*started).as_secs_f64()
            / self.duration.as_secs_f64())
        .clamp(0.0, 1.0);
        1.0 - (1.0 - t).powi(3)
    }
}
