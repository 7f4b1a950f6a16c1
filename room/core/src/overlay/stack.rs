//! Overlay Stack
//!
//! Turns a registry snapshot into the ordered list of layers a surface has to
//! paint: open overlays only, ascending priority, each with its own z-index.
//!
//! ```text
//!   z = base + priority      ┌──────────────────────────┐  top
//!                            │ overlay (priority 3)     │
//!                          ┌─┴────────────────────────┐ │
//!                          │ overlay (priority 1)     │─┘
//!                        ┌─┴────────────────────────┐ │
//!   z = 0                │ page content             │─┘     bottom
//!                        └──────────────────────────┘
//! ```
//!
//! Order depends on priority alone, never on the order `open` was called in.

use std::fmt;
use std::sync::Arc;

use super::entry::{OverlayKey, Priority};
use super::registry::OverlaySnapshot;

/// Z-index of ordinary page content
pub const CONTENT_Z_INDEX: i32 = 0;

/// Default offset between page content and the lowest overlay
pub const DEFAULT_OVERLAY_BASE_Z: i32 = 10;

/// Z-index of an overlay with the given priority
#[must_use]
pub fn overlay_z_index(base: i32, priority: Priority) -> i32 {
    let priority = i32::try_from(priority.get()).unwrap_or(i32::MAX);
    base.saturating_add(priority)
}

/// One full-viewport layer of the rendered stack
pub struct StackLayer<P: ?Sized> {
    /// Overlay key
    pub key: OverlayKey,
    /// Fixed priority of the overlay
    pub priority: Priority,
    /// Paint order (higher = in front)
    pub z_index: i32,
    /// Content to render in this layer
    pub payload: Arc<P>,
}

impl<P: ?Sized> Clone for StackLayer<P> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            priority: self.priority,
            z_index: self.z_index,
            payload: Arc::clone(&self.payload),
        }
    }
}

impl<P: ?Sized> fmt::Debug for StackLayer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackLayer")
            .field("key", &self.key)
            .field("priority", &self.priority)
            .field("z_index", &self.z_index)
            .finish_non_exhaustive()
    }
}

/// Open overlays in paint order (back to front)
pub struct OverlayStack<P: ?Sized> {
    layers: Vec<StackLayer<P>>,
}

impl<P: ?Sized> OverlayStack<P> {
    /// Build the stack for a snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: &OverlaySnapshot<P>, base_z: i32) -> Self {
        let mut layers: Vec<StackLayer<P>> = snapshot
            .iter()
            .filter(|entry| entry.is_open)
            .map(|entry| StackLayer {
                key: entry.key.clone(),
                priority: entry.priority,
                z_index: overlay_z_index(base_z, entry.priority),
                payload: Arc::clone(&entry.payload),
            })
            .collect();
        layers.sort_by_key(|layer| layer.priority);
        Self { layers }
    }

    /// Layers from back to front
    #[must_use]
    pub fn layers(&self) -> &[StackLayer<P>] {
        &self.layers
    }

    /// Keys from back to front
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.key.as_str()).collect()
    }

    /// Frontmost layer
    #[must_use]
    pub fn top(&self) -> Option<&StackLayer<P>> {
        self.layers.last()
    }

    /// Number of layers
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if nothing is drawn above the page content
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl<'a, P: ?Sized> IntoIterator for &'a OverlayStack<P> {
    type Item = &'a StackLayer<P>;
    type IntoIter = std::slice::Iter<'a, StackLayer<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

impl<P: ?Sized> fmt::Debug for OverlayStack<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.layers.iter()).finish()
    }
}
