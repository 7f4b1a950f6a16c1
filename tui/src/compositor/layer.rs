//! Layer - A single compositable layer

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::LayerId;

/// A single layer in the compositor
pub struct Layer {
    /// Unique identifier
    pub id: LayerId,
    /// Z-order (higher = in front)
    pub z_index: i32,
    /// Position and size
    pub bounds: Rect,
    /// Whether the layer is visible
    pub visible: bool,
    /// The layer's render buffer
    pub buffer: Buffer,
}

impl Layer {
    /// Create a new layer
    pub fn new(id: LayerId, bounds: Rect, z_index: i32) -> Self {
        // Buffer uses origin coordinates (0,0) internally
        // The bounds store the screen position for compositing
        let mut layer = Self {
            id,
            z_index,
            bounds,
            visible: true,
            buffer: Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height)),
        };
        layer.clear();
        layer
    }

    /// Reset the buffer to fully transparent (content is always opaque)
    pub fn clear(&mut self) {
        self.buffer.reset();
        if self.id != LayerId::Content {
            for cell in &mut self.buffer.content {
                cell.skip = true;
            }
        }
    }

    /// Resize the buffer, discarding its contents
    pub fn resize(&mut self, width: u16, height: u16) {
        self.bounds.width = width;
        self.bounds.height = height;
        self.buffer = Buffer::empty(Rect::new(0, 0, width, height));
        self.clear();
    }

    /// Check if a screen point is within this layer's bounds
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.bounds.x
            && x < self.bounds.x.saturating_add(self.bounds.width)
            && y >= self.bounds.y
            && y < self.bounds.y.saturating_add(self.bounds.height)
    }

    /// Whether the layer draws anything at a screen point
    pub fn is_opaque_at(&self, x: u16, y: u16) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        let idx = self
            .buffer
            .index_of(x - self.bounds.x, y - self.bounds.y);
        self.buffer.content.get(idx).is_some_and(|cell| !cell.skip)
    }
}
