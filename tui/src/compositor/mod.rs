//! Layered Compositor
//!
//! Page content sits on one layer at z 0; every rendered overlay gets its own
//! full-viewport layer at the z-index the overlay stack assigns. Each layer
//! owns its buffer, so one overlay never draws into another.
//!
//! The compositor composites all visible layers into a final output buffer.

mod layer;

use std::collections::HashMap;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use room_core::{OverlayKey, CONTENT_Z_INDEX};

use crate::overlays::RoomStack;

pub use layer::Layer;

/// Identifier for a layer
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    /// Page content (room screen)
    Content,
    /// One rendered overlay
    Overlay(OverlayKey),
}

/// The compositor manages all layers and composites them together
pub struct Compositor {
    /// All layers by ID
    layers: HashMap<LayerId, Layer>,
    /// Layers sorted by z-index for rendering
    render_order: Vec<LayerId>,
    /// Output buffer (composited result)
    output: Buffer,
    /// Total area
    area: Rect,
}

impl Compositor {
    /// Create a compositor with an empty content layer
    pub fn new(area: Rect) -> Self {
        let mut layers = HashMap::new();
        layers.insert(
            LayerId::Content,
            Layer::new(LayerId::Content, area, CONTENT_Z_INDEX),
        );
        let mut compositor = Self {
            layers,
            render_order: Vec::new(),
            output: Buffer::empty(area),
            area,
        };
        compositor.update_render_order();
        compositor
    }

    /// Total area
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Cleared content buffer, ready for the page to draw into
    pub fn content_mut(&mut self) -> &mut Buffer {
        let area = self.area;
        let layer = self
            .layers
            .entry(LayerId::Content)
            .or_insert_with(|| Layer::new(LayerId::Content, area, CONTENT_Z_INDEX));
        layer.clear();
        &mut layer.buffer
    }

    /// Bring overlay layers in line with the rendered stack
    ///
    /// Layers for overlays that left the stack are dropped, new ones are
    /// created, and every overlay repaints its payload into its own buffer.
    /// `offset_x` shifts a layer right (used by the slide-in).
    pub fn sync_overlays(&mut self, stack: &RoomStack, offset_x: impl Fn(&OverlayKey) -> u16) {
        self.layers.retain(|id, _| match id {
            LayerId::Content => true,
            LayerId::Overlay(key) => stack.layers().iter().any(|l| &l.key == key),
        });

        for entry in stack {
            let id = LayerId::Overlay(entry.key.clone());
            let area = self.area;
            let layer = self
                .layers
                .entry(id.clone())
                .or_insert_with(|| Layer::new(id, area, entry.z_index));

            layer.z_index = entry.z_index;
            layer.bounds.x = area.x.saturating_add(offset_x(&entry.key));
            layer.bounds.y = area.y;
            layer.clear();

            let canvas = layer.buffer.area;
            entry.payload.render(canvas, &mut layer.buffer);
        }

        self.update_render_order();
    }

    /// Set layer visibility
    pub fn set_visible(&mut self, id: &LayerId, visible: bool) {
        if let Some(layer) = self.layers.get_mut(id) {
            layer.visible = visible;
        }
    }

    /// Resize the entire compositor
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.output = Buffer::empty(area);
        for layer in self.layers.values_mut() {
            layer.bounds.x = area.x;
            layer.bounds.y = area.y;
            layer.resize(area.width, area.height);
        }
    }

    /// Composite all visible layers into the output buffer
    pub fn composite(&mut self) -> &Buffer {
        // Clear output
        self.output.reset();

        // Render layers in z-order (back to front)
        for id in &self.render_order {
            if let Some(layer) = self.layers.get(id) {
                if layer.visible {
                    Self::blit_layer(&mut self.output, self.area, layer);
                }
            }
        }

        &self.output
    }

    /// Blit a layer onto the output buffer
    fn blit_layer(output: &mut Buffer, area: Rect, layer: &Layer) {
        let lb = layer.bounds;
        let right = area.x.saturating_add(area.width);
        let bottom = area.y.saturating_add(area.height);

        for ly in 0..lb.height {
            for lx in 0..lb.width {
                let dst_x = lb.x.saturating_add(lx);
                let dst_y = lb.y.saturating_add(ly);

                // Bounds check (a sliding layer hangs off the right edge)
                if dst_x >= right || dst_y >= bottom {
                    continue;
                }

                let Some(src_cell) = layer.buffer.content.get(layer.buffer.index_of(lx, ly)) else {
                    continue;
                };

                // Skipped cells are holes: whatever is below shows through
                if !src_cell.skip {
                    let dst_idx = output.index_of(dst_x, dst_y);
                    if let Some(dst) = output.content.get_mut(dst_idx) {
                        *dst = src_cell.clone();
                    }
                }
            }
        }
    }

    /// Topmost layer that draws at a given position
    pub fn layer_at(&self, x: u16, y: u16) -> Option<&LayerId> {
        // Iterate in reverse render order (front to back)
        self.render_order.iter().rev().find(|id| {
            self.layers
                .get(*id)
                .is_some_and(|layer| layer.visible && layer.is_opaque_at(x, y))
        })
    }

    /// Layers back to front with their z-index
    pub fn z_order(&self) -> Vec<(LayerId, i32)> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| (id.clone(), l.z_index)))
            .collect()
    }

    /// Update render order based on z-indices
    fn update_render_order(&mut self) {
        self.render_order = self.layers.keys().cloned().collect();
        let layers = &self.layers;
        self.render_order.sort_by_key(|id| {
            (
                layers.get(id).map_or(CONTENT_Z_INDEX, |l| l.z_index),
                id.clone(),
            )
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::style::Style;

    #[test]
    fn test_content_only() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 10, 2));
        compositor.content_mut().set_string(0, 0, "hello", Style::default());

        let out = compositor.composite();
        assert_eq!(out[(0, 0)].symbol(), "h");
        assert_eq!(compositor.z_order(), vec![(LayerId::Content, 0)]);
    }

    #[test]
    fn test_content_is_opaque_everywhere() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 4, 4));
        compositor.content_mut();
        assert_eq!(compositor.layer_at(3, 3), Some(&LayerId::Content));
        assert_eq!(compositor.layer_at(9, 9), None);
    }

    #[test]
    fn test_hidden_layer_not_drawn() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 4, 1));
        compositor.content_mut().set_string(0, 0, "abcd", Style::default());
        compositor.set_visible(&LayerId::Content, false);

        assert_eq!(compositor.composite()[(0, 0)].symbol(), " ");
        assert_eq!(compositor.layer_at(0, 0), None);
    }
}
