//! Compositor driven by the overlay stack
//!
//! Layers follow the stack: one per open overlay, z from priority, gone as
//! soon as the overlay closes.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Clear, Widget};

use room_core::OverlayKey;
use room_tui::compositor::{Compositor, LayerId};
use room_tui::overlays::{OverlayView, RoomOverlays, RoomStack};

/// Fills a fixed rectangle with one character
struct Patch {
    area: Rect,
    fill: &'static str,
}

impl OverlayView for Patch {
    fn title(&self) -> &str {
        self.fill
    }

    fn render(&self, _area: Rect, buf: &mut Buffer) {
        Clear.render(self.area, buf);
        for y in self.area.top()..self.area.bottom() {
            for x in self.area.left()..self.area.right() {
                buf[(x, y)].set_symbol(self.fill);
            }
        }
    }
}

fn patch(x: u16, fill: &'static str) -> Arc<Patch> {
    Arc::new(Patch {
        area: Rect::new(x, 0, 4, 2),
        fill,
    })
}

fn overlay(key: &str) -> LayerId {
    LayerId::Overlay(OverlayKey::new(key))
}

fn row(buf: &Buffer, y: u16) -> String {
    (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect()
}

fn sync(compositor: &mut Compositor, overlays: &RoomOverlays) {
    let stack = RoomStack::from_snapshot(&overlays.snapshot(), 10);
    compositor.sync_overlays(&stack, |_| 0);
}

fn setup() -> (Compositor, RoomOverlays) {
    let mut compositor = Compositor::new(Rect::new(0, 0, 10, 2));
    compositor
        .content_mut()
        .set_string(0, 0, "..........", Style::default());

    let overlays = RoomOverlays::new();
    overlays.register("low", patch(0, "a"));
    overlays.register("high", patch(2, "b"));
    (compositor, overlays)
}

#[test]
fn test_layers_follow_priority_not_open_order() {
    let (mut compositor, overlays) = setup();
    overlays.open("high");
    overlays.open("low");
    sync(&mut compositor, &overlays);

    assert_eq!(
        compositor.z_order(),
        vec![(LayerId::Content, 0), (overlay("low"), 11), (overlay("high"), 12)]
    );
    assert_eq!(row(compositor.composite(), 0), "aabbbb....");
    assert_eq!(compositor.layer_at(3, 0), Some(&overlay("high")));
    assert_eq!(compositor.layer_at(0, 0), Some(&overlay("low")));
}

#[test]
fn test_transparent_cells_show_content() {
    let (mut compositor, overlays) = setup();
    overlays.open("low");
    sync(&mut compositor, &overlays);

    assert_eq!(row(compositor.composite(), 0), "aaaa......");
    assert_eq!(compositor.layer_at(8, 0), Some(&LayerId::Content));
}

#[test]
fn test_closed_overlay_layer_removed() {
    let (mut compositor, overlays) = setup();
    overlays.open("low");
    overlays.open("high");
    sync(&mut compositor, &overlays);

    overlays.close("low");
    sync(&mut compositor, &overlays);

    assert_eq!(
        compositor.z_order(),
        vec![(LayerId::Content, 0), (overlay("high"), 12)]
    );
    assert_eq!(row(compositor.composite(), 0), "..bbbb....");
}

#[test]
fn test_payload_update_repaints_same_layer() {
    let (mut compositor, overlays) = setup();
    overlays.open("low");
    sync(&mut compositor, &overlays);

    overlays.register("low", patch(0, "z"));
    sync(&mut compositor, &overlays);

    assert_eq!(row(compositor.composite(), 0), "zzzz......");
    assert_eq!(compositor.z_order().len(), 2);
}

#[test]
fn test_offset_slides_layer_and_clips() {
    let (mut compositor, overlays) = setup();
    overlays.open("high");
    let stack = RoomStack::from_snapshot(&overlays.snapshot(), 10);
    compositor.sync_overlays(&stack, |_| 5);

    // Patch at x 2..6 shifted by 5 hangs off the right edge
    assert_eq!(row(compositor.composite(), 0), ".......bbb");
}

#[test]
fn test_destroy_all_clears_layers() {
    let (mut compositor, overlays) = setup();
    overlays.open("low");
    overlays.open("high");
    sync(&mut compositor, &overlays);

    overlays.destroy_all();
    sync(&mut compositor, &overlays);

    assert_eq!(compositor.z_order(), vec![(LayerId::Content, 0)]);
    assert_eq!(row(compositor.composite(), 0), "..........");
}
