//! Overlays in the Terminal
//!
//! The core stores overlay payloads as `Arc<P>`; here `P` is
//! `dyn OverlayView`, a panel that knows how to paint itself into its own
//! full-viewport layer.

mod transition;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use room_core::{OverlayController, OverlaySnapshot, OverlayStack};

pub use transition::SlideIn;

/// Key of the treatment panel
pub const TREATMENT_KEY: &str = "treatment";

/// Key of the leave-session dialog
pub const LEAVE_KEY: &str = "leave-session";

/// Renderable overlay content
pub trait OverlayView: Send + Sync {
    /// Short title (used in logs and the status bar)
    fn title(&self) -> &str;

    /// Paint into a transparent full-viewport buffer
    ///
    /// Cells left untouched stay transparent; widgets like `Clear` make
    /// the panel's area opaque.
    fn render(&self, area: Rect, buf: &mut Buffer);
}

/// Overlay controller for the room
pub type RoomOverlays = OverlayController<dyn OverlayView>;

/// Snapshot of the room's overlays
pub type RoomSnapshot = OverlaySnapshot<dyn OverlayView>;

/// Rendered overlay stack for the room
pub type RoomStack = OverlayStack<dyn OverlayView>;

/// Right-aligned panel area, at most `max_width` wide
pub fn side_panel(area: Rect, max_width: u16) -> Rect {
    let width = area.width.min(max_width);
    Rect::new(area.x + area.width - width, area.y, width, area.height)
}

/// Centered dialog area
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_panel_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(side_panel(area, 64), area);
        assert_eq!(side_panel(Rect::new(0, 0, 100, 10), 64), Rect::new(36, 0, 64, 10));
    }

    #[test]
    fn test_centered() {
        assert_eq!(centered(Rect::new(0, 0, 20, 10), 10, 4), Rect::new(5, 3, 10, 4));
        assert_eq!(centered(Rect::new(0, 0, 6, 2), 10, 4), Rect::new(0, 0, 6, 2));
    }
}
