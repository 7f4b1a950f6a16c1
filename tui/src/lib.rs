//! Room TUI - Terminal surface for the telehealth room
//!
//! Draws the consultation room and, for doctors, the overlay stack on top
//! of it: the treatment panel and the leave-session dialog.
//!
//! # Architecture
//!
//! - **Compositor**: content at z 0, one full-viewport layer per open overlay
//! - **Overlays**: `OverlayView` payloads for the core's overlay controller,
//!   slide-in on enter
//! - **Screens**: room content, treatment panel, leave dialog
//! - **Widgets**: borderless wrapping text blocks

pub mod app;
pub mod cli;
pub mod compositor;
pub mod logging;
pub mod overlays;
pub mod screens;
pub mod terminal;
pub mod theme;
pub mod widgets;

pub use app::{App, RoomSession};
