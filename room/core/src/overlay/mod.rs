//! Overlay Stack Manager
//!
//! A session-wide registry of named overlay surfaces (panels, dialogs) that
//! independent screens can register, open and close without knowing about
//! each other.
//!
//! # Architecture
//!
//! ```text
//!   Screens ──register/open/close──▶ OverlayController ──(sole writer)──┐
//!                                                                       │
//!                                               watch::Sender<OverlaySnapshot>
//!                                                                       │
//!   Surface ◀──OverlayStack::from_snapshot── watch::Receiver ◀──────────┘
//! ```
//!
//! - [`OverlaySnapshot`]: immutable, copy-on-write view of every entry
//! - [`OverlayController`]: register / open / close / destroy_all
//! - [`OverlayStack`]: open overlays in paint order with z-indices
//!
//! The payload type `P` is whatever the surface can display. The manager
//! stores it behind an `Arc` and never looks inside.

mod controller;
mod entry;
mod registry;
mod stack;

pub use controller::{OverlayBatch, OverlayController};
pub use entry::{OverlayEntry, OverlayKey, Priority};
pub use registry::OverlaySnapshot;
pub use stack::{
    overlay_z_index, OverlayStack, StackLayer, CONTENT_Z_INDEX, DEFAULT_OVERLAY_BASE_Z,
};
