//! Screens
//!
//! - [`room`]: page content (always drawn, z 0)
//! - [`treatment`]: treatment panel overlay (doctor only)
//! - [`leave`]: leave-session dialog overlay

pub mod leave;
pub mod room;
pub mod treatment;

pub use leave::LeaveDialog;
pub use room::{RoomScreen, SessionStatus};
pub use treatment::{Field, SaveState, TreatmentForm, TreatmentPanel};
