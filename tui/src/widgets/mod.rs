//! Widgets shared by the room screen and its overlays

mod text_block;

pub use text_block::{wrapped_lines, TextBlock};
