//! Theme and Colors
//!
//! Clinic palette for the room: calm blues for chrome, a warm accent for
//! the focused field, and the usual status colors.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Room Palette
// ============================================================================

/// Header and panel borders
pub const CLINIC_BLUE: Color = Color::Rgb(90, 150, 220);

/// Panel background
pub const PANEL_BG: Color = Color::Rgb(24, 28, 36);

/// Dialog background (sits above panels)
pub const DIALOG_BG: Color = Color::Rgb(36, 30, 30);

/// Focused field accent
pub const FOCUS_AMBER: Color = Color::Rgb(255, 196, 90);

// ============================================================================
// UI Colors
// ============================================================================

/// Hints and placeholders
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// In-progress yellow
pub const PENDING_YELLOW: Color = Color::Rgb(255, 223, 128);

/// Style for a panel title
pub fn title_style() -> Style {
    Style::default().fg(CLINIC_BLUE).add_modifier(Modifier::BOLD)
}

/// Style for key hints
pub fn hint_style() -> Style {
    Style::default().fg(DIM_GRAY)
}
