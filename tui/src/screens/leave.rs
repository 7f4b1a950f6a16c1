//! Leave-session confirmation
//!
//! Registered above the treatment panel so it always stacks on top of it.

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::overlays::{centered, OverlayView};
use crate::theme;

/// "Leave the consultation?" dialog
#[derive(Debug, Default)]
pub struct LeaveDialog;

impl OverlayView for LeaveDialog {
    fn title(&self) -> &str {
        "Leave session"
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let dialog = centered(area, 44, 7);
        Clear.render(dialog, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ERROR_RED))
            .title(Span::styled(" Leave session ", theme::title_style()))
            .style(Style::default().bg(theme::DIALOG_BG));

        let text = vec![
            Line::default(),
            Line::from("Leave the consultation?"),
            Line::default(),
            Line::from(Span::styled("[Y] leave    [N] stay", theme::hint_style())),
        ];
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(block)
            .render(dialog, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_centered_and_rest_transparent() {
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        for cell in &mut buf.content {
            cell.skip = true;
        }
        LeaveDialog.render(area, &mut buf);

        assert!(buf[(0, 0)].skip);
        assert!(!buf[(40, 12)].skip);
        assert_eq!(buf[(18, 8)].symbol(), "┌");
    }
}
