//! Room Screen
//!
//! Page content under the overlays: who is in which room, how the session
//! came up, and the key hints. The last row is the status bar.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Widget};

use room_core::{BootstrapOutcome, CurrentUser, RoomRoute};

use crate::theme;
use crate::widgets::TextBlock;

/// How far the session bootstrap has got
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionStatus {
    /// Bootstrap still running
    #[default]
    Resolving,
    /// Bootstrap finished (with or without a user)
    Resolved(BootstrapOutcome),
    /// Bootstrap task died
    Failed(String),
}

/// Base content of the room
pub struct RoomScreen<'a> {
    pub route: &'a RoomRoute,
    pub user: Option<&'a CurrentUser>,
    pub session: &'a SessionStatus,
    /// Treatment panel state, `None` when the session has no overlays
    pub treatment_open: Option<bool>,
}

impl RoomScreen<'_> {
    fn user_line(&self) -> Line<'static> {
        match (self.user, self.session) {
            (Some(user), _) => Line::from(vec![
                Span::styled("Signed in as ", theme::hint_style()),
                Span::raw(user.display_name().to_string()),
            ]),
            (None, SessionStatus::Resolving) => {
                Line::from(Span::styled("Resolving user…", Style::default().fg(theme::PENDING_YELLOW)))
            }
            (None, _) => Line::from(Span::styled(
                "User could not be loaded",
                Style::default().fg(theme::ERROR_RED),
            )),
        }
    }

    fn session_text(&self) -> String {
        match self.session {
            SessionStatus::Resolving => "Session: starting".to_string(),
            SessionStatus::Failed(reason) => format!("Session: failed ({reason})"),
            SessionStatus::Resolved(outcome) => {
                let mut text = match outcome.credential {
                    Some(source) => format!("Session: token from {source}"),
                    None => "Session: no access token".to_string(),
                };
                if let Some(url) = &outcome.redirect_to {
                    text.push_str(&format!("\nSign in through the web app: {url}"));
                }
                text
            }
        }
    }

    fn status_bar(&self) -> Line<'static> {
        let mut spans = Vec::new();
        if let Some(open) = self.treatment_open {
            let state = if open { "open" } else { "closed" };
            spans.push(Span::styled("[T]", theme::title_style()));
            spans.push(Span::raw(format!("reatment: {state}   ")));
        }
        spans.push(Span::styled("[Q]", theme::title_style()));
        spans.push(Span::raw(" leave   "));
        spans.push(Span::styled("Ctrl-C quit", theme::hint_style()));
        Line::from(spans)
    }
}

impl Widget for RoomScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 10 {
            return;
        }

        let body = Rect::new(area.x, area.y, area.width, area.height - 1);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::CLINIC_BLUE))
            .title(Span::styled(
                format!(" Room {} · {} ", self.route.room_name, self.route.user_type),
                theme::title_style(),
            ));
        let inner = block.inner(body);
        block.render(body, buf);

        if inner.height > 0 {
            buf.set_line(inner.x + 1, inner.y, &self.user_line(), inner.width.saturating_sub(2));
        }
        if inner.height > 2 {
            let text_area = Rect::new(
                inner.x + 1,
                inner.y + 2,
                inner.width.saturating_sub(2),
                inner.height - 2,
            );
            TextBlock::new(&self.session_text()).render(text_area, buf);
        }

        buf.set_line(area.x, area.y + area.height - 1, &self.status_bar(), area.width);
    }
}
