//! Treatment Panel
//!
//! The doctor fills in the treatment for the booking while the call runs.
//! [`TreatmentForm`] is the editable state owned by the app; every change
//! produces a fresh [`TreatmentPanel`] that is registered again under the
//! same overlay key, so the panel keeps its place in the stack.

use std::sync::Arc;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Widget};

use room_core::{TreatmentDraft, TreatmentLevel, TreatmentRecord};

use crate::overlays::{side_panel, OverlayView};
use crate::theme;
use crate::widgets::TextBlock;

/// Widest the panel gets
const PANEL_WIDTH: u16 = 64;

/// Form fields in Tab order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    /// Diagnosis text
    Diagnosis,
    /// Severity level
    Level,
    /// Free-text note
    Note,
    /// Booking the treatment belongs to
    BookingId,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Self::Diagnosis => Self::Level,
            Self::Level => Self::Note,
            Self::Note => Self::BookingId,
            Self::BookingId => Self::Diagnosis,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Diagnosis => "Diagnosis",
            Self::Level => "Level",
            Self::Note => "Note",
            Self::BookingId => "Booking",
        }
    }
}

/// Where the last save attempt stands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveState {
    /// Nothing submitted since the last edit
    Editing,
    /// Rejected before sending
    Invalid(String),
    /// Request in flight
    Saving,
    /// Stored by the API
    Saved,
    /// The API call failed
    Failed(String),
}

/// Editable treatment form
#[derive(Clone, Debug)]
pub struct TreatmentForm {
    draft: TreatmentDraft,
    focus: Field,
    save: SaveState,
}

impl TreatmentForm {
    /// Empty form for a booking
    pub fn new(booking_id: impl Into<String>) -> Self {
        Self {
            draft: TreatmentDraft::for_booking(booking_id),
            focus: Field::Diagnosis,
            save: SaveState::Editing,
        }
    }

    pub fn draft(&self) -> &TreatmentDraft {
        &self.draft
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn save_state(&self) -> &SaveState {
        &self.save
    }

    /// Move focus to the next field
    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    /// Type a character into the focused field
    ///
    /// On the level field any key cycles the level.
    pub fn input(&mut self, c: char) {
        match self.focus {
            Field::Diagnosis => self.draft.diagnosis.push(c),
            Field::Note => self.draft.note.push(c),
            Field::BookingId => self.draft.booking_id.push(c),
            Field::Level => return self.cycle_level(),
        }
        self.edited();
    }

    /// Start a new line in the note
    pub fn newline(&mut self) {
        if self.focus == Field::Note {
            self.draft.note.push('\n');
            self.edited();
        }
    }

    /// Delete the last character of the focused field
    pub fn backspace(&mut self) {
        let popped = match self.focus {
            Field::Diagnosis => self.draft.diagnosis.pop(),
            Field::Note => self.draft.note.pop(),
            Field::BookingId => self.draft.booking_id.pop(),
            Field::Level => self.draft.level.take().map(|_| ' '),
        };
        if popped.is_some() {
            self.edited();
        }
    }

    /// Pick the next severity level
    pub fn cycle_level(&mut self) {
        self.draft.level = Some(match self.draft.level {
            Some(level) => level.next(),
            None => TreatmentLevel::Mild,
        });
        self.edited();
    }

    /// Validate and mark the form as saving
    ///
    /// Returns the record to send, or `None` if the form is invalid or a
    /// save is already running.
    pub fn begin_submit(&mut self) -> Option<TreatmentRecord> {
        if self.save == SaveState::Saving {
            return None;
        }
        match self.draft.validate() {
            Ok(record) => {
                self.save = SaveState::Saving;
                Some(record)
            }
            Err(e) => {
                self.save = SaveState::Invalid(e.to_string());
                None
            }
        }
    }

    /// Record how the save ended
    pub fn finish_submit(&mut self, result: Result<(), String>) {
        self.save = match result {
            Ok(()) => SaveState::Saved,
            Err(e) => SaveState::Failed(e),
        };
    }

    /// Immutable view of the form for the overlay stack
    pub fn panel(&self) -> Arc<TreatmentPanel> {
        Arc::new(TreatmentPanel { form: self.clone() })
    }

    fn edited(&mut self) {
        if self.save != SaveState::Saving {
            self.save = SaveState::Editing;
        }
    }
}

/// Treatment form as drawn in its overlay layer
#[derive(Debug)]
pub struct TreatmentPanel {
    form: TreatmentForm,
}

impl TreatmentPanel {
    pub fn form(&self) -> &TreatmentForm {
        &self.form
    }

    fn label_style(&self, field: Field) -> Style {
        if self.form.focus == field {
            Style::default()
                .fg(theme::FOCUS_AMBER)
                .add_modifier(Modifier::BOLD)
        } else {
            theme::hint_style()
        }
    }

    fn status_line(&self) -> Line<'static> {
        let (text, color) = match &self.form.save {
            SaveState::Editing => return Line::default(),
            SaveState::Invalid(reason) => (reason.clone(), theme::ERROR_RED),
            SaveState::Saving => ("Saving…".to_string(), theme::PENDING_YELLOW),
            SaveState::Saved => ("Saved".to_string(), theme::SUCCESS_GREEN),
            SaveState::Failed(reason) => (reason.clone(), theme::ERROR_RED),
        };
        Line::from(Span::styled(text, Style::default().fg(color)))
    }
}

impl OverlayView for TreatmentPanel {
    fn title(&self) -> &str {
        "Treatment"
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let panel = side_panel(area, PANEL_WIDTH);
        Clear.render(panel, buf);

        let block = Block::default()
            .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
            .border_style(Style::default().fg(theme::CLINIC_BLUE))
            .title(Span::styled(" Treatment ", theme::title_style()))
            .style(Style::default().bg(theme::PANEL_BG));
        let inner = block.inner(panel);
        block.render(panel, buf);
        if inner.width < 4 || inner.height < 12 {
            return;
        }

        let x = inner.x + 1;
        let width = inner.width - 2;
        let mut y = inner.y + 1;
        let draft = &self.form.draft;

        for field in [Field::Diagnosis, Field::Level] {
            let value = match field {
                Field::Diagnosis => draft.diagnosis.clone(),
                _ => draft
                    .level
                    .map_or_else(|| "(space to choose)".to_string(), |l| l.to_string()),
            };
            let line = Line::from(vec![
                Span::styled(format!("{:<10}", field.label()), self.label_style(field)),
                Span::raw(value),
            ]);
            buf.set_line(x, y, &line, width);
            y += 2;
        }

        buf.set_line(
            x,
            y,
            &Line::from(Span::styled(Field::Note.label(), self.label_style(Field::Note))),
            width,
        );
        y += 1;

        // Note gets whatever is left above the booking, status and hint rows
        let bottom = inner.y + inner.height;
        let note_height = bottom.saturating_sub(y + 5);
        TextBlock::new(&draft.note)
            .follow_tail(true)
            .render(Rect::new(x, y, width, note_height), buf);
        y += note_height + 1;

        let booking = Line::from(vec![
            Span::styled(
                format!("{:<10}", Field::BookingId.label()),
                self.label_style(Field::BookingId),
            ),
            Span::raw(draft.booking_id.clone()),
        ]);
        buf.set_line(x, y, &booking, width);
        y += 2;

        buf.set_line(x, y, &self.status_line(), width);
        buf.set_line(
            x,
            bottom - 1,
            &Line::from(Span::styled(
                "Tab next · Enter save · Esc close",
                theme::hint_style(),
            )),
            width,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn type_str(form: &mut TreatmentForm, text: &str) {
        for c in text.chars() {
            form.input(c);
        }
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut form = TreatmentForm::new("b-1");
        type_str(&mut form, "Flu");
        form.next_field();
        form.input(' ');
        form.next_field();
        type_str(&mut form, "Rest");

        assert_eq!(form.draft().diagnosis, "Flu");
        assert_eq!(form.draft().level, Some(TreatmentLevel::Mild));
        assert_eq!(form.draft().note, "Rest");
        assert_eq!(form.focus(), Field::Note);
    }

    #[test]
    fn test_tab_wraps_around() {
        let mut form = TreatmentForm::new("b-1");
        for _ in 0..4 {
            form.next_field();
        }
        assert_eq!(form.focus(), Field::Diagnosis);
    }

    #[test]
    fn test_submit_invalid_then_edit_clears_error() {
        let mut form = TreatmentForm::new("b-1");
        assert!(form.begin_submit().is_none());
        assert_eq!(
            form.save_state(),
            &SaveState::Invalid("diagnosis is required".to_string())
        );

        form.input('x');
        assert_eq!(form.save_state(), &SaveState::Editing);
    }

    #[test]
    fn test_submit_lifecycle() {
        let mut form = TreatmentForm::new("b-1");
        type_str(&mut form, "Flu");
        form.cycle_level();

        let record = form.begin_submit().unwrap();
        assert_eq!(record.diagnosis, "Flu");
        assert_eq!(form.save_state(), &SaveState::Saving);
        // No second request while one is running
        assert!(form.begin_submit().is_none());

        form.finish_submit(Err("API returned 500".to_string()));
        assert_eq!(form.save_state(), &SaveState::Failed("API returned 500".to_string()));

        form.begin_submit().unwrap();
        form.finish_submit(Ok(()));
        assert_eq!(form.save_state(), &SaveState::Saved);
    }

    #[test]
    fn test_backspace_on_level_clears_it() {
        let mut form = TreatmentForm::new("b-1");
        form.next_field();
        form.cycle_level();
        form.backspace();
        assert_eq!(form.draft().level, None);
    }

    #[test]
    fn test_panel_is_a_snapshot() {
        let mut form = TreatmentForm::new("b-1");
        let before = form.panel();
        form.input('a');
        assert_eq!(before.form().draft().diagnosis, "");
        assert_eq!(form.panel().form().draft().diagnosis, "a");
    }

    #[test]
    fn test_render_right_aligned_and_opaque() {
        let area = Rect::new(0, 0, 100, 20);
        let mut buf = Buffer::empty(area);
        for cell in &mut buf.content {
            cell.skip = true;
        }
        TreatmentForm::new("b-1").panel().render(area, &mut buf);

        // Left of the panel stays transparent, the panel itself is opaque
        assert!(buf[(10, 5)].skip);
        assert!(!buf[(50, 5)].skip);
        assert_eq!(buf[(36, 5)].symbol(), "│");
    }
}
