//! TextBlock Widget
//!
//! A borderless text region that wraps to its width. When the text is
//! taller than the area it can either keep the head or follow the tail
//! (the line being typed stays visible).

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use textwrap::wrap;

/// A borderless, wrapping text block
pub struct TextBlock<'a> {
    content: &'a str,
    style: Style,
    follow_tail: bool,
}

impl<'a> TextBlock<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            style: Style::default(),
            follow_tail: false,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Show the last lines instead of the first ones on overflow
    pub fn follow_tail(mut self, follow: bool) -> Self {
        self.follow_tail = follow;
        self
    }
}

/// Wrap text to a width, keeping blank lines
pub fn wrapped_lines(content: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    content
        .split('\n')
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                wrap(line, width)
                    .into_iter()
                    .map(|cow| cow.into_owned())
                    .collect()
            }
        })
        .collect()
}

impl Widget for TextBlock<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let lines = wrapped_lines(self.content, area.width);
        let height = usize::from(area.height);
        let skip = if self.follow_tail {
            lines.len().saturating_sub(height)
        } else {
            0
        };

        for (y, line) in (area.y..).zip(lines.iter().skip(skip).take(height)) {
            buf.set_stringn(area.x, y, line, usize::from(area.width), self.style);
        }
    }
}
