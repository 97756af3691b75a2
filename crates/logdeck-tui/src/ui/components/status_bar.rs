use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::Theme;

/// Status bar showing keyboard shortcuts
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    right_text: Option<Span<'a>>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            right_text: None,
        }
    }

    /// Add keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    /// Set text to display on the right side
    pub fn right<S: Into<Span<'a>>>(mut self, text: S) -> Self {
        self.right_text = Some(text.into());
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        buf.set_style(area, Theme::status_bar());

        // Build hints
        let mut spans = Vec::new();
        for (i, (key, desc)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", Theme::status_bar()));
            }
            spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
            spans.push(Span::styled(desc.to_string(), Theme::status_bar()));
        }

        let line = Line::from(spans);
        let line_width = line.width() as u16;

        // Render hints on the left
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));

        // Right text only when it does not overlap the hints
        if let Some(right) = self.right_text {
            let width = right.content.width() as u16;
            let right_x = area.x + area.width.saturating_sub(width + 1);
            if right_x > area.x + line_width + 2 {
                buf.set_span(right_x, area.y, &right, width);
            }
        }
    }
}

/// Hints while the row list has focus
pub fn console_hints() -> Vec<(&'static str, &'static str)> {
    vec![
        ("j/k", "Move"),
        ("Enter", "Source"),
        ("Tab", "Trace"),
        ("c", "Collapse"),
        ("1-5", "Severity"),
        ("[]␣", "Channel"),
        ("/", "Search"),
        ("?", "Help"),
        ("q", "Quit"),
    ]
}

/// Hints while the stack trace has focus
pub fn trace_hints() -> Vec<(&'static str, &'static str)> {
    vec![
        ("j/k", "Frame"),
        ("Enter", "Open"),
        ("Tab", "Rows"),
        ("?", "Help"),
        ("q", "Quit"),
    ]
}
