use ratatui::style::{Color, Modifier, Style};

use logdeck_types::Severity;

/// Color theme for the application
pub struct Theme;

impl Theme {
    // Base colors
    pub const BG: Color = Color::Reset;
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;

    // Accent colors
    pub const PRIMARY: Color = Color::Cyan;
    pub const HIGHLIGHT: Color = Color::Yellow;
    pub const SELECTION: Color = Color::Blue;

    // Status colors
    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;

    // Border styles
    pub fn border() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    // Text styles
    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn text_highlight() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Message text for a severity
    pub fn severity_text(severity: Severity) -> Style {
        match severity {
            Severity::Error | Severity::Exception | Severity::Assert => {
                Style::default().fg(Self::ERROR)
            }
            Severity::Warning => Style::default().fg(Self::HIGHLIGHT),
            Severity::Info => Self::text(),
        }
    }

    /// Severity badge
    pub fn severity_badge(severity: Severity) -> Style {
        Style::default()
            .fg(severity.color())
            .add_modifier(Modifier::BOLD)
    }

    // Row styles
    pub fn row_selected() -> Style {
        Style::default()
            .bg(Self::SELECTION)
            .add_modifier(Modifier::BOLD)
    }

    pub fn repeat_count() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Self::FG_DIM)
            .add_modifier(Modifier::BOLD)
    }

    pub fn search_match() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    // Toolbar toggles
    pub fn toggle_on() -> Style {
        Style::default()
            .fg(Self::SUCCESS)
            .add_modifier(Modifier::BOLD)
    }

    pub fn toggle_off() -> Style {
        Style::default()
            .fg(Self::FG_DIM)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn toggle_cursor() -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    // Stack trace frames
    pub fn frame_link() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn frame_cursor() -> Style {
        Style::default()
            .fg(Self::BG)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    // Status bar
    pub fn status_bar() -> Style {
        Style::default().fg(Self::FG_DIM).bg(Color::DarkGray)
    }

    pub fn status_bar_key() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    // Notice
    pub fn notice() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }
}
