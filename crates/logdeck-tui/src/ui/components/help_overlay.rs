use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::Layout;

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let popup_area = Layout::centered(frame.area(), 50, 34);

        // Clear the background
        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::section("Rows"),
            Self::key_line("j/↓ k/↑", "Select next / previous"),
            Self::key_line("Ctrl+d/u", "Page down / up"),
            Self::key_line("g/G", "First / last row"),
            Self::key_line("f", "Toggle follow mode"),
            Self::key_line("Enter", "Open source of the log"),
            Self::key_line("Tab", "Focus stack trace"),
            Line::from(""),
            Self::section("Stack trace"),
            Self::key_line("j/k", "Move between frames"),
            Self::key_line("Enter", "Open frame location"),
            Self::key_line("Esc/Tab", "Back to rows"),
            Line::from(""),
            Self::section("Filters"),
            Self::key_line("1-5", "Toggle Info..Assert"),
            Self::key_line("[ ]", "Move channel cursor"),
            Self::key_line("Space", "Toggle channel"),
            Self::key_line("a", "Enable all channels"),
            Self::key_line("c", "Toggle collapse"),
            Self::key_line("/", "Search logs"),
            Self::key_line("n", "Clear search"),
            Line::from(""),
            Self::section("Actions"),
            Self::key_line("X", "Clear logs"),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("Esc", "Go back"),
            Self::key_line("q", "Quit"),
        ];

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn section(title: &str) -> Line<'_> {
        Line::from(Span::styled(title, Style::default().fg(Color::Yellow)))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
