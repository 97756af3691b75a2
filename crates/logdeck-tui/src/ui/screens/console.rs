use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use logdeck_logs::{SearchPattern, Severity, ViewRow};

use crate::app::{AppState, Pane};
use crate::ui::components::{HelpOverlay, StatusBar, console_hints, trace_hints};
use crate::ui::{Layout, Theme};

/// The console screen: toolbar, rows, stack trace and status bar
pub struct ConsoleScreen;

/// Cut `s` down to at most `max_width` terminal columns, marking the cut with "..."
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    if max_width >= 3 {
        out.push_str("...");
    }
    out
}

/// Split `text` into spans, highlighting every search match
fn highlighted(text: String, search: &SearchPattern, base: Style) -> Vec<Span<'static>> {
    let matches = search.find_matches(&text);
    if matches.is_empty() {
        return vec![Span::styled(text, base)];
    }

    let mut spans = Vec::new();
    let mut last_end = 0;
    for (start, end) in matches {
        if start > last_end {
            spans.push(Span::styled(text[last_end..start].to_string(), base));
        }
        spans.push(Span::styled(text[start..end].to_string(), Theme::search_match()));
        last_end = end;
    }
    if last_end < text.len() {
        spans.push(Span::styled(text[last_end..].to_string(), base));
    }
    spans
}

impl ConsoleScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let show_search = state.ui_state.search_active || !state.spec.search_term.is_empty();
        let (toolbar_area, search_area, content_area, status_area) =
            Layout::main(frame.area(), show_search);
        let (rows_area, trace_area) = Layout::console(content_area);

        // Remember areas for mouse hit-testing
        state.ui_state.rows_area = rows_area;
        state.ui_state.trace_area = trace_area;

        Self::render_toolbar(frame, toolbar_area, state);
        if let Some(area) = search_area {
            Self::render_search_bar(frame, area, state);
        }
        Self::render_rows(frame, rows_area, state);
        Self::render_stack_trace(frame, trace_area, state);
        Self::render_status_bar(frame, status_area, state);

        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    }

    fn render_toolbar(frame: &mut Frame, area: Rect, state: &AppState) {
        let counts = state.console.store().severity_counts();

        let mut spans = vec![
            Span::styled(" logdeck", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
        ];

        // Collapse toggle
        let collapse_style = if state.spec.collapse_enabled {
            Theme::toggle_on()
        } else {
            Theme::toggle_off()
        };
        spans.push(Span::styled("Collapse", collapse_style));
        spans.push(Span::styled(" │ ", Theme::text_dim()));

        // Severity toggles with counts
        for severity in Severity::ALL {
            let style = if state.spec.shows_severity(severity) {
                Theme::severity_badge(severity)
            } else {
                Theme::toggle_off()
            };
            spans.push(Span::styled(
                format!("{}:{}", severity.as_str(), counts.get(severity)),
                style,
            ));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled("│ ", Theme::text_dim()));

        // Channel toggles, the cursor shown reversed
        for (i, channel) in state.channels.iter().enumerate() {
            let mut style = if state.spec.shows_channel(channel) {
                Theme::toggle_on()
            } else {
                Theme::toggle_off()
            };
            if i == state.ui_state.channel_cursor {
                style = style.patch(Theme::toggle_cursor());
            }
            spans.push(Span::styled(channel.clone(), style));
            spans.push(Span::raw(" "));
        }

        let toolbar = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(toolbar, area);
    }

    fn render_search_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let active = state.ui_state.search_active;
        let mut spans = vec![];

        // Prompt
        if active {
            spans.push(Span::styled(
                " /",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(" Search: ", Theme::text_dim()));
        }

        // Input or current term
        let term = if active {
            &state.ui_state.search_input
        } else {
            &state.spec.search_term
        };
        spans.push(Span::styled(term.clone(), Theme::text_highlight()));

        // Cursor when active
        if active {
            spans.push(Span::styled(
                "█",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
            spans.push(Span::styled("  [Enter] Apply  [Esc] Cancel", Theme::text_dim()));
        } else {
            spans.push(Span::styled("  [n] Clear  [/] Edit", Theme::text_dim()));
        }

        let search_bar = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if active {
                    Style::default().fg(Color::Yellow)
                } else {
                    Theme::border()
                })
                .title(Span::styled(" Search ", Theme::title())),
        );

        frame.render_widget(search_bar, area);
    }

    fn render_rows(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let inner_height = area.height.saturating_sub(2) as usize;
        state.clamp_scroll(inner_height);

        let view = state.console.view();
        let total = view.len();
        let selected = state.console.selected_index();
        let search = SearchPattern::new(&state.spec.search_term);
        let scroll = state.ui_state.log_scroll;

        // 2 for borders, 1 for the scrollbar
        let inner_width = area.width.saturating_sub(3) as usize;

        let lines: Vec<Line> = view
            .iter()
            .enumerate()
            .skip(scroll)
            .take(inner_height)
            .map(|(i, row)| Self::format_row(row, &search, inner_width, selected == Some(i)))
            .collect();

        let title = if state.spec.search_term.is_empty() {
            format!(" Logs ({}) ", total)
        } else {
            format!(" Logs ({} matching) ", total)
        };

        let border_style = if state.ui_state.focus == Pane::Rows {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let rows_widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(title, Theme::title())),
        );

        frame.render_widget(rows_widget, area);

        if total > inner_height {
            let max_scroll = total.saturating_sub(inner_height);
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(scroll.min(max_scroll));

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    /// One view row: severity, channel, message and repeat count
    fn format_row(
        row: &ViewRow,
        search: &SearchPattern,
        width: usize,
        is_selected: bool,
    ) -> Line<'static> {
        let record = &row.record;

        let mut spans = vec![Span::styled(
            format!("{:>3} ", record.severity.as_str()),
            Theme::severity_badge(record.severity),
        )];
        let mut used = 4;

        let badge = (row.repeat_count > 1).then(|| format!(" x{} ", row.repeat_count));
        let badge_width = badge.as_ref().map_or(0, |b| b.width() + 1);

        if !record.channel.is_empty() {
            let channel = format!("[{}] ", record.channel);
            used += channel.width();
            spans.push(Span::styled(channel, Theme::text_dim()));
        }

        let message_width = width.saturating_sub(used + badge_width);
        let message = truncate_to_width(&record.message, message_width);
        spans.extend(highlighted(
            message,
            search,
            Theme::severity_text(record.severity),
        ));

        if let Some(badge) = badge {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(badge, Theme::repeat_count()));
        }

        let line = Line::from(spans);
        if is_selected {
            line.style(Theme::row_selected())
        } else {
            line
        }
    }

    fn render_stack_trace(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let inner_height = area.height.saturating_sub(2) as usize;
        state.clamp_trace_scroll(inner_height);

        let frames = state.console.selected_frames();
        let focused = state.ui_state.focus == Pane::StackTrace;
        let inner_width = area.width.saturating_sub(2) as usize;

        let lines: Vec<Line> = if frames.is_empty() {
            let hint = if state.console.selected_row().is_some() {
                "No stack trace"
            } else {
                "Select a log to see its stack trace"
            };
            vec![Line::from(Span::styled(hint, Theme::text_dim()))]
        } else {
            frames
                .iter()
                .enumerate()
                .skip(state.ui_state.trace_scroll)
                .take(inner_height)
                .map(|(i, stack_frame)| {
                    let text = truncate_to_width(&stack_frame.display_line, inner_width);
                    let style = if focused && i == state.ui_state.frame_cursor {
                        Theme::frame_cursor()
                    } else if stack_frame.is_navigable() {
                        Theme::frame_link()
                    } else {
                        Theme::text()
                    };
                    Line::from(Span::styled(text, style))
                })
                .collect()
        };

        let title = match state.console.selected_row() {
            Some(row) => format!(" Stack trace #{} ", row.sequence()),
            None => " Stack trace ".to_string(),
        };

        let trace_widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if focused {
                    Theme::border_focused()
                } else {
                    Theme::border()
                })
                .title(Span::styled(title, Theme::title())),
        );

        frame.render_widget(trace_widget, area);
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let hints = match state.ui_state.focus {
            Pane::Rows => console_hints(),
            Pane::StackTrace => trace_hints(),
        };

        let right = if let Some(notice) = &state.ui_state.notice {
            Span::styled(notice.clone(), Theme::notice())
        } else {
            let dropped = state.console.dropped_count();
            let follow = if state.ui_state.auto_scroll {
                "FOLLOW │ "
            } else {
                ""
            };
            let text = if dropped > 0 {
                format!("{}{} records │ {} dropped", follow, state.console.store().len(), dropped)
            } else {
                format!("{}{} records", follow, state.console.store().len())
            };
            Span::styled(text, Theme::status_bar())
        };

        frame.render_widget(StatusBar::new().hints(hints).right(right), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logdeck_logs::{Console, FilterSpec};
    use ratatui::{Terminal, backend::TestBackend};

    fn screen_text(state: &mut AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| ConsoleScreen::render(frame, state))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn state_with(lines: &[(&str, &str)]) -> AppState {
        let console = Console::new();
        for (raw, trace) in lines {
            console.on_log_line(raw, trace, Severity::Error, None);
        }
        let channels = vec!["Gameplay".to_string()];
        let mut state = AppState::new(console, FilterSpec::show_all(channels.clone()), channels);
        state.refresh_view();
        state
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("a long message", 8), "a lon...");
        assert_eq!(truncate_to_width("日本語テキスト", 7), "日本...");
    }

    #[test]
    fn test_highlighted_splits_matches() {
        let search = SearchPattern::new("ab");
        let spans = highlighted("xxABxab".to_string(), &search, Style::default());
        let parts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["xx", "AB", "x", "ab"]);
    }

    #[test]
    fn test_renders_rows_and_repeat_count() {
        let mut state = state_with(&[
            ("(t)-[Gameplay]-:Hit wall", ""),
            ("(t)-[Gameplay]-:Hit wall", ""),
        ]);
        state.toggle_collapse();
        state.refresh_view();

        let text = screen_text(&mut state);
        assert!(text.contains("[Gameplay] Hit wall"));
        assert!(text.contains("x2"));
        assert!(text.contains("Logs (1)"));
    }

    #[test]
    fn test_renders_selected_stack_trace() {
        let mut state = state_with(&[(
            "(t)-[Gameplay]-:boom",
            "Foo.Bar()\nFoo.Baz () (at Assets/Foo.cs:42)",
        )]);
        state.select_first();

        let text = screen_text(&mut state);
        assert!(text.contains("Foo.Baz () (at Assets/Foo.cs:42)"));
        assert!(text.contains("Stack trace #1"));
        assert!(state.ui_state.rows_area.height > 0);
    }
}
