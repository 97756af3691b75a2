use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Split the console screen into toolbar, optional search bar, content
    /// and status bar
    pub fn main(area: Rect, show_search: bool) -> (Rect, Option<Rect>, Rect, Rect) {
        let mut constraints = vec![Constraint::Length(3)]; // Toolbar
        if show_search {
            constraints.push(Constraint::Length(3)); // Search bar
        }
        constraints.push(Constraint::Min(1)); // Content
        constraints.push(Constraint::Length(1)); // Status bar

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        if show_search {
            (chunks[0], Some(chunks[1]), chunks[2], chunks[3])
        } else {
            (chunks[0], None, chunks[1], chunks[2])
        }
    }

    /// Split content into the row list and the stack trace panel
    /// (60/40, as rows matter more than frames)
    pub fn console(area: Rect) -> (Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        (chunks[0], chunks[1])
    }

    /// Centered popup of at most the given size
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));

        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_without_search() {
        let (toolbar, search, content, status) = Layout::main(Rect::new(0, 0, 80, 24), false);
        assert_eq!(toolbar.height, 3);
        assert!(search.is_none());
        assert_eq!(content.height, 20);
        assert_eq!(status.y, 23);
    }

    #[test]
    fn test_main_with_search() {
        let (_, search, content, _) = Layout::main(Rect::new(0, 0, 80, 24), true);
        assert_eq!(search.map(|r| r.y), Some(3));
        assert_eq!(content.height, 17);
    }

    #[test]
    fn test_centered_fits_inside() {
        let area = Rect::new(0, 0, 40, 20);
        let popup = Layout::centered(area, 100, 100);
        assert_eq!(popup, Rect::new(2, 2, 36, 16));
    }
}
