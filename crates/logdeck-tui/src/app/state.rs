use ratatui::layout::{Position, Rect};

use logdeck_logs::{Console, FilterSpec, Severity};

/// Rows moved by page up/down
const PAGE_SIZE: isize = 20;

/// Remembers what the current view was built from, so it is only rebuilt
/// when the store or the filter spec changed
#[derive(Default)]
pub struct ViewCache {
    /// Spec the view was built under
    cached_spec: Option<FilterSpec>,
    /// Store revision when the view was built
    cached_revision: u64,
    /// Whether cache is valid
    pub is_valid: bool,
}

impl ViewCache {
    /// Check if the view must be rebuilt
    pub fn needs_refresh(&self, spec: &FilterSpec, revision: u64) -> bool {
        if !self.is_valid {
            return true;
        }

        // New records arrived or the store was cleared
        if self.cached_revision != revision {
            return true;
        }

        self.cached_spec.as_ref() != Some(spec)
    }

    /// Record the inputs of a fresh build
    pub fn update(&mut self, spec: &FilterSpec, revision: u64) {
        self.cached_spec = Some(spec.clone());
        self.cached_revision = revision;
        self.is_valid = true;
    }

    pub fn invalidate(&mut self) {
        self.is_valid = false;
    }
}

/// Which pane keyboard navigation applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Rows,
    StackTrace,
}

/// UI-specific transient state
pub struct UiState {
    /// Is search bar active?
    pub search_active: bool,

    /// Current search input text
    pub search_input: String,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// Notice or error message to display (if any)
    pub notice: Option<String>,

    /// Pane receiving navigation keys
    pub focus: Pane,

    /// First visible row
    pub log_scroll: usize,

    /// Keep the newest row in view?
    pub auto_scroll: bool,

    /// Highlighted stack frame of the selected record
    pub frame_cursor: usize,

    /// First visible stack frame
    pub trace_scroll: usize,

    /// Highlighted channel in the toolbar
    pub channel_cursor: usize,

    /// Screen areas from the last render, for mouse hit-testing
    pub rows_area: Rect,
    pub trace_area: Rect,

    /// Cache for the built view
    pub view_cache: ViewCache,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            search_active: false,
            search_input: String::new(),
            help_visible: false,
            notice: None,
            focus: Pane::Rows,
            log_scroll: 0,
            auto_scroll: true,
            frame_cursor: 0,
            trace_scroll: 0,
            channel_cursor: 0,
            rows_area: Rect::default(),
            trace_area: Rect::default(),
            view_cache: ViewCache::default(),
        }
    }
}

/// Global application state
pub struct AppState {
    /// Engine: store, view, selection and sinks
    pub console: Console,

    /// Current filter; replaced on every change
    pub spec: FilterSpec,

    /// Channels shown in the toolbar, in display order
    pub channels: Vec<String>,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Dirty flag for rendering - only render when true
    pub render_dirty: bool,
}

impl AppState {
    pub fn new(console: Console, spec: FilterSpec, channels: Vec<String>) -> Self {
        Self {
            console,
            spec,
            channels,
            ui_state: UiState::default(),
            should_quit: false,
            render_dirty: true, // Start dirty to ensure initial render
        }
    }

    /// Add channels seen in the store for the first time, enabled
    pub fn sync_channels(&mut self) {
        let unseen: Vec<String> = self
            .console
            .store()
            .channels()
            .into_iter()
            .filter(|c| !self.channels.contains(c))
            .collect();

        if unseen.is_empty() {
            return;
        }

        let mut mask = self.spec.channel_mask.clone();
        mask.extend(unseen.iter().cloned());
        self.channels.extend(unseen);
        self.spec = self.spec.clone().with_channels(mask);
    }

    /// Rebuild the view if the store or spec changed. Returns true if rebuilt.
    pub fn refresh_view(&mut self) -> bool {
        self.sync_channels();

        let revision = self.console.store().revision();
        if !self.ui_state.view_cache.needs_refresh(&self.spec, revision) {
            return false;
        }

        let had_selection = self.console.selection().is_selected();
        self.console.refresh(&self.spec);
        self.ui_state.view_cache.update(&self.spec, revision);

        if had_selection && !self.console.selection().is_selected() {
            self.reset_frames();
        }
        self.render_dirty = true;
        true
    }

    /// Number of rows in the current view
    pub fn row_count(&self) -> usize {
        self.console.view().len()
    }

    /// Select a row. Returns false for an out-of-range index, which
    /// leaves nothing selected.
    pub fn select_index(&mut self, index: usize) -> bool {
        let selected = self.console.select(index).is_ok();
        self.reset_frames();
        selected
    }

    /// Move the selection by `delta` rows
    pub fn select_offset(&mut self, delta: isize) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        self.ui_state.auto_scroll = false;

        let next = match self.console.selected_index() {
            Some(i) => (i as isize + delta).clamp(0, len as isize - 1) as usize,
            None if delta < 0 => len - 1,
            None => 0,
        };
        self.select_index(next);
    }

    pub fn page_up(&mut self) {
        self.select_offset(-PAGE_SIZE);
    }

    pub fn page_down(&mut self) {
        self.select_offset(PAGE_SIZE);
    }

    pub fn select_first(&mut self) {
        if self.row_count() > 0 {
            self.ui_state.auto_scroll = false;
            self.select_index(0);
        }
    }

    pub fn select_last(&mut self) {
        let len = self.row_count();
        if len > 0 {
            self.select_index(len - 1);
        }
    }

    /// Open the origin of the selected record's stack trace
    pub fn jump_to_origin(&mut self) {
        if self.console.selected_row().is_none() {
            return;
        }
        if self.console.jump_to_origin().is_none() {
            self.show_notice("Selected log has no source location".to_string());
        }
    }

    /// Number of stack frames of the selected record
    pub fn frame_count(&self) -> usize {
        self.console.selected_frames().len()
    }

    pub fn frame_up(&mut self) {
        self.ui_state.frame_cursor = self.ui_state.frame_cursor.saturating_sub(1);
    }

    pub fn frame_down(&mut self) {
        let count = self.frame_count();
        if count > 0 && self.ui_state.frame_cursor + 1 < count {
            self.ui_state.frame_cursor += 1;
        }
    }

    /// Open the highlighted stack frame
    pub fn open_frame(&mut self) {
        if let Err(e) = self.console.activate_frame(self.ui_state.frame_cursor) {
            self.show_notice(e.to_string());
        }
    }

    pub fn toggle_focus(&mut self) {
        self.ui_state.focus = match self.ui_state.focus {
            Pane::Rows if self.frame_count() > 0 => Pane::StackTrace,
            _ => Pane::Rows,
        };
    }

    pub fn toggle_collapse(&mut self) {
        let enabled = !self.spec.collapse_enabled;
        self.spec = self.spec.clone().with_collapse(enabled);
    }

    pub fn toggle_severity(&mut self, severity: Severity) {
        self.spec = self.spec.clone().toggle_severity(severity);
    }

    pub fn channel_prev(&mut self) {
        self.ui_state.channel_cursor = self.ui_state.channel_cursor.saturating_sub(1);
    }

    pub fn channel_next(&mut self) {
        if self.ui_state.channel_cursor + 1 < self.channels.len() {
            self.ui_state.channel_cursor += 1;
        }
    }

    /// Flip the channel under the toolbar cursor
    pub fn toggle_channel(&mut self) {
        if let Some(channel) = self.channels.get(self.ui_state.channel_cursor).cloned() {
            self.spec = self.spec.clone().toggle_channel(&channel);
        }
    }

    pub fn enable_all_channels(&mut self) {
        self.spec = self.spec.clone().with_channels(self.channels.clone());
    }

    /// Start search input mode, seeded with the current term
    pub fn start_search(&mut self) {
        self.ui_state.search_active = true;
        self.ui_state.search_input = self.spec.search_term.clone();
    }

    /// Leave search input without changing the filter
    pub fn cancel_search(&mut self) {
        self.ui_state.search_active = false;
        self.ui_state.search_input.clear();
    }

    /// Apply the current search input
    pub fn apply_search(&mut self) {
        self.ui_state.search_active = false;
        let term = std::mem::take(&mut self.ui_state.search_input);
        self.spec = self.spec.clone().with_search(term);
    }

    /// Remove the search term from the filter
    pub fn clear_search(&mut self) {
        self.ui_state.search_input.clear();
        self.spec = self.spec.clone().with_search(String::new());
    }

    /// Add a character to search input
    pub fn search_input_char(&mut self, c: char) {
        self.ui_state.search_input.push(c);
    }

    /// Remove last character from search input
    pub fn search_input_backspace(&mut self) {
        self.ui_state.search_input.pop();
    }

    /// Discard every record
    pub fn clear_logs(&mut self) {
        self.console.clear();
        self.ui_state.log_scroll = 0;
        self.ui_state.focus = Pane::Rows;
        self.ui_state.view_cache.invalidate();
        self.reset_frames();
    }

    /// Handle a mouse click at a terminal cell
    pub fn click(&mut self, column: u16, row: u16) {
        let position = Position::new(column, row);

        if let Some(offset) = inner_offset(self.ui_state.rows_area, position) {
            let index = self.ui_state.log_scroll + offset;
            self.ui_state.focus = Pane::Rows;
            self.ui_state.auto_scroll = false;
            // Clicking the selected row again activates it
            if self.console.selected_index() == Some(index) {
                self.jump_to_origin();
            } else {
                self.select_index(index);
            }
        } else if let Some(offset) = inner_offset(self.ui_state.trace_area, position) {
            let index = self.ui_state.trace_scroll + offset;
            if index < self.frame_count() {
                self.ui_state.focus = Pane::StackTrace;
                self.ui_state.frame_cursor = index;
                self.open_frame();
            }
        }
    }

    /// Keep the selection (or the tail, when following) inside a viewport
    pub fn clamp_scroll(&mut self, inner_height: usize) {
        let total = self.row_count();
        let max_scroll = total.saturating_sub(inner_height);

        if self.ui_state.auto_scroll {
            self.ui_state.log_scroll = max_scroll;
            return;
        }

        if let Some(idx) = self.console.selected_index() {
            if idx < self.ui_state.log_scroll {
                self.ui_state.log_scroll = idx;
            } else if inner_height > 0 && idx >= self.ui_state.log_scroll + inner_height {
                self.ui_state.log_scroll = idx + 1 - inner_height;
            }
        }

        self.ui_state.log_scroll = self.ui_state.log_scroll.min(max_scroll);
    }

    /// Keep the frame cursor inside the stack trace viewport
    pub fn clamp_trace_scroll(&mut self, inner_height: usize) {
        let cursor = self.ui_state.frame_cursor;
        if cursor < self.ui_state.trace_scroll {
            self.ui_state.trace_scroll = cursor;
        } else if inner_height > 0 && cursor >= self.ui_state.trace_scroll + inner_height {
            self.ui_state.trace_scroll = cursor + 1 - inner_height;
        }
    }

    /// Show a notice message
    pub fn show_notice(&mut self, msg: String) {
        self.ui_state.notice = Some(msg);
    }

    /// Dismiss the notice message
    pub fn dismiss_notice(&mut self) {
        self.ui_state.notice = None;
    }

    fn reset_frames(&mut self) {
        self.ui_state.frame_cursor = 0;
        self.ui_state.trace_scroll = 0;
        if self.frame_count() == 0 {
            self.ui_state.focus = Pane::Rows;
        }
    }
}

/// Line offset of `position` inside the bordered `area`, if it falls within
fn inner_offset(area: Rect, position: Position) -> Option<usize> {
    let inner = area.inner(ratatui::layout::Margin {
        vertical: 1,
        horizontal: 1,
    });
    inner
        .contains(position)
        .then(|| (position.y - inner.y) as usize)
}
