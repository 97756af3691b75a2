use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use logdeck_types::{
    FilterSpec, ObjectRef, SelectionState, Severity, SourceLocation, StackFrame, ViewRow,
};

use crate::{ConsoleError, FilterEngine, LineParser, LogStore, SelectionTracker, StackTraceResolver};

/// Receives "open this file at this line" requests.
///
/// Translating the path to something openable is the sink's job.
pub trait NavigationSink: Send + Sync {
    fn open_at_location(&self, path: &str, line: u32);
}

/// Receives the context handle of a newly selected record
pub trait FocusSink: Send + Sync {
    fn focus_object(&self, context: ObjectRef);
}

/// Ingestion entry point, safe to clone into any number of producers
#[derive(Clone)]
pub struct Ingestor {
    store: LogStore,
    dropped: Arc<AtomicU64>,
}

impl Ingestor {
    pub fn new(store: LogStore) -> Self {
        Self {
            store,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Parse and store one line. Malformed lines are counted and dropped.
    pub fn on_log_line(
        &self,
        raw: &str,
        stack_trace: &str,
        severity: Severity,
        context: Option<ObjectRef>,
    ) -> Option<u64> {
        match LineParser::parse(raw, stack_trace, severity) {
            Ok(record) => Some(self.store.append(record.with_context(context))),
            Err(e) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(error = %e, line = raw, "dropping log line");
                None
            }
        }
    }

    /// Number of lines dropped as malformed
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }
}

/// The composed console: store, current view, selection and sinks
pub struct Console {
    ingestor: Ingestor,
    view: Vec<ViewRow>,
    selection: SelectionTracker,
    navigation: Option<Box<dyn NavigationSink>>,
    focus: Option<Box<dyn FocusSink>>,
}

impl Console {
    /// Create a console over its own empty store
    pub fn new() -> Self {
        Self::with_store(LogStore::new())
    }

    /// Create a console over an existing store
    pub fn with_store(store: LogStore) -> Self {
        Self {
            ingestor: Ingestor::new(store),
            view: Vec::new(),
            selection: SelectionTracker::new(),
            navigation: None,
            focus: None,
        }
    }

    /// Set the sink that opens source locations
    pub fn with_navigation(mut self, sink: Box<dyn NavigationSink>) -> Self {
        self.navigation = Some(sink);
        self
    }

    /// Set the sink notified when a record with a context is selected
    pub fn with_focus(mut self, sink: Box<dyn FocusSink>) -> Self {
        self.focus = Some(sink);
        self
    }

    /// Handle for producers
    pub fn ingestor(&self) -> Ingestor {
        self.ingestor.clone()
    }

    pub fn store(&self) -> &LogStore {
        self.ingestor.store()
    }

    /// Ingest one line directly
    pub fn on_log_line(
        &self,
        raw: &str,
        stack_trace: &str,
        severity: Severity,
        context: Option<ObjectRef>,
    ) -> Option<u64> {
        self.ingestor.on_log_line(raw, stack_trace, severity, context)
    }

    pub fn dropped_count(&self) -> u64 {
        self.ingestor.dropped_count()
    }

    /// Default filter with every channel seen so far checked
    pub fn default_spec(&self) -> FilterSpec {
        FilterSpec::show_all(self.store().channels())
    }

    /// Rebuild the view under `spec` and re-resolve the selection against it
    pub fn refresh(&mut self, spec: &FilterSpec) -> &[ViewRow] {
        let snapshot = self.store().snapshot();
        self.view = FilterEngine::build_view(&snapshot, spec);
        self.selection.resolve_after_rebuild(&self.view);
        &self.view
    }

    /// The view from the last refresh
    pub fn view(&self) -> &[ViewRow] {
        &self.view
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.state()
    }

    /// Row index of the selection in the current view
    pub fn selected_index(&self) -> Option<usize> {
        self.selection.index_in(&self.view)
    }

    /// The selected row of the current view
    pub fn selected_row(&self) -> Option<&ViewRow> {
        self.selected_index().and_then(|idx| self.view.get(idx))
    }

    /// Select a row of the current view, focusing its context if it has one
    pub fn select(&mut self, index: usize) -> Result<SelectionState, ConsoleError> {
        let state = self.selection.select(&self.view, index)?;
        if let (Some(focus), Some(context)) = (
            &self.focus,
            self.view.get(index).and_then(|row| row.record.context),
        ) {
            focus.focus_object(context);
        }
        Ok(state)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Discard all records; the selection and view go with them
    pub fn clear(&mut self) {
        self.store().clear();
        self.view.clear();
        self.selection.clear();
    }

    /// Stack frames of the selected record
    pub fn selected_frames(&self) -> Vec<StackFrame> {
        self.selected_row()
            .map(|row| StackTraceResolver::resolve(&row.record.stack_trace))
            .unwrap_or_default()
    }

    /// Open the location of one stack frame of the selected record
    pub fn activate_frame(&self, frame_index: usize) -> Result<SourceLocation, ConsoleError> {
        let frames = self.selected_frames();
        let frame = frames.get(frame_index).ok_or(ConsoleError::IndexOutOfRange {
            index: frame_index,
            len: frames.len(),
        })?;
        let target = frame.target.clone().ok_or_else(|| ConsoleError::NoTarget {
            line: frame.display_line.clone(),
        })?;
        self.navigate(&target);
        Ok(target)
    }

    /// Open the origin (last frame) of the selected record's stack trace
    pub fn jump_to_origin(&self) -> Option<SourceLocation> {
        let row = self.selected_row()?;
        let target = StackTraceResolver::resolve_last(&row.record.stack_trace)?;
        self.navigate(&target);
        Some(target)
    }

    fn navigate(&self, target: &SourceLocation) {
        match &self.navigation {
            Some(sink) => sink.open_at_location(&target.path, target.line),
            None => tracing::debug!(%target, "no navigation sink configured"),
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct Recorder {
        opened: Arc<Mutex<Vec<(String, u32)>>>,
        focused: Arc<Mutex<Vec<ObjectRef>>>,
    }

    impl NavigationSink for Recorder {
        fn open_at_location(&self, path: &str, line: u32) {
            self.opened.lock().push((path.to_string(), line));
        }
    }

    impl FocusSink for Recorder {
        fn focus_object(&self, context: ObjectRef) {
            self.focused.lock().push(context);
        }
    }

    fn console_with(recorder: &Recorder) -> Console {
        Console::new()
            .with_navigation(Box::new(recorder.clone()))
            .with_focus(Box::new(recorder.clone()))
    }

    #[test]
    fn test_malformed_lines_are_dropped_and_counted() {
        let console = Console::new();
        assert!(console.on_log_line("garbage", "", Severity::Info, None).is_none());
        assert!(console.on_log_line("(t)-[A]-:ok", "", Severity::Info, None).is_some());
        assert_eq!(console.store().len(), 1);
        assert_eq!(console.dropped_count(), 1);
    }

    #[test]
    fn test_select_focuses_context() {
        let recorder = Recorder::default();
        let mut console = console_with(&recorder);
        console.on_log_line("(t)-[A]-:with context", "", Severity::Info, Some(ObjectRef(9)));
        console.on_log_line("(t)-[A]-:without", "", Severity::Info, None);
        console.refresh(&FilterSpec::show_all(["A"]));

        console.select(0).unwrap();
        console.select(1).unwrap();
        assert_eq!(*recorder.focused.lock(), vec![ObjectRef(9)]);
    }

    #[test]
    fn test_out_of_range_select_clears_selection() {
        let mut console = Console::new();
        console.on_log_line("(t)-[A]-:x", "", Severity::Info, None);
        console.refresh(&FilterSpec::show_all(["A"]));
        console.select(0).unwrap();

        assert!(matches!(
            console.select(3),
            Err(ConsoleError::IndexOutOfRange { index: 3, len: 1 })
        ));
        assert_eq!(console.selection(), SelectionState::Unselected);
    }

    #[test]
    fn test_activate_frame_navigates() {
        let recorder = Recorder::default();
        let mut console = console_with(&recorder);
        console.on_log_line(
            "(t)-[A]-:boom",
            "Foo.Bar()\nFoo.Baz () (at Assets/Foo.cs:42)",
            Severity::Error,
            None,
        );
        console.refresh(&FilterSpec::show_all(["A"]));
        console.select(0).unwrap();

        assert!(matches!(
            console.activate_frame(0),
            Err(ConsoleError::NoTarget { .. })
        ));
        let target = console.activate_frame(1).unwrap();
        assert_eq!(target.line, 42);
        assert_eq!(console.jump_to_origin(), Some(target));
        assert_eq!(
            *recorder.opened.lock(),
            vec![("Assets/Foo.cs".to_string(), 42), ("Assets/Foo.cs".to_string(), 42)]
        );
    }

    #[test]
    fn test_selection_survives_refilter() {
        let mut console = Console::new();
        console.on_log_line("(t)-[A]-:first", "", Severity::Info, None);
        let seq = console
            .on_log_line("(t)-[B]-:second", "", Severity::Info, None)
            .unwrap();
        console.refresh(&FilterSpec::show_all(["A", "B"]));
        console.select(1).unwrap();

        console.refresh(&FilterSpec::show_all(["B"]));
        assert_eq!(console.selection(), SelectionState::Selected(seq));
        assert_eq!(console.selected_index(), Some(0));
    }

    #[test]
    fn test_default_filter_shows_uncategorized_only() {
        let mut console = Console::new();
        console.on_log_line("(t)-[]-:no channel", "", Severity::Info, None);
        console.on_log_line("(t)-[Gameplay]-:Started game!", "", Severity::Info, None);

        let view = console.refresh(&FilterSpec::default());
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].record.message, "no channel");
    }

    #[test]
    fn test_default_spec_checks_every_known_channel() {
        let mut console = Console::new();
        console.on_log_line("(10:00:00.000)-[Gameplay]-:Started game!", "", Severity::Info, None);

        let spec = console.default_spec();
        let view = console.refresh(&spec);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].record.channel, "Gameplay");
    }

    #[test]
    fn test_clear_drops_selection() {
        let mut console = Console::new();
        console.on_log_line("(t)-[A]-:x", "", Severity::Info, None);
        console.refresh(&FilterSpec::show_all(["A"]));
        console.select(0).unwrap();

        console.clear();
        assert!(console.refresh(&FilterSpec::show_all(["A"])).is_empty());
        assert_eq!(console.selection(), SelectionState::Unselected);
        assert!(console.selected_frames().is_empty());
    }
}
