//! Shared types for logdeck
//!
//! This crate contains data structures used across multiple logdeck crates.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Severity
// ============================================================================

/// Log severity level
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Exception,
    Assert,
}

impl Severity {
    /// Every severity, in toolbar order
    pub const ALL: [Severity; 5] = [
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Exception,
        Self::Assert,
    ];

    /// Parse a severity name leniently; anything unrecognised is Info
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "warning" | "warn" | "wrn" => Self::Warning,
            "error" | "err" => Self::Error,
            "exception" | "exc" => Self::Exception,
            "assert" | "assertion" => Self::Assert,
            _ => Self::Info,
        }
    }

    /// Get display color for this severity
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
            Self::Exception => Color::LightRed,
            Self::Assert => Color::Magenta,
        }
    }

    /// Short display string (3 chars)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INF",
            Self::Warning => "WRN",
            Self::Error => "ERR",
            Self::Exception => "EXC",
            Self::Assert => "AST",
        }
    }

    /// Full name, as used in config files
    pub fn name(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Exception => "Exception",
            Self::Assert => "Assert",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Records
// ============================================================================

/// Opaque handle to an external object a producer associated with a log.
///
/// The engine never resolves or owns the object; it only hands the handle
/// back to a focus sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef(pub u64);

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single parsed log record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// Free-form tag, empty means uncategorized
    pub channel: String,

    /// Message body with the structured prefix removed
    pub message: String,

    /// Producer-supplied display time (never used for ordering)
    pub timestamp: String,

    pub severity: Severity,

    /// Raw stack trace, possibly empty
    pub stack_trace: String,

    /// Optional external object for focus side effects
    pub context: Option<ObjectRef>,

    /// Ingestion sequence, assigned by the store. Zero until stored.
    pub sequence: u64,
}

impl LogRecord {
    /// Create a record that has not been stored yet
    pub fn new(
        timestamp: String,
        channel: String,
        message: String,
        severity: Severity,
        stack_trace: String,
    ) -> Self {
        Self {
            channel,
            message,
            timestamp,
            severity,
            stack_trace,
            context: None,
            sequence: 0,
        }
    }

    /// Attach an external context handle
    pub fn with_context(mut self, context: Option<ObjectRef>) -> Self {
        self.context = context;
        self
    }

    /// Whether the record carries no channel
    pub fn is_uncategorized(&self) -> bool {
        self.channel.is_empty()
    }

    /// Reconstruct the structured-prefix line this record came from
    pub fn display_line(&self) -> String {
        format!("({})-[{}]-:{}", self.timestamp, self.channel, self.message)
    }
}

/// Shared, immutable record as held by the store and views
pub type ArcLogRecord = Arc<LogRecord>;

// ============================================================================
// Filtering
// ============================================================================

/// Filter settings for building a view.
///
/// A `FilterSpec` is a value: every change produces a new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSpec {
    /// Severities to show
    pub severity_mask: BTreeSet<Severity>,

    /// Channels to show. Records with an empty channel always pass this
    /// check; an empty mask hides every categorized record.
    pub channel_mask: BTreeSet<String>,

    /// Case-insensitive literal search over channel followed by message
    pub search_term: String,

    /// Merge identical (channel, message, severity) records
    pub collapse_enabled: bool,
}

/// Every severity enabled and no channels known yet.
///
/// Uncategorized records show; channels must be seeded with
/// [`FilterSpec::show_all`] or added as they are discovered.
impl Default for FilterSpec {
    fn default() -> Self {
        Self::show_all(Vec::<String>::new())
    }
}

impl FilterSpec {
    /// Every severity and every given channel enabled, no search, no collapse
    pub fn show_all<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            severity_mask: Severity::ALL.into_iter().collect(),
            channel_mask: channels.into_iter().map(Into::into).collect(),
            search_term: String::new(),
            collapse_enabled: false,
        }
    }

    /// Set the severities to show
    pub fn with_severities<I>(mut self, severities: I) -> Self
    where
        I: IntoIterator<Item = Severity>,
    {
        self.severity_mask = severities.into_iter().collect();
        self
    }

    /// Set the channels to show
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channel_mask = channels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the search term
    pub fn with_search<S: Into<String>>(mut self, term: S) -> Self {
        self.search_term = term.into();
        self
    }

    /// Enable or disable collapsing
    pub fn with_collapse(mut self, enabled: bool) -> Self {
        self.collapse_enabled = enabled;
        self
    }

    /// Flip one severity in the mask
    pub fn toggle_severity(mut self, severity: Severity) -> Self {
        if !self.severity_mask.remove(&severity) {
            self.severity_mask.insert(severity);
        }
        self
    }

    /// Flip one channel in the mask
    pub fn toggle_channel(mut self, channel: &str) -> Self {
        if !self.channel_mask.remove(channel) {
            self.channel_mask.insert(channel.to_string());
        }
        self
    }

    pub fn shows_severity(&self, severity: Severity) -> bool {
        self.severity_mask.contains(&severity)
    }

    pub fn shows_channel(&self, channel: &str) -> bool {
        channel.is_empty() || self.channel_mask.contains(channel)
    }
}

/// One row of a built view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewRow {
    /// Representative record (first occurrence when collapsed)
    pub record: ArcLogRecord,

    /// Number of records merged into this row, at least 1
    pub repeat_count: usize,

    /// Sequence of the most recent record merged into this row
    pub latest_sequence: u64,
}

impl ViewRow {
    pub fn single(record: ArcLogRecord) -> Self {
        let latest_sequence = record.sequence;
        Self {
            record,
            repeat_count: 1,
            latest_sequence,
        }
    }

    /// Stable identity of the row
    pub fn sequence(&self) -> u64 {
        self.record.sequence
    }
}

/// Selection state of the console
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Unselected,
    Selected(u64),
}

impl SelectionState {
    pub fn sequence(&self) -> Option<u64> {
        match self {
            Self::Unselected => None,
            Self::Selected(seq) => Some(*seq),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected(_))
    }
}

// ============================================================================
// Stack traces
// ============================================================================

/// A navigable source location
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Path exactly as captured from the stack trace
    pub path: String,
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

/// One line of a resolved stack trace
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFrame {
    pub display_line: String,
    pub target: Option<SourceLocation>,
}

impl StackFrame {
    pub fn is_navigable(&self) -> bool {
        self.target.is_some()
    }
}
