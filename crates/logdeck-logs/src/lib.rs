//! Log console engine for logdeck
//!
//! This crate provides line parsing, the record store, view building,
//! selection tracking, stack trace resolution and producer plumbing.

mod console;
mod error;
mod filter;
mod parser;
mod selection;
mod stacktrace;
mod store;
mod stream;

pub use console::{Console, FocusSink, Ingestor, NavigationSink};
pub use error::ConsoleError;
pub use filter::{FilterEngine, SearchPattern};
pub use parser::{LineParser, ParseError};
pub use selection::SelectionTracker;
pub use stacktrace::StackTraceResolver;
pub use store::{LogStore, SeverityCounts};
pub use stream::{InputLine, LogProducer, ProducerManager, ReaderProducer, ReaderSource, pump};

// Re-export types used in our public API
pub use logdeck_types::{
    ArcLogRecord, FilterSpec, LogRecord, ObjectRef, SelectionState, Severity, SourceLocation,
    StackFrame, ViewRow,
};
