use thiserror::Error;

/// Recoverable console errors. None of these are fatal to ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("row {index} is out of range for a view of {len} rows")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("stack trace line has no navigable location: {line}")]
    NoTarget { line: String },
}
