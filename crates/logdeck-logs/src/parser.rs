use chrono::Local;
use thiserror::Error;

use logdeck_types::{LogRecord, Severity};

/// Delimiter between the timestamp, channel and message segments
const DELIMITER: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed log line: expected `(<time>)-[<channel>]-:<message>`")]
    Malformed,
}

/// Parser for `(<timestamp>)-[<channel>]-:<message>` log lines
pub struct LineParser;

impl LineParser {
    /// Parse a raw line into an unsequenced record
    pub fn parse(raw: &str, stack_trace: &str, severity: Severity) -> Result<LogRecord, ParseError> {
        // Only the first two delimiters are significant; the message keeps the rest
        let mut segments = raw.splitn(3, DELIMITER);
        let (Some(timestamp), Some(channel), Some(message)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(ParseError::Malformed);
        };

        Ok(LogRecord::new(
            Self::strip_timestamp(timestamp).to_string(),
            Self::strip_channel(channel).to_string(),
            Self::strip_message(message).to_string(),
            severity,
            stack_trace.to_string(),
        ))
    }

    /// Format a line for the given channel and message, stamped with local time
    pub fn format(channel: &str, message: &str) -> String {
        let timestamp = Local::now().format("%H:%M:%S%.3f").to_string();
        Self::format_at(&timestamp, channel, message)
    }

    /// Format a line with an explicit timestamp
    pub fn format_at(timestamp: &str, channel: &str, message: &str) -> String {
        format!("({timestamp})-[{channel}]-:{message}")
    }

    fn strip_timestamp(segment: &str) -> &str {
        let segment = segment.strip_prefix('(').unwrap_or(segment);
        segment.strip_suffix(')').unwrap_or(segment)
    }

    fn strip_channel(segment: &str) -> &str {
        let segment = segment.strip_prefix('[').unwrap_or(segment);
        segment.strip_suffix(']').unwrap_or(segment)
    }

    fn strip_message(segment: &str) -> &str {
        segment.strip_prefix(':').unwrap_or(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_line() {
        let record =
            LineParser::parse("(10:00:00.000)-[Gameplay]-:Started game!", "", Severity::Info)
                .unwrap();
        assert_eq!(record.timestamp, "10:00:00.000");
        assert_eq!(record.channel, "Gameplay");
        assert_eq!(record.message, "Started game!");
        assert_eq!(record.severity, Severity::Info);
        assert_eq!(record.sequence, 0);
    }

    #[test]
    fn test_message_keeps_delimiters() {
        let record = LineParser::parse(
            "(10:00:00.000)-[Network]-:retry - attempt 2 -- backoff",
            "",
            Severity::Warning,
        )
        .unwrap();
        assert_eq!(record.message, "retry - attempt 2 -- backoff");
    }

    #[test]
    fn test_message_trailing_colon_kept() {
        let record = LineParser::parse("(t)-[AI]-:state:", "", Severity::Info).unwrap();
        assert_eq!(record.message, "state:");
    }

    #[test]
    fn test_empty_channel() {
        let record = LineParser::parse("(t)-[]-:hello", "", Severity::Info).unwrap();
        assert!(record.is_uncategorized());
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(
            LineParser::parse("no delimiters at all", "", Severity::Info),
            Err(ParseError::Malformed)
        );
        assert_eq!(
            LineParser::parse("(10:00)-only one", "", Severity::Error),
            Err(ParseError::Malformed)
        );
        assert_eq!(LineParser::parse("", "", Severity::Info), Err(ParseError::Malformed));
    }

    #[test]
    fn test_stack_trace_carried() {
        let record =
            LineParser::parse("(t)-[UI]-:click", "Foo.Bar()\n", Severity::Error).unwrap();
        assert_eq!(record.stack_trace, "Foo.Bar()\n");
    }

    #[test]
    fn test_format_parses_back() {
        let line = LineParser::format("Gameplay", "Test!");
        let record = LineParser::parse(&line, "", Severity::Info).unwrap();
        assert_eq!(record.channel, "Gameplay");
        assert_eq!(record.message, "Test!");
        // HH:MM:SS.fff
        assert_eq!(record.timestamp.len(), 12);
    }

    #[test]
    fn test_multibyte_utf8_no_panic() {
        let record = LineParser::parse("(─)-[╭╮]-:─────", "", Severity::Info).unwrap();
        assert_eq!(record.channel, "╭╮");
        assert_eq!(record.message, "─────");
    }
}
