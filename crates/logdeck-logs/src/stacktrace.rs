use logdeck_types::{SourceLocation, StackFrame};

/// Opening of a trailing location marker, e.g. `(at Assets/Foo.cs:42)`
const LOCATION_OPEN: &str = "(at ";

/// Turns stack trace blobs into display lines and navigation targets
pub struct StackTraceResolver;

impl StackTraceResolver {
    /// Resolve every non-empty line of `blob`, in order
    pub fn resolve(blob: &str) -> Vec<StackFrame> {
        Self::lines(blob)
            .map(|line| StackFrame {
                display_line: line.to_string(),
                target: Self::parse_location(line),
            })
            .collect()
    }

    /// Resolve only the last line, where the most specific frame is listed
    pub fn resolve_last(blob: &str) -> Option<SourceLocation> {
        Self::lines(blob).last().and_then(Self::parse_location)
    }

    /// Split on any mix of CR and LF, skipping blank lines
    fn lines(blob: &str) -> impl Iterator<Item = &str> {
        blob.split(['\r', '\n']).filter(|line| !line.trim().is_empty())
    }

    /// Parse a trailing `(at <path>:<line>)` marker
    fn parse_location(line: &str) -> Option<SourceLocation> {
        let inner = line.trim_end().strip_suffix(')')?;
        let start = inner.rfind(LOCATION_OPEN)?;
        let location = &inner[start + LOCATION_OPEN.len()..];

        // Paths may contain ':' (drive letters), the line number follows the last one
        let (path, line_number) = location.rsplit_once(':')?;
        if path.is_empty() {
            return None;
        }
        let line_number = line_number.trim().parse::<u32>().ok()?;

        Some(SourceLocation {
            path: path.to_string(),
            line: line_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_last_frame() {
        let target = StackTraceResolver::resolve_last("Foo.Bar()\n(at Assets/Foo.cs:42)").unwrap();
        assert_eq!(target.path, "Assets/Foo.cs");
        assert_eq!(target.line, 42);
    }

    #[test]
    fn test_resolve_mixed_lines() {
        let blob = "UnityEngine.Debug:Log (object)\r\n\
                    Test:Start () (at Assets/Scripts/Test.cs:14)\r\n\
                    \r\n\
                    System.Runtime.CompilerServices.AsyncMethodBuilderCore:Start\n";
        let frames = StackTraceResolver::resolve(blob);

        assert_eq!(frames.len(), 3);
        assert!(!frames[0].is_navigable());
        assert_eq!(
            frames[1].target,
            Some(SourceLocation {
                path: "Assets/Scripts/Test.cs".to_string(),
                line: 14,
            })
        );
        assert_eq!(frames[1].display_line, "Test:Start () (at Assets/Scripts/Test.cs:14)");
        assert!(!frames[2].is_navigable());
    }

    #[test]
    fn test_windows_path_keeps_drive_colon() {
        let target =
            StackTraceResolver::resolve_last("Foo () (at C:/Projects/Game/Assets/Foo.cs:7)").unwrap();
        assert_eq!(target.path, "C:/Projects/Game/Assets/Foo.cs");
        assert_eq!(target.line, 7);
    }

    #[test]
    fn test_unparseable_markers_fail_softly() {
        let blob = "a (at Assets/Foo.cs:abc)\nb (at :12)\nc (at Assets/Foo.cs)\nd (at Assets/Ok.cs:3)";
        let frames = StackTraceResolver::resolve(blob);
        assert_eq!(frames.len(), 4);
        assert!(frames[..3].iter().all(|f| f.target.is_none()));
        assert_eq!(frames[3].target.as_ref().map(|t| t.line), Some(3));
    }

    #[test]
    fn test_resolve_last_without_marker() {
        assert_eq!(StackTraceResolver::resolve_last(""), None);
        assert_eq!(StackTraceResolver::resolve_last("\n\r\n"), None);
        assert_eq!(
            StackTraceResolver::resolve_last("(at Assets/Foo.cs:42)\nFoo.Bar()"),
            None
        );
    }

    #[test]
    fn test_line_number_overflow_is_not_navigable() {
        assert_eq!(
            StackTraceResolver::resolve_last("x (at Assets/Foo.cs:99999999999)"),
            None
        );
    }
}
