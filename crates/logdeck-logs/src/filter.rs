use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

use logdeck_types::{ArcLogRecord, FilterSpec, LogRecord, Severity, ViewRow};

/// Compiled search term.
///
/// The term is always matched literally and case-insensitively.
#[derive(Clone)]
pub struct SearchPattern {
    /// Escaped regex (None = matches everything)
    regex: Option<Regex>,

    /// Lowercased term, used if the regex could not be built
    lowered: String,

    /// Original term
    term: String,
}

impl SearchPattern {
    /// Compile a search term
    pub fn new(term: &str) -> Self {
        let regex = if term.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
                .ok()
        };

        Self {
            regex,
            lowered: term.to_lowercase(),
            term: term.to_string(),
        }
    }

    /// Check if a piece of text contains the term
    pub fn is_match(&self, text: &str) -> bool {
        if self.term.is_empty() {
            return true;
        }
        match &self.regex {
            Some(re) => re.is_match(text),
            None => text.to_lowercase().contains(&self.lowered),
        }
    }

    /// Check if a record matches: the term is searched in channel followed by message
    pub fn matches(&self, record: &LogRecord) -> bool {
        if self.term.is_empty() {
            return true;
        }
        let haystack = format!("{}{}", record.channel, record.message);
        self.is_match(&haystack)
    }

    /// Find all match positions in a string (for highlighting)
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.regex {
            Some(re) => re.find_iter(text).map(|m| (m.start(), m.end())).collect(),
            None => Vec::new(),
        }
    }

    /// Get the original term
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Check if the pattern matches everything
    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }
}

impl std::fmt::Debug for SearchPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPattern")
            .field("term", &self.term)
            .finish()
    }
}

/// Builds views from store snapshots
pub struct FilterEngine;

impl FilterEngine {
    /// Build the ordered view of `snapshot` under `spec`.
    ///
    /// Pure: the same inputs always give the same rows.
    pub fn build_view(snapshot: &[ArcLogRecord], spec: &FilterSpec) -> Vec<ViewRow> {
        let search = SearchPattern::new(&spec.search_term);
        let passing = snapshot
            .iter()
            .filter(|record| Self::passes(record, spec, &search));

        if !spec.collapse_enabled {
            return passing.cloned().map(ViewRow::single).collect();
        }

        // Rows stay in first-occurrence order; the map points each group at its row
        let mut rows: Vec<ViewRow> = Vec::new();
        let mut groups: HashMap<(&str, &str, Severity), usize> = HashMap::new();

        for record in passing {
            let key = (record.channel.as_str(), record.message.as_str(), record.severity);
            match groups.get(&key) {
                Some(&idx) => {
                    let merged = ViewRow {
                        record: rows[idx].record.clone(),
                        repeat_count: rows[idx].repeat_count + 1,
                        latest_sequence: record.sequence,
                    };
                    rows[idx] = merged;
                }
                None => {
                    groups.insert(key, rows.len());
                    rows.push(ViewRow::single(record.clone()));
                }
            }
        }

        rows
    }

    /// Check a single record against severity, channel and search filters
    pub fn passes(record: &LogRecord, spec: &FilterSpec, search: &SearchPattern) -> bool {
        spec.shows_severity(record.severity)
            && spec.shows_channel(&record.channel)
            && search.matches(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn snapshot(entries: &[(&str, &str, Severity)]) -> Vec<ArcLogRecord> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (channel, message, severity))| {
                let mut record = LogRecord::new(
                    "t".to_string(),
                    channel.to_string(),
                    message.to_string(),
                    *severity,
                    String::new(),
                );
                record.sequence = i as u64 + 1;
                Arc::new(record)
            })
            .collect()
    }

    fn sequences(view: &[ViewRow]) -> Vec<u64> {
        view.iter().map(ViewRow::sequence).collect()
    }

    #[test]
    fn test_empty_snapshot() {
        let spec = FilterSpec::show_all(["A"]);
        assert!(FilterEngine::build_view(&[], &spec).is_empty());
    }

    #[test]
    fn test_uncollapsed_preserves_order() {
        let records = snapshot(&[
            ("A", "x", Severity::Info),
            ("A", "x", Severity::Info),
            ("B", "y", Severity::Warning),
        ]);
        let view = FilterEngine::build_view(&records, &FilterSpec::show_all(["A", "B"]));
        assert_eq!(sequences(&view), vec![1, 2, 3]);
        assert!(view.iter().all(|row| row.repeat_count == 1));
    }

    #[test]
    fn test_severity_filter() {
        let records = snapshot(&[
            ("A", "x", Severity::Info),
            ("A", "y", Severity::Error),
            ("A", "z", Severity::Exception),
        ]);
        let spec = FilterSpec::show_all(["A"]).with_severities([Severity::Error, Severity::Exception]);
        let view = FilterEngine::build_view(&records, &spec);
        assert_eq!(sequences(&view), vec![2, 3]);
    }

    #[test]
    fn test_channel_filter_and_uncategorized() {
        let records = snapshot(&[
            ("Gameplay", "x", Severity::Info),
            ("Network", "y", Severity::Info),
            ("", "z", Severity::Info),
        ]);
        let spec = FilterSpec::show_all(["Gameplay"]);
        assert_eq!(sequences(&FilterEngine::build_view(&records, &spec)), vec![1, 3]);

        // An empty mask hides every categorized record
        let none = FilterSpec::show_all(Vec::<String>::new());
        assert_eq!(sequences(&FilterEngine::build_view(&records, &none)), vec![3]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_channel_and_message() {
        let records = snapshot(&[
            ("Network", "Connected to server.", Severity::Info),
            ("Gameplay", "Started game!", Severity::Info),
        ]);
        let base = FilterSpec::show_all(["Network", "Gameplay"]);

        let view = FilterEngine::build_view(&records, &base.clone().with_search("SERVER"));
        assert_eq!(sequences(&view), vec![1]);

        let view = FilterEngine::build_view(&records, &base.clone().with_search("network"));
        assert_eq!(sequences(&view), vec![1]);

        // Channel and message are searched as one string
        let view = FilterEngine::build_view(&records, &base.with_search("gameplaystarted"));
        assert_eq!(sequences(&view), vec![2]);
    }

    #[test]
    fn test_search_metacharacters_are_literal() {
        let records = snapshot(&[
            ("A", "call foo(", Severity::Info),
            ("A", "array[0]", Severity::Info),
            ("A", "plain", Severity::Info),
        ]);
        let base = FilterSpec::show_all(["A"]);

        let view = FilterEngine::build_view(&records, &base.clone().with_search("("));
        assert_eq!(sequences(&view), vec![1]);

        let view = FilterEngine::build_view(&records, &base.clone().with_search("["));
        assert_eq!(sequences(&view), vec![2]);

        let view = FilterEngine::build_view(&records, &base.with_search(".*"));
        assert!(view.is_empty());
    }

    #[test]
    fn test_collapse_merges_in_first_occurrence_order() {
        let records = snapshot(&[
            ("B", "second group", Severity::Info),
            ("A", "first group", Severity::Info),
            ("B", "second group", Severity::Info),
            ("A", "first group", Severity::Warning),
            ("B", "second group", Severity::Info),
        ]);
        let spec = FilterSpec::show_all(["A", "B"]).with_collapse(true);
        let view = FilterEngine::build_view(&records, &spec);

        assert_eq!(sequences(&view), vec![1, 2, 4]);
        assert_eq!(view[0].repeat_count, 3);
        assert_eq!(view[0].latest_sequence, 5);
        assert_eq!(view[1].repeat_count, 1);
        // Different severity does not merge
        assert_eq!(view[2].record.severity, Severity::Warning);
    }

    #[test]
    fn test_collapse_only_counts_surviving_records() {
        let records = snapshot(&[
            ("A", "same", Severity::Info),
            ("A", "same", Severity::Error),
            ("A", "same", Severity::Info),
        ]);
        let spec = FilterSpec::show_all(["A"])
            .with_severities([Severity::Info])
            .with_collapse(true);
        let view = FilterEngine::build_view(&records, &spec);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].repeat_count, 2);
        assert_eq!(view[0].latest_sequence, 3);
    }

    #[test]
    fn test_build_view_is_idempotent() {
        let records = snapshot(&[
            ("A", "x", Severity::Info),
            ("B", "y", Severity::Info),
            ("A", "x", Severity::Info),
        ]);
        let spec = FilterSpec::show_all(["A", "B"]).with_collapse(true).with_search("x");
        let first = FilterEngine::build_view(&records, &spec);
        let second = FilterEngine::build_view(&records, &spec);
        assert_eq!(first, second);
    }

    #[test]
    fn test_find_matches() {
        let pattern = SearchPattern::new("err");
        let matches = pattern.find_matches("an Error occurred, another ERR here");
        assert_eq!(matches, vec![(3, 6), (27, 30)]);
        assert!(SearchPattern::new("").find_matches("anything").is_empty());
    }
}
