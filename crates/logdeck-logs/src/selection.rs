use logdeck_types::{ArcLogRecord, LogRecord, SelectionState, ViewRow};

use crate::ConsoleError;

/// Tracks the selected record by sequence, never by row index
#[derive(Clone, Debug, Default)]
pub struct SelectionTracker {
    state: SelectionState,

    /// The selected record, kept for its collapse key
    anchor: Option<ArcLogRecord>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current selection state
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Select the row at `index`. An out-of-range index clears the selection.
    pub fn select(&mut self, view: &[ViewRow], index: usize) -> Result<SelectionState, ConsoleError> {
        match view.get(index) {
            Some(row) => Ok(self.anchor_to(row)),
            None => {
                self.clear();
                Err(ConsoleError::IndexOutOfRange {
                    index,
                    len: view.len(),
                })
            }
        }
    }

    /// Drop the selection
    pub fn clear(&mut self) {
        self.state = SelectionState::Unselected;
        self.anchor = None;
    }

    /// Re-resolve the selection against a rebuilt view.
    ///
    /// Returns the row index the selection now lives at, or None (and the
    /// tracker becomes unselected) if the selected record is gone.
    pub fn resolve_after_rebuild(&mut self, view: &[ViewRow]) -> Option<usize> {
        match Self::resolve(self.anchor.as_deref(), view) {
            Some(index) => {
                self.anchor_to(&view[index]);
                Some(index)
            }
            None => {
                self.clear();
                None
            }
        }
    }

    /// Pure resolution of `selected` against `view`.
    ///
    /// A row whose identity is the selected sequence wins. Failing that, a
    /// collapsed row that absorbed the selected record (same key, sequence
    /// within the group's span) adopts the selection under its own identity.
    pub fn resolve(selected: Option<&LogRecord>, view: &[ViewRow]) -> Option<usize> {
        let selected = selected?;

        if let Some(index) = view.iter().position(|row| row.sequence() == selected.sequence) {
            return Some(index);
        }

        view.iter().position(|row| {
            row.repeat_count > 1
                && same_group(&row.record, selected)
                && (row.sequence()..=row.latest_sequence).contains(&selected.sequence)
        })
    }

    /// Row index of the current selection in `view`, without changing state
    pub fn index_in(&self, view: &[ViewRow]) -> Option<usize> {
        let sequence = self.state.sequence()?;
        view.iter().position(|row| row.sequence() == sequence)
    }

    fn anchor_to(&mut self, row: &ViewRow) -> SelectionState {
        self.state = SelectionState::Selected(row.sequence());
        self.anchor = Some(row.record.clone());
        self.state
    }
}

/// Records merge under collapse when channel, message and severity agree
fn same_group(a: &LogRecord, b: &LogRecord) -> bool {
    a.severity == b.severity && a.channel == b.channel && a.message == b.message
}

#[cfg(test)]
mod tests {
    use super::*;
    use logdeck_types::{LogRecord, Severity};
    use std::sync::Arc;

    fn row(sequence: u64, repeat_count: usize, latest_sequence: u64) -> ViewRow {
        row_with(&format!("m{sequence}"), sequence, repeat_count, latest_sequence)
    }

    fn row_with(message: &str, sequence: u64, repeat_count: usize, latest_sequence: u64) -> ViewRow {
        let mut record = LogRecord::new(
            "t".to_string(),
            "A".to_string(),
            message.to_string(),
            Severity::Info,
            String::new(),
        );
        record.sequence = sequence;
        ViewRow {
            record: Arc::new(record),
            repeat_count,
            latest_sequence,
        }
    }

    #[test]
    fn test_select_valid_row() {
        let view = vec![row(1, 1, 1), row(4, 1, 4)];
        let mut tracker = SelectionTracker::new();
        assert_eq!(tracker.select(&view, 1), Ok(SelectionState::Selected(4)));
        assert_eq!(tracker.state(), SelectionState::Selected(4));
    }

    #[test]
    fn test_select_out_of_range_clears() {
        let view = vec![row(1, 1, 1)];
        let mut tracker = SelectionTracker::new();
        tracker.select(&view, 0).unwrap();

        let err = tracker.select(&view, 5).unwrap_err();
        assert_eq!(err, ConsoleError::IndexOutOfRange { index: 5, len: 1 });
        assert_eq!(tracker.state(), SelectionState::Unselected);
    }

    #[test]
    fn test_selection_follows_sequence_not_index() {
        let view = vec![row(1, 1, 1), row(2, 1, 2), row(3, 1, 3)];
        let mut tracker = SelectionTracker::new();
        tracker.select(&view, 2).unwrap();

        // Row 1 filtered out: index shifts, sequence does not
        let rebuilt = vec![row(2, 1, 2), row(3, 1, 3)];
        assert_eq!(tracker.resolve_after_rebuild(&rebuilt), Some(1));
        assert_eq!(tracker.state(), SelectionState::Selected(3));
    }

    #[test]
    fn test_selection_lost_when_record_filtered() {
        let view = vec![row(1, 1, 1), row(2, 1, 2)];
        let mut tracker = SelectionTracker::new();
        tracker.select(&view, 0).unwrap();

        assert_eq!(tracker.resolve_after_rebuild(&[row(2, 1, 2)]), None);
        assert_eq!(tracker.state(), SelectionState::Unselected);
    }

    #[test]
    fn test_selection_lost_on_empty_view() {
        let mut tracker = SelectionTracker::new();
        tracker.select(&[row(7, 1, 7)], 0).unwrap();
        assert_eq!(tracker.resolve_after_rebuild(&[]), None);
        assert!(!tracker.state().is_selected());
    }

    #[test]
    fn test_selection_reparents_from_any_occurrence() {
        let occurrences = vec![
            row_with("dup", 1, 1, 1),
            row_with("dup", 2, 1, 2),
            row_with("dup", 3, 1, 3),
        ];
        let collapsed = vec![row_with("dup", 1, 3, 3)];

        for index in 0..occurrences.len() {
            let mut tracker = SelectionTracker::new();
            tracker.select(&occurrences, index).unwrap();
            assert_eq!(tracker.resolve_after_rebuild(&collapsed), Some(0));
            assert_eq!(tracker.state(), SelectionState::Selected(1));
        }
    }

    #[test]
    fn test_different_record_in_span_is_not_reparented() {
        let mut tracker = SelectionTracker::new();
        tracker
            .select(&[row_with("dup", 1, 1, 1), row_with("other", 2, 1, 2)], 1)
            .unwrap();

        // Sequence 2 lies inside the group's span but has another message
        let collapsed = vec![row_with("dup", 1, 2, 3)];
        assert_eq!(tracker.resolve_after_rebuild(&collapsed), None);
        assert_eq!(tracker.state(), SelectionState::Unselected);
    }

    #[test]
    fn test_unselected_stays_unselected() {
        let mut tracker = SelectionTracker::new();
        assert_eq!(tracker.resolve_after_rebuild(&[row(1, 1, 1)]), None);
        assert_eq!(SelectionTracker::resolve(None, &[]), None);
    }
}
