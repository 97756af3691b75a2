use std::sync::Arc;

use parking_lot::Mutex;

use logdeck_types::{ArcLogRecord, LogRecord, Severity};

/// Append-only, insertion-ordered record store.
///
/// Cloning yields another handle to the same store.
#[derive(Clone, Default)]
pub struct LogStore {
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    records: Vec<ArcLogRecord>,

    /// Last sequence handed out; survives `clear`
    last_sequence: u64,

    /// Bumped on every append and clear
    revision: u64,
}

impl LogStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next sequence to `record`, append it and return the sequence
    pub fn append(&self, mut record: LogRecord) -> u64 {
        let mut inner = self.inner.lock();
        inner.last_sequence += 1;
        inner.revision += 1;
        record.sequence = inner.last_sequence;
        inner.records.push(Arc::new(record));
        inner.last_sequence
    }

    /// Point-in-time copy of all records in sequence order
    pub fn snapshot(&self) -> Vec<ArcLogRecord> {
        self.inner.lock().records.clone()
    }

    /// Discard all records. Sequences are never reused afterwards.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.records.clear();
        inner.revision += 1;
    }

    /// Total record count
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Changes whenever the store contents change
    pub fn revision(&self) -> u64 {
        self.inner.lock().revision
    }

    /// Sequence of the most recently appended record (0 if none ever)
    pub fn last_sequence(&self) -> u64 {
        self.inner.lock().last_sequence
    }

    /// Distinct non-empty channels, in first-seen order
    pub fn channels(&self) -> Vec<String> {
        let records = self.snapshot();
        let mut channels: Vec<String> = Vec::new();
        for record in &records {
            if !record.channel.is_empty() && !channels.contains(&record.channel) {
                channels.push(record.channel.clone());
            }
        }
        channels
    }

    /// Get record count per severity
    pub fn severity_counts(&self) -> SeverityCounts {
        let inner = self.inner.lock();
        let mut counts = SeverityCounts::default();

        for record in inner.records.iter() {
            match record.severity {
                Severity::Info => counts.info += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Error => counts.error += 1,
                Severity::Exception => counts.exception += 1,
                Severity::Assert => counts.assert += 1,
            }
        }

        counts
    }
}

/// Counts per severity
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub info: usize,
    pub warning: usize,
    pub error: usize,
    pub exception: usize,
    pub assert: usize,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
            Severity::Exception => self.exception,
            Severity::Assert => self.assert,
        }
    }

    pub fn total(&self) -> usize {
        self.info + self.warning + self.error + self.exception + self.assert
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    fn record(channel: &str, message: &str, severity: Severity) -> LogRecord {
        LogRecord::new(
            "t".to_string(),
            channel.to_string(),
            message.to_string(),
            severity,
            String::new(),
        )
    }

    #[test]
    fn test_append_assigns_increasing_sequences() {
        let store = LogStore::new();
        let a = store.append(record("A", "one", Severity::Info));
        let b = store.append(record("A", "two", Severity::Info));
        assert!(b > a);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].sequence, a);
        assert_eq!(snapshot[1].sequence, b);
    }

    #[test]
    fn test_snapshot_isolated_from_later_appends() {
        let store = LogStore::new();
        store.append(record("A", "one", Severity::Info));
        let snapshot = store.snapshot();
        store.append(record("A", "two", Severity::Info));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clear_does_not_reuse_sequences() {
        let store = LogStore::new();
        let before = store.append(record("A", "one", Severity::Info));
        store.clear();
        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());

        let after = store.append(record("A", "two", Severity::Info));
        assert!(after > before);
    }

    #[test]
    fn test_revision_changes_on_append_and_clear() {
        let store = LogStore::new();
        let r0 = store.revision();
        store.append(record("A", "one", Severity::Info));
        let r1 = store.revision();
        store.clear();
        let r2 = store.revision();
        assert!(r0 < r1 && r1 < r2);
    }

    #[test]
    fn test_concurrent_appends_get_distinct_sequences() {
        let store = LogStore::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    (0..250)
                        .map(|i| store.append(record("T", &format!("{t}-{i}"), Severity::Info)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for seq in handle.join().unwrap() {
                assert!(seen.insert(seq), "sequence {seq} handed out twice");
            }
        }
        assert_eq!(seen.len(), 2000);

        let snapshot = store.snapshot();
        assert!(snapshot.windows(2).all(|w| w[0].sequence < w[1].sequence));
    }

    #[test]
    fn test_channels_first_seen_order() {
        let store = LogStore::new();
        store.append(record("Network", "a", Severity::Info));
        store.append(record("", "b", Severity::Info));
        store.append(record("Gameplay", "c", Severity::Info));
        store.append(record("Network", "d", Severity::Info));
        assert_eq!(store.channels(), vec!["Network", "Gameplay"]);
    }

    #[test]
    fn test_severity_counts() {
        let store = LogStore::new();
        store.append(record("A", "a", Severity::Info));
        store.append(record("A", "b", Severity::Error));
        store.append(record("A", "c", Severity::Error));
        store.append(record("A", "d", Severity::Assert));

        let counts = store.severity_counts();
        assert_eq!(counts.info, 1);
        assert_eq!(counts.get(Severity::Error), 2);
        assert_eq!(counts.assert, 1);
        assert_eq!(counts.total(), 4);
    }
}
