use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single clipboard text capture. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub text: String,
    /// Seconds since the Unix epoch, UTC.
    #[serde(rename = "datetime")]
    pub timestamp: i64,
}

impl Entry {
    pub fn new(text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            text: text.into(),
            timestamp,
        }
    }

    fn now(text: String) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        Self { text, timestamp }
    }
}

struct History {
    entries: VecDeque<Entry>,
    capacity: usize,
}

impl History {
    fn truncate(&mut self) {
        if self.entries.len() > self.capacity {
            self.entries.truncate(self.capacity);
        }
    }
}

/// Most-recent-first clipboard history with unique texts and a length bound.
///
/// Readers take a shared lock only long enough to copy the entries out;
/// every mutation runs to completion under the exclusive lock, so no caller
/// ever observes a half-applied insert (old duplicate gone but new entry not
/// yet at the front, or the list not yet truncated).
pub struct HistoryStore {
    inner: RwLock<History>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self::with_entries(capacity, Vec::new())
    }

    /// Restores a store from previously persisted entries, given most recent
    /// first. Blank texts are skipped, a text seen again further down the
    /// list is dropped, and anything past `capacity` is discarded.
    pub fn with_entries(capacity: usize, entries: Vec<Entry>) -> Self {
        let capacity = capacity.max(1);
        let mut restored: VecDeque<Entry> = VecDeque::with_capacity(entries.len().min(capacity));
        let mut seen: HashSet<String> = HashSet::with_capacity(entries.len().min(capacity));

        for entry in entries {
            if restored.len() == capacity {
                break;
            }
            if entry.text.trim().is_empty() || !seen.insert(entry.text.clone()) {
                continue;
            }
            restored.push_back(entry);
        }

        Self {
            inner: RwLock::new(History {
                entries: restored,
                capacity,
            }),
        }
    }

    /// Records `text` as the most recent clipboard content.
    ///
    /// Whitespace-only text is ignored. Returns whether the history changed.
    pub fn insert(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let entry = Entry::now(text.to_string());

        let mut history = self.inner.write();
        history.entries.retain(|e| e.text != entry.text);
        history.entries.push_front(entry);
        history.truncate();

        true
    }

    /// Drops every entry whose text equals `text`. Absent text is a no-op.
    pub fn remove(&self, text: &str) -> usize {
        let mut history = self.inner.write();
        let before = history.entries.len();
        history.entries.retain(|e| e.text != text);
        before - history.entries.len()
    }

    /// Changes the capacity, evicting the oldest entries if the history is
    /// now too long. A capacity of zero is ignored.
    pub fn resize(&self, capacity: usize) {
        if capacity == 0 {
            return;
        }

        let mut history = self.inner.write();
        history.capacity = capacity;
        history.truncate();
    }

    pub fn clear(&self) {
        self.inner.write().entries.clear();
    }

    /// Point-in-time copy of the history, most recent first.
    pub fn snapshot(&self) -> Vec<Entry> {
        self.inner.read().entries.iter().cloned().collect()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.inner.read().entries.iter().any(|e| e.text == text)
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }
}
