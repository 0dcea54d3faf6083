use std::collections::VecDeque;

use hive_protocol::LogEntry;

/// How many entries the live view retains by default.
pub const DEFAULT_FEED_CAPACITY: usize = 50;

/// The bounded live view of recent activity.
///
/// Entries are kept in strict arrival order, keyed by the producer's
/// `id`. At most `capacity` entries are retained; the oldest are
/// evicted on overflow. An `id` never appears twice.
#[derive(Debug, Clone)]
pub struct LogFeed {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl LogFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_FEED_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Append a new entry at the tail.
    ///
    /// Idempotent on `id`: a duplicate delivery is a no-op and the
    /// first-arrived entry stays unchanged. Returns whether the entry
    /// was added. Evicts from the head until the bound holds.
    pub fn push(&mut self, entry: LogEntry) -> bool {
        if self.entries.iter().any(|e| e.id == entry.id) {
            return false;
        }
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    /// Replace the fork count of the entry addressed by `log_id`,
    /// leaving every other field untouched.
    ///
    /// An unknown id is a no-op: a fork update racing ahead of (or
    /// outliving the eviction of) its entry is benign. Returns whether
    /// an entry was updated.
    pub fn apply_fork_update(&mut self, log_id: u64, forks: u64) -> bool {
        match self.entries.iter_mut().find(|e| e.id == log_id) {
            Some(entry) => {
                entry.forks = Some(forks);
                true
            }
            None => false,
        }
    }

    /// The current ordered view, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LogFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}
