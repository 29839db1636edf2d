use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Maximum number of events retained in the ring buffer.
const EVENT_LOG_CAPACITY: usize = 200;

/// Something the watcher did with an attach call or an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Attached {
        container: String,
    },
    AlreadyAttached,
    ContainerMissing {
        selector: String,
    },
    /// Insertion whose marker name did not match.
    Ignored {
        marker: Option<String>,
    },
    /// Marker insertion for the track that was already reported.
    Duplicate {
        title: String,
    },
    Notified {
        title: String,
        artist: String,
        album: String,
    },
}

/// A timestamped event entry.
pub type EventEntry = (DateTime<Utc>, WatchEvent);

/// Bounded ring buffer of watch events.
#[derive(Debug)]
pub struct EventLog {
    entries: VecDeque<EventEntry>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
        }
    }

    /// Push a new event, evicting the oldest if at capacity.
    pub fn push(&mut self, event: WatchEvent) {
        if self.entries.len() >= EVENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back((Utc::now(), event));
    }

    /// Return a snapshot of all entries (newest last).
    pub fn snapshot(&self) -> Vec<EventEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
