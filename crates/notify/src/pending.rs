//! Concurrent collection of entries waiting for the next delivery.

use parcel_core::SessionId;
use parking_lot::Mutex;

/// One stored upload waiting to be reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEntry {
    pub session: SessionId,
    pub file_name: String,
}

impl PendingEntry {
    pub fn new(session: SessionId, file_name: impl Into<String>) -> Self {
        Self {
            session,
            file_name: file_name.into(),
        }
    }
}

/// Append-only bag of pending entries with an atomic take-all.
///
/// The lock is held only for a push or a pointer swap, never across I/O.
#[derive(Debug, Default)]
pub struct PendingNotifications {
    entries: Mutex<Vec<PendingEntry>>,
}

impl PendingNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry.
    pub fn register(&self, entry: PendingEntry) {
        self.entries.lock().push(entry);
    }

    /// Remove and return every entry present at the time of the call.
    pub fn drain(&self) -> Vec<PendingEntry> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Put previously drained entries back ahead of anything registered since.
    ///
    /// At most `limit` entries are put back; the oldest are dropped first.
    /// Returns how many were dropped.
    pub fn requeue(&self, mut entries: Vec<PendingEntry>, limit: usize) -> usize {
        let dropped = entries.len().saturating_sub(limit);
        entries.drain(..dropped);
        if entries.is_empty() {
            return dropped;
        }
        let mut guard = self.entries.lock();
        entries.append(&mut guard);
        *guard = entries;
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
