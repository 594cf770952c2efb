//! Drained entries grouped by session.

use crate::pending::PendingEntry;
use parcel_core::SessionId;
use std::collections::HashMap;
use time::OffsetDateTime;

/// Files stored for one session since the previous delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionFiles {
    pub session: SessionId,
    pub files: Vec<String>,
}

/// One delivery's worth of notifications.
///
/// Sessions appear in the order their first entry was registered and file
/// names keep their registration order. Duplicate registrations are kept.
#[derive(Clone, Debug)]
pub struct NotificationBatch {
    pub sessions: Vec<SessionFiles>,
    pub drained_at: OffsetDateTime,
}

impl NotificationBatch {
    /// Group drained entries. Returns `None` when there is nothing to send.
    pub fn from_entries(entries: Vec<PendingEntry>, drained_at: OffsetDateTime) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }

        let mut index: HashMap<SessionId, usize> = HashMap::new();
        let mut sessions: Vec<SessionFiles> = Vec::new();
        for entry in entries {
            let slot = *index.entry(entry.session.clone()).or_insert_with(|| {
                sessions.push(SessionFiles {
                    session: entry.session.clone(),
                    files: Vec::new(),
                });
                sessions.len() - 1
            });
            sessions[slot].files.push(entry.file_name);
        }

        Some(Self {
            sessions,
            drained_at,
        })
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn file_count(&self) -> usize {
        self.sessions.iter().map(|s| s.files.len()).sum()
    }

    /// Flatten back into entries, preserving grouping order.
    pub fn into_entries(self) -> Vec<PendingEntry> {
        self.sessions
            .into_iter()
            .flat_map(|group| {
                let session = group.session;
                group
                    .files
                    .into_iter()
                    .map(move |file| PendingEntry::new(session.clone(), file))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(session: &str, file: &str) -> PendingEntry {
        PendingEntry::new(SessionId::from(session), file)
    }

    #[test]
    fn empty_drain_is_nothing_to_send() {
        assert!(NotificationBatch::from_entries(Vec::new(), OffsetDateTime::now_utc()).is_none());
    }

    #[test]
    fn groups_by_session_in_registration_order() {
        let batch = NotificationBatch::from_entries(
            vec![
                entry("abc", "x.gpg"),
                entry("def", "y.gpg"),
                entry("abc", "z.gpg"),
                entry("abc", "x.gpg"),
            ],
            OffsetDateTime::now_utc(),
        )
        .unwrap();

        assert_eq!(batch.session_count(), 2);
        assert_eq!(batch.file_count(), 4);
        assert_eq!(batch.sessions[0].session.as_str(), "abc");
        assert_eq!(batch.sessions[0].files, vec!["x.gpg", "z.gpg", "x.gpg"]);
        assert_eq!(batch.sessions[1].session.as_str(), "def");
        assert_eq!(batch.sessions[1].files, vec!["y.gpg"]);
    }

    #[test]
    fn into_entries_keeps_everything() {
        let entries = vec![entry("abc", "x.gpg"), entry("def", "y.gpg"), entry("abc", "z.gpg")];
        let batch = NotificationBatch::from_entries(entries, OffsetDateTime::now_utc()).unwrap();
        let back = batch.into_entries();
        assert_eq!(
            back,
            vec![entry("abc", "x.gpg"), entry("abc", "z.gpg"), entry("def", "y.gpg")]
        );
    }
}
