//! Test doubles for mail delivery.

use crate::batch::NotificationBatch;
use crate::error::{NotifyError, NotifyResult};
use crate::mailer::MailSender;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Sender that records every batch instead of talking to a server.
#[derive(Default)]
pub struct RecordingSender {
    batches: Mutex<Vec<NotificationBatch>>,
    calls: AtomicUsize,
    failures_left: AtomicUsize,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next `n` sends fail.
    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// Number of send attempts, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Successfully delivered batches.
    pub fn batches(&self) -> Vec<NotificationBatch> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl MailSender for RecordingSender {
    async fn send(&self, batch: &NotificationBatch) -> NotifyResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(NotifyError::Config("simulated delivery failure".to_string()));
        }
        self.batches.lock().push(batch.clone());
        Ok(())
    }
}
