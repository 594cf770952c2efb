//! Notification aggregator and the startup-selected delivery strategy.

use crate::batch::NotificationBatch;
use crate::error::{NotifyError, NotifyResult};
use crate::mailer::{MailSender, SmtpMailer};
use crate::pending::{PendingEntry, PendingNotifications};
use parcel_core::SessionId;
use parcel_core::config::NotificationConfig;
use std::sync::Arc;
use time::OffsetDateTime;

/// Result of one drain-and-deliver pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Nothing was pending; no mail server was contacted.
    NothingToSend,
    /// The batch was handed to the mail server.
    Delivered { sessions: usize, files: usize },
    /// Sending failed; see the error log.
    Failed,
}

impl DeliveryOutcome {
    pub fn is_delivered(self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NothingToSend => "empty",
            Self::Delivered { .. } => "delivered",
            Self::Failed => "failed",
        }
    }
}

/// Most entries kept for retry after failed deliveries.
pub const DEFAULT_REQUEUE_LIMIT: usize = 10_000;

/// Collects uploads and periodically mails a summary of them.
pub struct Aggregator {
    pending: PendingNotifications,
    sender: Arc<dyn MailSender>,
    requeue_on_failure: bool,
    requeue_limit: usize,
}

impl Aggregator {
    pub fn new(sender: Arc<dyn MailSender>, requeue_on_failure: bool) -> Self {
        Self {
            pending: PendingNotifications::new(),
            sender,
            requeue_on_failure,
            requeue_limit: DEFAULT_REQUEUE_LIMIT,
        }
    }

    /// Cap the entries put back after a failed delivery.
    pub fn with_requeue_limit(mut self, limit: usize) -> Self {
        self.requeue_limit = limit;
        self
    }

    /// Record a stored upload. Never blocks on I/O and never fails.
    pub fn register(&self, session: &SessionId, file_name: &str) {
        self.pending
            .register(PendingEntry::new(session.clone(), file_name));
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Take every pending entry and mail them as one batch.
    ///
    /// Entries are removed before sending. A failed batch goes back into the
    /// queue only when `requeue_on_failure` is set.
    pub async fn drain_and_deliver(&self) -> DeliveryOutcome {
        let entries = self.pending.drain();
        let Some(batch) = NotificationBatch::from_entries(entries, OffsetDateTime::now_utc())
        else {
            tracing::debug!("No uploads to report");
            return DeliveryOutcome::NothingToSend;
        };

        let sessions = batch.session_count();
        let files = batch.file_count();

        match self.sender.send(&batch).await {
            Ok(()) => {
                tracing::info!(sessions, files, "Upload notification sent");
                DeliveryOutcome::Delivered { sessions, files }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    sessions,
                    files,
                    requeued = self.requeue_on_failure,
                    "Failed to send upload notification"
                );
                if self.requeue_on_failure {
                    let dropped = self
                        .pending
                        .requeue(batch.into_entries(), self.requeue_limit);
                    if dropped > 0 {
                        tracing::warn!(
                            dropped,
                            limit = self.requeue_limit,
                            "Retry backlog full, oldest upload notifications discarded"
                        );
                    }
                }
                DeliveryOutcome::Failed
            }
        }
    }
}

/// Delivery strategy chosen once at startup.
#[derive(Clone)]
pub enum Notifier {
    /// Notifications are off: registration is a no-op and nothing is sent.
    Disabled,
    /// Notifications are on and delivered through the aggregator's sender.
    Enabled(Arc<Aggregator>),
}

impl Notifier {
    /// Select the strategy from configuration.
    pub fn from_config(config: &NotificationConfig) -> NotifyResult<Self> {
        if !config.enabled {
            return Ok(Self::Disabled);
        }
        config.validate().map_err(NotifyError::Config)?;
        let mailer = SmtpMailer::from_config(config)?;
        Ok(Self::with_sender(
            Arc::new(mailer),
            config.requeue_on_failure,
        ))
    }

    /// Enabled notifier around an arbitrary sender.
    pub fn with_sender(sender: Arc<dyn MailSender>, requeue_on_failure: bool) -> Self {
        Self::Enabled(Arc::new(Aggregator::new(sender, requeue_on_failure)))
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub fn register(&self, session: &SessionId, file_name: &str) {
        if let Self::Enabled(aggregator) = self {
            aggregator.register(session, file_name);
        }
    }

    pub fn pending_len(&self) -> usize {
        match self {
            Self::Disabled => 0,
            Self::Enabled(aggregator) => aggregator.pending_len(),
        }
    }

    pub async fn drain_and_deliver(&self) -> DeliveryOutcome {
        match self {
            Self::Disabled => DeliveryOutcome::NothingToSend,
            Self::Enabled(aggregator) => aggregator.drain_and_deliver().await,
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("Notifier::Disabled"),
            Self::Enabled(aggregator) => f
                .debug_struct("Notifier::Enabled")
                .field("pending", &aggregator.pending_len())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSender;

    fn session(id: &str) -> SessionId {
        SessionId::from(id)
    }

    #[tokio::test]
    async fn empty_drain_does_not_call_sender() {
        let sender = RecordingSender::new();
        let notifier = Notifier::with_sender(sender.clone(), true);

        assert_eq!(
            notifier.drain_and_deliver().await,
            DeliveryOutcome::NothingToSend
        );
        assert_eq!(sender.calls(), 0);
    }

    #[tokio::test]
    async fn delivers_registered_entries_grouped() {
        let sender = RecordingSender::new();
        let notifier = Notifier::with_sender(sender.clone(), true);

        notifier.register(&session("abc"), "x.gpg");
        notifier.register(&session("def"), "y.gpg");
        notifier.register(&session("abc"), "x.gpg");

        let outcome = notifier.drain_and_deliver().await;
        assert_eq!(outcome, DeliveryOutcome::Delivered { sessions: 2, files: 3 });

        let batches = sender.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].sessions[0].files, vec!["x.gpg", "x.gpg"]);
        assert_eq!(batches[0].sessions[1].files, vec!["y.gpg"]);
    }

    #[tokio::test]
    async fn consecutive_drains_never_repeat_entries() {
        let sender = RecordingSender::new();
        let notifier = Notifier::with_sender(sender.clone(), true);

        notifier.register(&session("abc"), "x.gpg");
        assert!(notifier.drain_and_deliver().await.is_delivered());
        assert_eq!(
            notifier.drain_and_deliver().await,
            DeliveryOutcome::NothingToSend
        );

        notifier.register(&session("abc"), "y.gpg");
        assert!(notifier.drain_and_deliver().await.is_delivered());

        let batches = sender.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].sessions[0].files, vec!["x.gpg"]);
        assert_eq!(batches[1].sessions[0].files, vec!["y.gpg"]);
    }

    #[tokio::test]
    async fn failed_delivery_is_requeued_when_enabled() {
        let sender = RecordingSender::new();
        let notifier = Notifier::with_sender(sender.clone(), true);

        notifier.register(&session("abc"), "x.gpg");
        sender.fail_next(1);
        assert_eq!(notifier.drain_and_deliver().await, DeliveryOutcome::Failed);
        assert_eq!(notifier.pending_len(), 1);

        notifier.register(&session("def"), "y.gpg");
        assert_eq!(
            notifier.drain_and_deliver().await,
            DeliveryOutcome::Delivered { sessions: 2, files: 2 }
        );
        let batches = sender.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].sessions[0].session.as_str(), "abc");
    }

    #[tokio::test]
    async fn requeue_backlog_is_capped() {
        let sender = RecordingSender::new();
        let aggregator = Aggregator::new(sender.clone(), true).with_requeue_limit(2);

        for file in ["a.gpg", "b.gpg", "c.gpg"] {
            aggregator.register(&session("abc"), file);
        }
        sender.fail_next(1);
        assert_eq!(aggregator.drain_and_deliver().await, DeliveryOutcome::Failed);
        assert_eq!(aggregator.pending_len(), 2);

        aggregator.drain_and_deliver().await;
        assert_eq!(sender.batches()[0].sessions[0].files, vec!["b.gpg", "c.gpg"]);
    }

    #[tokio::test]
    async fn failed_delivery_is_dropped_without_requeue() {
        let sender = RecordingSender::new();
        let notifier = Notifier::with_sender(sender.clone(), false);

        notifier.register(&session("abc"), "x.gpg");
        sender.fail_next(1);
        assert_eq!(notifier.drain_and_deliver().await, DeliveryOutcome::Failed);
        assert_eq!(notifier.pending_len(), 0);
        assert_eq!(
            notifier.drain_and_deliver().await,
            DeliveryOutcome::NothingToSend
        );
    }

    #[tokio::test]
    async fn disabled_notifier_ignores_everything() {
        let notifier = Notifier::Disabled;
        notifier.register(&session("abc"), "x.gpg");
        assert_eq!(notifier.pending_len(), 0);
        assert_eq!(
            notifier.drain_and_deliver().await,
            DeliveryOutcome::NothingToSend
        );
        assert!(!notifier.drain_and_deliver().await.is_delivered());
    }

    #[test]
    fn from_config_disabled_ignores_other_fields() {
        let config = NotificationConfig {
            enabled: false,
            recipients: Some("not-an-address".to_string()),
            ..Default::default()
        };
        assert!(!Notifier::from_config(&config).unwrap().is_enabled());
    }

    #[test]
    fn from_config_rejects_invalid_enabled_config() {
        let config = NotificationConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(matches!(
            Notifier::from_config(&config),
            Err(NotifyError::Config(_))
        ));
    }
}
