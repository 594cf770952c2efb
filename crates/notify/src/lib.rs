//! Upload notifications for the parcel file exchange.
//!
//! This crate provides:
//! - A concurrent collection of pending (session, file) entries
//! - Grouping of drained entries into one batch per delivery
//! - HTML and plain-text rendering of the summary mail
//! - The delivery strategy selected at startup: disabled or SMTP

pub mod batch;
pub mod error;
pub mod mailer;
pub mod message;
pub mod notifier;
pub mod pending;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use batch::{NotificationBatch, SessionFiles};
pub use error::{NotifyError, NotifyResult};
pub use mailer::{MailSender, SmtpMailer};
pub use notifier::{Aggregator, DeliveryOutcome, Notifier};
pub use pending::{PendingEntry, PendingNotifications};
