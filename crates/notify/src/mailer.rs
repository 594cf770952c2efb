//! Mail delivery backends.

use crate::batch::NotificationBatch;
use crate::error::{NotifyError, NotifyResult};
use crate::message::{SUBJECT, render_html, render_text};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use parcel_core::config::NotificationConfig;
use tracing::instrument;

/// Something that can deliver a notification batch.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Deliver one batch. An error means nobody received it.
    async fn send(&self, batch: &NotificationBatch) -> NotifyResult<()>;
}

/// SMTP sender: one connection per batch, closed after sending.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
    server: String,
    port: u16,
}

fn parse_address(raw: &str) -> NotifyResult<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|source| NotifyError::Address {
            address: raw.to_string(),
            source,
        })
}

impl SmtpMailer {
    /// Build the transport and parse every address.
    ///
    /// Fails on a missing server or sender and on malformed addresses, so a
    /// broken configuration is caught at startup rather than at the first tick.
    pub fn from_config(config: &NotificationConfig) -> NotifyResult<Self> {
        let server = config
            .server_address
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| NotifyError::Config("server_address is not set".to_string()))?;
        let sender = config
            .sender_email
            .as_deref()
            .ok_or_else(|| NotifyError::Config("sender_email is not set".to_string()))?;

        let from = Mailbox::new(Some(config.sender_name.clone()), parse_address(sender)?);
        let to = config
            .recipient_list()
            .iter()
            .map(|r| parse_address(r).map(|addr| Mailbox::new(None, addr)))
            .collect::<NotifyResult<Vec<_>>>()?;
        if to.is_empty() {
            return Err(NotifyError::Config("no recipients configured".to_string()));
        }

        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(server)?
        } else {
            let tls = TlsParameters::new(server.to_string())?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(server)
                .tls(Tls::Opportunistic(tls))
        };
        builder = builder.port(config.server_port);
        if let Some((username, password)) = config.credentials() {
            builder = builder.credentials(Credentials::new(
                username.to_string(),
                password.to_string(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
            server: server.to_string(),
            port: config.server_port,
        })
    }

    /// Compose the multipart message for `batch`.
    pub fn build_message(&self, batch: &NotificationBatch) -> NotifyResult<Message> {
        let mut builder = Message::builder().from(self.from.clone()).subject(SUBJECT);
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }
        let message = builder.multipart(MultiPart::alternative_plain_html(
            render_text(batch),
            render_html(batch),
        ))?;
        Ok(message)
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    #[instrument(skip(self, batch), fields(server = %self.server, port = self.port, files = batch.file_count()))]
    async fn send(&self, batch: &NotificationBatch) -> NotifyResult<()> {
        let message = self.build_message(batch)?;
        self.transport.send(message).await?;
        Ok(())
    }
}
