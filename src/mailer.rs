//! Delivery of the daily words email over SMTP.

use crate::{
    configuration::EmailClientSettings, domain::SubscriberEmail, email_template::RenderedEmail,
};
use async_trait::async_trait;
use lettre::{
    address::AddressError,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

/// Sends a single email to a single recipient.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, recipient: &SubscriberEmail, email: &RenderedEmail)
        -> Result<(), MailError>;
}

/// SMTP mailer authenticating with the sender's address and secret over
/// STARTTLS. A new connection is opened for every message.
#[derive(Debug)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    sender: Mailbox,
    password: Secret<String>,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(
        host: String,
        port: u16,
        sender: SubscriberEmail,
        password: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, MailError> {
        let sender = sender.as_ref().parse().map_err(MailError::InvalidMailbox)?;
        Ok(Self {
            host,
            port,
            sender,
            password,
            timeout,
        })
    }

    fn build_message(
        &self,
        recipient: &SubscriberEmail,
        email: &RenderedEmail,
    ) -> Result<Message, MailError> {
        let to: Mailbox = recipient
            .as_ref()
            .parse()
            .map_err(MailError::InvalidMailbox)?;

        Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(email.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                email.html_body.clone(),
            ))
            .map_err(MailError::Build)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let credentials = Credentials::new(
            self.sender.email.to_string(),
            self.password.expose_secret().clone(),
        );

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
                .map_err(MailError::Smtp)?
                .port(self.port)
                .credentials(credentials)
                .timeout(Some(self.timeout))
                .build(),
        )
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[tracing::instrument(name = "Send email over SMTP", skip(self, email))]
    async fn send(
        &self,
        recipient: &SubscriberEmail,
        email: &RenderedEmail,
    ) -> Result<(), MailError> {
        let message = self.build_message(recipient, email)?;
        self.transport()?
            .send(message)
            .await
            .map_err(MailError::Smtp)?;

        Ok(())
    }
}

impl TryFrom<&EmailClientSettings> for SmtpMailer {
    type Error = String;

    fn try_from(config: &EmailClientSettings) -> Result<Self, Self::Error> {
        Self::new(
            config.smtp_host().clone(),
            *config.smtp_port(),
            config.sender()?,
            config.sender_password().clone(),
            config.timeout(),
        )
        .map_err(|e| {
            tracing::error!("Unable to create the SMTP mailer: {e}");
            "Sender email is not a valid mailbox".to_string()
        })
    }
}

/// Outcome of delivering one email to many recipients.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    pub failed: Vec<FailedDelivery>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FailedDelivery {
    pub address: String,
    pub reason: String,
}

/// Send `email` to every recipient one after the other. A failure for one
/// recipient is recorded in the report and does not stop the others.
#[tracing::instrument(
    name = "Deliver email to all recipients",
    skip_all,
    fields(recipients = recipients.len())
)]
pub async fn deliver_to_all(
    mailer: &dyn Mailer,
    recipients: &[SubscriberEmail],
    email: &RenderedEmail,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for recipient in recipients {
        match mailer.send(recipient, email).await {
            Ok(()) => {
                tracing::info!(subscriber_email = %recipient, "Email delivered");
                report.delivered.push(recipient.to_string());
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    subscriber_email = %recipient,
                    "Failed to deliver the email to a subscriber. Skipping",
                );
                report.failed.push(FailedDelivery {
                    address: recipient.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

#[derive(thiserror::Error)]
pub enum MailError {
    #[error("Not a valid mailbox")]
    InvalidMailbox(#[source] AddressError),
    #[error("Failed to build the email message")]
    Build(#[source] lettre::error::Error),
    #[error("The mail relay failed to deliver the message")]
    Smtp(#[source] lettre::transport::smtp::Error),
}
