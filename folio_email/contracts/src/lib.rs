use std::{fmt, future::Future};

use folio_models::email_address::EmailAddressWithName;
use nutype::nutype;
use thiserror::Error;

/// An email delivery provider.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    /// Deliver the email from the configured sender address.
    fn send(
        &self,
        email: Email,
    ) -> impl Future<Output = Result<DeliveryId, EmailSendError>> + Send;

    /// Check whether the provider is reachable.
    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddressWithName,
    pub subject: String,
    pub body: String,
    pub content_type: ContentType,
    pub reply_to: Option<EmailAddressWithName>,
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Html,
}

#[derive(Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl fmt::Debug for EmailAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailAttachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.content.len())
            .finish()
    }
}

/// Identifier the provider assigned to a delivered email.
#[nutype(derive(Debug, Clone, PartialEq, Eq, Deref, From, Display))]
pub struct DeliveryId(String);

#[derive(Debug, Error)]
pub enum EmailSendError {
    /// The provider refused to deliver the email.
    #[error("Email was rejected by the provider: {0}")]
    Rejected(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_send(mut self, email: Email, result: Result<DeliveryId, EmailSendError>) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_ping(mut self, result: bool) -> Self {
        self.expect_ping().once().return_once(move || {
            Box::pin(std::future::ready(if result {
                Ok(())
            } else {
                Err(anyhow::anyhow!("Failed to reach email provider"))
            }))
        });
        self
    }
}
