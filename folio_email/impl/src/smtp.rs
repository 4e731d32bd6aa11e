use std::{fmt, sync::Arc};

use anyhow::{anyhow, Context};
use folio_email_contracts::{ContentType, DeliveryId, Email, EmailSendError, EmailService};
use folio_models::email_address::EmailAddressWithName;
use folio_utils::Apply;
use lettre::{
    message::{header, Attachment, MessageBuilder, MultiPart, SinglePart},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Delivers emails through an SMTP relay.
#[derive(Clone)]
pub struct SmtpEmailService {
    from: Arc<EmailAddressWithName>,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl fmt::Debug for SmtpEmailService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpEmailService")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl SmtpEmailService {
    pub fn new(url: &str, from: EmailAddressWithName) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)
            .context("Invalid smtp url")?
            .build();

        Ok(Self {
            from: from.into(),
            transport,
        })
    }
}

impl EmailService for SmtpEmailService {
    async fn send(&self, email: Email) -> Result<DeliveryId, EmailSendError> {
        let message = build_message(&self.from, email)?;

        let response = self
            .transport
            .send(message)
            .await
            .context("Failed to send email via smtp")?;

        let text = response
            .message()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        if !response.is_positive() {
            return Err(EmailSendError::Rejected(format!(
                "{} {text}",
                response.code()
            )));
        }

        Ok(text.into())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

fn build_message(from: &EmailAddressWithName, email: Email) -> anyhow::Result<Message> {
    let builder = Message::builder()
        .from(from.0.clone())
        .to(email.recipient.0)
        .apply_map(email.reply_to.map(|x| x.0), MessageBuilder::reply_to)
        .subject(email.subject);

    if email.attachments.is_empty() {
        return builder
            .header(match email.content_type {
                ContentType::Text => header::ContentType::TEXT_PLAIN,
                ContentType::Html => header::ContentType::TEXT_HTML,
            })
            .body(email.body)
            .map_err(Into::into);
    }

    let body = match email.content_type {
        ContentType::Text => SinglePart::plain(email.body),
        ContentType::Html => SinglePart::html(email.body),
    };

    let mut multipart = MultiPart::mixed().singlepart(body);
    for attachment in email.attachments {
        let content_type = header::ContentType::parse(&attachment.content_type)
            .map_err(|err| anyhow!("Invalid attachment content type: {err}"))?;
        multipart = multipart
            .singlepart(Attachment::new(attachment.filename).body(attachment.content, content_type));
    }

    builder.multipart(multipart).map_err(Into::into)
}
