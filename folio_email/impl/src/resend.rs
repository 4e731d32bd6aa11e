use std::{fmt, sync::Arc};

use anyhow::{anyhow, Context};
use base64::{prelude::BASE64_STANDARD, Engine};
use folio_email_contracts::{ContentType, DeliveryId, Email, EmailSendError, EmailService};
use folio_models::email_address::EmailAddressWithName;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::http::HttpClient;

/// Delivers emails through a Resend compatible HTTP API.
#[derive(Clone)]
pub struct ResendEmailService {
    client: HttpClient,
    base_url: Arc<Url>,
    emails_endpoint: Arc<Url>,
    api_key: Arc<str>,
    from: Arc<EmailAddressWithName>,
}

impl fmt::Debug for ResendEmailService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResendEmailService")
            .field("base_url", &self.base_url.as_str())
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl ResendEmailService {
    pub fn new(api_url: Url, api_key: String, from: EmailAddressWithName) -> anyhow::Result<Self> {
        let mut emails_endpoint = api_url.clone();
        emails_endpoint
            .path_segments_mut()
            .map_err(|()| anyhow!("Invalid Resend API url: {api_url}"))?
            .pop_if_empty()
            .push("emails");

        Ok(Self {
            client: HttpClient::new()?,
            base_url: api_url.into(),
            emails_endpoint: emails_endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
        })
    }
}

impl EmailService for ResendEmailService {
    async fn send(&self, email: Email) -> Result<DeliveryId, EmailSendError> {
        let from = self.from.to_string();
        let to = [email.recipient.to_string()];
        let reply_to = email.reply_to.as_ref().map(ToString::to_string);
        let (html, text) = match email.content_type {
            ContentType::Html => (Some(email.body.as_str()), None),
            ContentType::Text => (None, Some(email.body.as_str())),
        };
        let attachments = email
            .attachments
            .iter()
            .map(|attachment| SendEmailAttachment {
                filename: &attachment.filename,
                content: BASE64_STANDARD.encode(&attachment.content),
                content_type: &attachment.content_type,
            })
            .collect();

        let request = SendEmailRequest {
            from: &from,
            to: &to,
            subject: &email.subject,
            html,
            text,
            reply_to: reply_to.as_deref(),
            attachments,
        };

        trace!(
            endpoint = %self.emails_endpoint,
            attachments = email.attachments.len(),
            "sending email via resend"
        );

        let response = self
            .client
            .post((*self.emails_endpoint).clone())
            .bearer_auth(&*self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to the Resend API")?;

        let status = response.status();
        if status.is_success() {
            let SendEmailResponse { id } = response
                .json()
                .await
                .context("Failed to decode Resend API response")?;
            return Ok(id.into());
        }

        let error = response
            .json::<ErrorResponse>()
            .await
            .map(|error| format!("{} ({}): {}", error.name, error.status_code, error.message))
            .unwrap_or_else(|_| status.to_string());
        debug!(%status, %error, "resend rejected the email");

        Err(EmailSendError::Rejected(error))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.client
            .get((*self.base_url).clone())
            .send()
            .await
            .map(|_| ())
            .with_context(|| format!("Failed to reach the Resend API at {}", self.base_url))
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<SendEmailAttachment<'a>>,
}

#[derive(Serialize)]
struct SendEmailAttachment<'a> {
    filename: &'a str,
    content: String,
    content_type: &'a str,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    status_code: u16,
    name: String,
    message: String,
}
