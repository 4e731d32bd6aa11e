use std::{sync::Arc, time::Duration};

use folio_core_contact_contracts::{ContactFeatureService, ContactSubmitError};
use folio_di::Build;
use folio_email_contracts::{ContentType, Email, EmailAttachment, EmailService};
use folio_models::{
    contact::{ContactForm, ContactSubmission},
    email_address::EmailAddressWithName,
};
use folio_templates_contracts::{ContactSubmissionTemplate, TemplateService};
use tracing::{error, info};

#[derive(Debug, Clone, Build)]
pub struct ContactFeatureServiceImpl<Email, Template> {
    email: Email,
    template: Template,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    pub recipient: Arc<EmailAddressWithName>,
    pub subject_prefix: Arc<str>,
    pub send_timeout: Duration,
}

impl<EmailS, Template> ContactFeatureService for ContactFeatureServiceImpl<EmailS, Template>
where
    EmailS: EmailService,
    Template: TemplateService,
{
    async fn submit(&self, form: ContactForm) -> Result<(), ContactSubmitError> {
        let submission = form.validate()?;
        let email = self.make_email(submission)?;

        let attachments = email.attachments.len();
        match tokio::time::timeout(self.config.send_timeout, self.email.send(email)).await {
            Ok(Ok(id)) => {
                info!(%id, attachments, "contact submission delivered");
                Ok(())
            }
            Ok(Err(err)) => {
                error!("Failed to deliver contact submission: {err}");
                Err(ContactSubmitError::Send)
            }
            Err(_) => {
                error!(
                    timeout = ?self.config.send_timeout,
                    "Delivery of contact submission timed out"
                );
                Err(ContactSubmitError::Send)
            }
        }
    }
}

impl<EmailS, Template> ContactFeatureServiceImpl<EmailS, Template>
where
    Template: TemplateService,
{
    fn make_email(&self, submission: ContactSubmission) -> anyhow::Result<Email> {
        let ContactSubmission {
            author,
            subject,
            message,
            attachments,
        } = submission;

        let body = self.template.render(&ContactSubmissionTemplate {
            name: author.name.into_inner(),
            email: author.email.to_string(),
            subject: (*subject).clone(),
            message: message.into_inner(),
        })?;

        Ok(Email {
            recipient: (*self.config.recipient).clone(),
            subject: format!("{}{}", self.config.subject_prefix, *subject),
            body,
            content_type: ContentType::Html,
            reply_to: Some(author.email.into()),
            attachments: attachments
                .into_iter()
                .map(|attachment| EmailAttachment {
                    filename: attachment.filename,
                    content_type: attachment.content_type.as_mime().into(),
                    content: attachment.content,
                })
                .collect(),
        })
    }
}
