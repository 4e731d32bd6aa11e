use std::time::Duration;

use anyhow::Context;
use clap::Subcommand;
use folio_config::Config;
use folio_email_contracts::{ContentType, DeliveryId, Email, EmailService};
use folio_models::email_address::EmailAddressWithName;
use tracing::info;

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test { recipient: EmailAddressWithName },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: EmailAddressWithName) -> anyhow::Result<()> {
    let email_service = email::connect(&config.email)?;

    let id = send_test_email(&email_service, recipient, config.email.timeout.into()).await?;
    info!(%id, "Test email sent");

    Ok(())
}

async fn send_test_email(
    email_service: &impl EmailService,
    recipient: EmailAddressWithName,
    timeout: Duration,
) -> anyhow::Result<DeliveryId> {
    let email = Email {
        recipient,
        subject: "Email Deliverability Test".into(),
        body: "Email deliverability seems to be working!".into(),
        content_type: ContentType::Text,
        reply_to: None,
        attachments: Vec::new(),
    };

    let id = tokio::time::timeout(timeout, email_service.send(email))
        .await
        .with_context(|| format!("Email provider did not respond within {timeout:?}"))??;

    Ok(id)
}
