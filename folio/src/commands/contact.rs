use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::Subcommand;
use folio_config::Config;
use folio_core_contact_contracts::{ContactFeatureService, ContactSubmitError};
use folio_di::Provides;
use folio_models::contact::{ContactForm, ContactValidationError, RawAttachment};
use tracing::info;

use crate::{
    email,
    environment::{types::ContactFeature, ConfigProvider, Provider},
};

#[derive(Debug, Subcommand)]
pub enum ContactCommand {
    /// Submit a contact form to the configured recipient
    Send {
        /// Name of the sender
        #[arg(long)]
        name: String,
        /// Email address of the sender
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        /// Files to attach
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
}

impl ContactCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            ContactCommand::Send {
                name,
                email,
                subject,
                message,
                files,
            } => {
                let mut attachments = Vec::with_capacity(files.len());
                for path in &files {
                    attachments.push(read_attachment(path).await?);
                }

                send(
                    config,
                    ContactForm {
                        name,
                        email,
                        subject,
                        message,
                        files: attachments,
                    },
                )
                .await
            }
        }
    }
}

async fn send(config: Config, form: ContactForm) -> anyhow::Result<()> {
    // reject invalid input before connecting to the provider
    form.clone().validate().map_err(validation_error)?;

    let email = email::connect(&config.email)?;
    let mut provider = Provider::new(ConfigProvider::new(&config), email);
    let contact: ContactFeature = provider.provide();

    match contact.submit(form).await {
        Ok(()) => {
            info!("Message sent successfully!");
            Ok(())
        }
        Err(ContactSubmitError::Validation(err)) => Err(validation_error(err)),
        Err(ContactSubmitError::Send) => Err(anyhow!("Failed to send message")),
        Err(ContactSubmitError::Other(err)) => Err(err),
    }
}

async fn read_attachment(path: &Path) -> anyhow::Result<RawAttachment> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = mime_guess::from_path(path).first_or_octet_stream();

    Ok(RawAttachment::new(
        filename,
        content_type.essence_str(),
        content,
    ))
}

fn validation_error(err: ContactValidationError) -> anyhow::Error {
    match err {
        ContactValidationError::Fields(errors) => {
            let details = errors
                .iter()
                .map(|err| format!("{}: {}", err.field, err.message))
                .collect::<Vec<_>>()
                .join(", ");
            anyhow!("Validation failed ({details})")
        }
        err => err.into(),
    }
}
