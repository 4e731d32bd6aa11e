use folio_email_contracts::{DeliveryId, Email, EmailSendError, EmailService};

pub use resend::ResendEmailService;
pub use smtp::SmtpEmailService;

mod http;
pub mod resend;
pub mod smtp;

/// The email provider selected by the configuration.
#[derive(Debug, Clone)]
pub enum EmailServiceImpl {
    Resend(ResendEmailService),
    Smtp(SmtpEmailService),
}

impl EmailServiceImpl {
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Resend(_) => "resend",
            Self::Smtp(_) => "smtp",
        }
    }

    #[cfg(feature = "dummy")]
    pub fn dummy() -> Self {
        ResendEmailService::new(
            "http://127.0.0.1:1/".parse().unwrap(),
            "dummy-api-key".into(),
            "dummy@example.com".parse().unwrap(),
        )
        .unwrap()
        .into()
    }
}

impl From<ResendEmailService> for EmailServiceImpl {
    fn from(value: ResendEmailService) -> Self {
        Self::Resend(value)
    }
}

impl From<SmtpEmailService> for EmailServiceImpl {
    fn from(value: SmtpEmailService) -> Self {
        Self::Smtp(value)
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> Result<DeliveryId, EmailSendError> {
        match self {
            Self::Resend(service) => service.send(email).await,
            Self::Smtp(service) => service.send(email).await,
        }
    }

    async fn ping(&self) -> anyhow::Result<()> {
        match self {
            Self::Resend(service) => service.ping().await,
            Self::Smtp(service) => service.ping().await,
        }
    }
}
