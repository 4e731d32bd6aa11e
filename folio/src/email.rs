use anyhow::{ensure, Context};
use folio_config::{EmailConfig, EmailProvider};
use folio_email_impl::{EmailServiceImpl, ResendEmailService, SmtpEmailService};

/// Set up the configured email provider
pub fn connect(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    match config.provider {
        EmailProvider::Resend => {
            let resend = config
                .resend
                .as_ref()
                .context("Missing [email.resend] config")?;
            ensure!(
                !resend.api_key.is_empty(),
                "No Resend API key configured (set FOLIO__EMAIL__RESEND__API_KEY)"
            );
            ResendEmailService::new(
                resend.api_url.clone(),
                resend.api_key.clone(),
                config.from.clone(),
            )
            .map(Into::into)
            .context("Failed to create Resend client")
        }
        EmailProvider::Smtp => {
            let smtp = config
                .smtp
                .as_ref()
                .context("Missing [email.smtp] config")?;
            SmtpEmailService::new(&smtp.url, config.from.clone())
                .map(Into::into)
                .context("Failed to connect to SMTP server")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use folio_config::DEFAULT_CONFIG_PATH;

    use super::*;

    #[test]
    fn resend_requires_api_key() {
        let config = folio_config::load_dev_config().unwrap();
        assert!(connect(&config.email).is_err());
    }

    #[test]
    fn resend() {
        let config = folio_config::load_with_override(
            &[Path::new(DEFAULT_CONFIG_PATH)],
            &[r#"email.resend.api_key = "re_test""#],
        )
        .unwrap();

        let email = connect(&config.email).unwrap();

        assert_eq!(email.provider_name(), "resend");
    }

    #[tokio::test]
    async fn smtp() {
        let config = folio_config::load_with_override(
            &[Path::new(DEFAULT_CONFIG_PATH)],
            &[r#"email = { provider = "smtp", smtp = { url = "smtp://localhost:2525" } }"#],
        )
        .unwrap();

        let email = connect(&config.email).unwrap();

        assert_eq!(email.provider_name(), "smtp");
    }
}
