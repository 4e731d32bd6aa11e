use std::{
    fmt,
    net::IpAddr,
    path::{Path, PathBuf},
};

use anyhow::Context;
use config::{Environment, File, FileFormat};
use folio_models::email_address::EmailAddressWithName;
use serde::Deserialize;
use url::Url;

pub use duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Environment variable containing a colon separated list of additional
/// config files.
pub const CONFIG_PATHS_ENV: &str = "FOLIO_CONFIG";

const ENV_PREFIX: &str = "FOLIO";
const ENV_SEPARATOR: &str = "__";

/// Load the default config, the files listed in `FOLIO_CONFIG` and
/// overrides from `FOLIO__*` environment variables.
pub fn load() -> anyhow::Result<Config> {
    let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_PATH)];
    if let Ok(extra) = std::env::var(CONFIG_PATHS_ENV) {
        paths.extend(
            extra
                .split(':')
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        );
    }

    builder(&paths, &[])?
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .prefix_separator(ENV_SEPARATOR),
        )
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

/// Load only the default config file.
pub fn load_dev_config() -> anyhow::Result<Config> {
    load_with_override(&[Path::new(DEFAULT_CONFIG_PATH)], &[])
}

/// Load the given files and apply the inline toml snippets on top of them.
pub fn load_with_override(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
) -> anyhow::Result<Config> {
    builder(paths, overrides)?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

fn builder(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
) -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    Ok(overrides.iter().fold(builder, |builder, &content| {
        builder.add_source(File::from_str(content, FileFormat::Toml))
    }))
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub health: HealthConfig,
    pub sentry: Option<SentryConfig>,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Maximum size of a request body in bytes
    pub max_body_size: usize,
    pub real_ip: Option<HttpRealIpConfig>,
}

#[derive(Debug, Deserialize)]
pub struct HttpRealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    pub from: EmailAddressWithName,
    pub timeout: Duration,
    pub resend: Option<ResendConfig>,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    Resend,
    Smtp,
}

#[derive(Deserialize)]
pub struct ResendConfig {
    pub api_url: Url,
    pub api_key: String,
}

impl fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
pub struct SmtpConfig {
    pub url: String,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("url", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub recipient: EmailAddressWithName,
    pub subject_prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Deserialize)]
pub struct SentryConfig {
    pub dsn: Url,
}

#[cfg(test)]
mod tests {
    use folio_utils::assert_matches;

    use super::*;

    #[test]
    fn load_default_config() {
        let config = load_dev_config().unwrap();

        assert_eq!(config.http.max_body_size, 32 * 1024 * 1024);
        assert_eq!(config.email.provider, EmailProvider::Resend);
        assert_eq!(*config.email.timeout, std::time::Duration::from_secs(30));
        assert_eq!(config.contact.subject_prefix, "Portfolio Contact: ");
        assert!(config.email.resend.is_some());
        assert!(config.sentry.is_none());
    }

    #[test]
    fn overrides() {
        let config = load_with_override(
            &[Path::new(DEFAULT_CONFIG_PATH)],
            &[
                r#"
                [email]
                provider = "smtp"
                timeout = "1m 30s"

                [email.smtp]
                url = "smtp://localhost:2525"
                "#,
                r#"http.real_ip = { header = "X-Real-Ip", set_from = "127.0.0.1" }"#,
            ],
        )
        .unwrap();

        assert_eq!(config.email.provider, EmailProvider::Smtp);
        assert_eq!(*config.email.timeout, std::time::Duration::from_secs(90));
        assert_matches!(config.email.smtp, Some(SmtpConfig { url }) if url == "smtp://localhost:2525");
        assert_matches!(
            config.http.real_ip,
            Some(HttpRealIpConfig { header, .. }) if header == "X-Real-Ip"
        );
    }

    #[test]
    fn invalid_override() {
        let result = load_with_override(
            &[Path::new(DEFAULT_CONFIG_PATH)],
            &[r#"email.provider = "carrier-pigeon""#],
        );

        assert!(result.is_err());
    }

    #[test]
    fn missing_file() {
        let result = load_with_override(&[Path::new("/does/not/exist.toml")], &[]);

        assert!(result.is_err());
    }

    #[test]
    fn debug_hides_credentials() {
        let config = load_with_override(
            &[Path::new(DEFAULT_CONFIG_PATH)],
            &[r#"email.resend.api_key = "re_secret_123""#],
        )
        .unwrap();

        let debug = format!("{config:?}");

        assert!(!debug.contains("re_secret_123"));
    }
}
