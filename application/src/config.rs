//! [`Config`]-related definitions.

use std::time;

use common::Currency;
use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Automation platform configuration.
    pub automation: Automation,

    /// Demo mode configuration.
    pub demo: Demo,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default(SecretString::from("secret"))]
    pub jwt_secret: SecretString,

    /// [`Currency`] new quotes and invoices are priced in by default.
    pub currency: Currency,

    /// Bounds of waiting for a generated quote document.
    pub document_wait: DocumentWait,

    /// Service tasks configuration.
    pub tasks: Tasks,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            currency,
            document_wait,
            tasks: Tasks { follow_up_quotes },
        } = value;
        let secret = jwt_secret.expose_secret().as_bytes();
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            currency,
            document_wait: service::completion::WaitConfig {
                attempts: document_wait.attempts,
                interval: document_wait.interval,
            },
            follow_up_quotes: service::task::follow_up_quotes::Config {
                interval: follow_up_quotes.interval,
                follow_up_after: follow_up_quotes.follow_up_after,
            },
        }
    }
}

/// Bounds of waiting for a generated quote document.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct DocumentWait {
    /// Number of intervals to wait for before answering with a pending
    /// result.
    #[default(10)]
    pub attempts: u32,

    /// Interval after which the quote is re-read if the automation platform
    /// hasn't called back yet.
    #[default(time::Duration::from_millis(500))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,
}

/// Service tasks configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Tasks {
    /// `FollowUpQuotes` task configuration.
    pub follow_up_quotes: FollowUpQuotes,
}

/// `FollowUpQuotes` task configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct FollowUpQuotes {
    /// Task execution interval.
    #[default(time::Duration::from_secs(60 * 60 * 24))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,

    /// Time after which a sent quote without an answer is moved to the
    /// follow-up column.
    #[default(time::Duration::from_secs(60 * 60 * 24 * 14))]
    #[serde(with = "humantime_serde")]
    pub follow_up_after: time::Duration,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default(SecretString::from("postgres"))]
    pub password: SecretString,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password.expose_secret().to_owned()),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Automation platform configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Automation {
    /// URL of the webhook generating quote documents.
    ///
    /// Document generation is unavailable if not set.
    pub generate_document_url: Option<String>,

    /// URL of the webhook sending emails.
    ///
    /// Sending quotes is unavailable if not set.
    pub send_email_url: Option<String>,

    /// Timeout of a webhook call.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,

    /// Timeout of a document generation webhook call.
    #[default(time::Duration::from_secs(60))]
    #[serde(with = "humantime_serde")]
    pub generate_document_timeout: time::Duration,

    /// Token the automation platform must present when calling back.
    ///
    /// Callbacks are refused if not set.
    pub callback_token: Option<SecretString>,
}

impl From<&Automation> for service::infra::automation::webhooks::Config {
    fn from(value: &Automation) -> Self {
        Self {
            generate_document_url: value.generate_document_url.clone(),
            send_email_url: value.send_email_url.clone(),
            timeout: value.timeout,
            generate_document_timeout: value.generate_document_timeout,
        }
    }
}

/// Demo mode configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Demo {
    /// Indicator whether anonymous requests are served as a read-only demo.
    pub enabled: bool,
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use secrecy::ExposeSecret as _;

    use super::Config;

    #[test]
    fn has_sane_defaults() {
        let conf = Config::default();

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.service.document_wait.attempts, 10);
        assert_eq!(
            conf.service.tasks.follow_up_quotes.follow_up_after,
            Duration::from_secs(14 * 24 * 60 * 60),
        );
        assert_eq!(
            conf.automation.generate_document_timeout,
            Duration::from_secs(60),
        );
        assert!(conf.automation.callback_token.is_none());
        assert!(!conf.demo.enabled);
        assert_eq!(conf.postgres.password.expose_secret(), "postgres");
    }

    #[test]
    fn secrets_are_redacted() {
        let conf = Config::default();

        let printed = format!("{:?}", conf.service);
        assert!(!printed.contains("secret\""), "{printed}");
    }
}
