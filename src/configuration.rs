use crate::{domain::SubscriberEmail, store::TableName};
use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::PgConnectOptions;
use std::time::Duration;

/// Retrive the configuration for the application.
///
/// Values from `configuration.yaml` can be overridden with environment
/// variables prefixed with `APP_`, using `__` to separate nested keys, e.g.
/// `APP_GENERATOR__API_KEY`. Secrets are expected to come from the
/// environment only.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    Config::builder()
        .add_source(File::new("configuration.yaml", FileFormat::Yaml))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

#[derive(Debug, serde::Deserialize, Getters)]
pub struct Settings {
    application: ApplicationSettings,
    database: DatabaseSettings,
    generator: GeneratorSettings,
    email_client: EmailClientSettings,
    campaign: CampaignSettings,
}

#[derive(Debug, serde::Deserialize, Getters)]
pub struct ApplicationSettings {
    host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, serde::Deserialize, Getters)]
pub struct DatabaseSettings {
    username: String,
    password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    port: u16,
    host: String,
    name: String,
    subscribers_table: String,
    word_pool_table: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    timeout_milliseconds: u64,
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
    }

    /// Connection options for the application database. Every statement is
    /// bounded by the configured timeout.
    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db()
            .database(&self.name)
            .options([("statement_timeout", self.timeout_milliseconds.to_string())])
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn subscribers_table_name(&self) -> Result<TableName, String> {
        TableName::parse(self.subscribers_table.clone())
    }

    pub fn word_pool_table_name(&self) -> Result<TableName, String> {
        TableName::parse(self.word_pool_table.clone())
    }
}

#[derive(Debug, serde::Deserialize, Getters)]
pub struct GeneratorSettings {
    #[getter(skip)]
    base_url: String,
    api_key: Secret<String>,
    model: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    timeout_milliseconds: u64,
}

impl GeneratorSettings {
    pub fn base_url(&self) -> Result<url::Url, url::ParseError> {
        url::Url::parse(&self.base_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Debug, serde::Deserialize, Getters)]
pub struct EmailClientSettings {
    smtp_host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    smtp_port: u16,
    sender_email: String,
    sender_password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.sender_email.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

/// Settings for the daily words email itself.
#[derive(Debug, Clone, serde::Deserialize, Getters)]
pub struct CampaignSettings {
    subject: String,
    unsubscribe_url: String,
}

impl CampaignSettings {
    pub fn new(subject: String, unsubscribe_url: String) -> Self {
        Self {
            subject,
            unsubscribe_url,
        }
    }
}
