//! Configuration management

use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::AppError;
use crate::constants::{
    DEFAULT_ACQUIRE_TIMEOUT_MS, DEFAULT_EVENT_BUS_CAPACITY, DEFAULT_PROBE_TIMEOUT_MS,
    DEFAULT_SHARD_MAX_CONNECTIONS,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub shards: ShardSettings,
    pub billing: BillingSettings,
    pub telemetry: TelemetrySettings,
    pub event_bus: EventBusSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

/// One connection string per shard slot. Slot 0 is the primary shard; an
/// empty string marks a slot that is not configured.
#[derive(Debug, Deserialize, Clone)]
pub struct ShardSettings {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BillingSettings {
    /// Process webhooks from providers without a configured secret.
    /// Development only.
    #[serde(default)]
    pub allow_unsigned_webhooks: bool,
    #[serde(default)]
    pub providers: HashMap<String, WebhookProviderSettings>,
    /// Product id -> plan id overrides.
    #[serde(default)]
    pub product_plans: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WebhookProviderSettings {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_signature_header")]
    pub signature_header: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    pub filter: String,
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EventBusSettings {
    pub capacity: usize,
}

fn default_max_connections() -> u32 {
    DEFAULT_SHARD_MAX_CONNECTIONS
}

fn default_acquire_timeout_ms() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_MS
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

fn default_signature_header() -> String {
    "x-webhook-signature".to_string()
}

impl AppConfig {
    /// Defaults, then `config/default`, then `config/{APP_ENV}`, then
    /// `APP__`-prefixed environment variables.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("shards.urls")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "tenant-server")?
            .set_default("shards.max_connections", DEFAULT_SHARD_MAX_CONNECTIONS)?
            .set_default("shards.acquire_timeout_ms", DEFAULT_ACQUIRE_TIMEOUT_MS)?
            .set_default("shards.probe_timeout_ms", DEFAULT_PROBE_TIMEOUT_MS)?
            .set_default("billing.allow_unsigned_webhooks", false)?
            .set_default("telemetry.filter", "info")?
            .set_default("telemetry.json", true)?
            .set_default("event_bus.capacity", DEFAULT_EVENT_BUS_CAPACITY as u64)
    }

    /// Parse configuration from an inline TOML document on top of the
    /// built-in defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
