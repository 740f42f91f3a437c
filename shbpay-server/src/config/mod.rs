//! Configuration loading for shbpay-server.
//!
//! Non-secret settings come from a TOML file (missing file = defaults);
//! secrets come from the environment: `DATABASE_URL`, `RAZORPAY_KEY_ID`,
//! `RAZORPAY_KEY_SECRET`, `RAZORPAY_WEBHOOK_SECRET`. Everything is
//! validated here, at startup — a missing secret never becomes a
//! per-request 500.

pub mod file;

use crate::config::file::{CheckoutConfig, FileConfig, MerchantConfig, ServerConfig};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub merchant: MerchantConfig,
    pub checkout: CheckoutConfig,
    pub gateway: GatewayConfig,
}

/// Gateway API root plus the three server-held secrets.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_base_url: String,
    /// Public key id; safe to hand to the browser for the checkout widget.
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
}

/// Load and validate the full configuration.
pub fn load(
    config_path: impl AsRef<Path>,
    listen_override: Option<SocketAddr>,
) -> Result<AppConfig, ConfigError> {
    let path = config_path.as_ref();
    let mut file_config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        toml::from_str::<FileConfig>(&content)?
    } else {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        FileConfig::default()
    };

    if let Some(listen) = listen_override {
        file_config.server.listen = listen;
    }

    let gateway = GatewayConfig {
        api_base_url: file_config.gateway.api_base_url,
        key_id: require_env("RAZORPAY_KEY_ID")?,
        key_secret: require_env("RAZORPAY_KEY_SECRET")?,
        webhook_secret: require_env("RAZORPAY_WEBHOOK_SECRET")?,
    };

    Ok(AppConfig {
        server: file_config.server,
        merchant: file_config.merchant,
        checkout: file_config.checkout,
        gateway,
    })
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingEnv(name))
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
