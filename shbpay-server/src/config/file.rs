//! TOML file configuration structures.
//!
//! These structs directly map to the `shbpay-config.toml` file format.
//! Every section and field has a default, so a missing or empty file
//! yields a usable configuration (secrets come from the environment, not
//! from this file).

use serde::Deserialize;
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub merchant: MerchantConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub gateway: GatewayFileConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Merchant configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct MerchantConfig {
    /// Display name shown in the checkout widget.
    #[serde(default = "default_merchant_name")]
    pub name: String,
    /// Browser origins allowed to call the checkout endpoints.
    /// Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for MerchantConfig {
    fn default() -> Self {
        Self {
            name: default_merchant_name(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_merchant_name() -> String {
    "Shabdashri".to_owned()
}

/// Checkout policy section.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    /// Currency code sent to the gateway.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Minimum chargeable amount in minor units; the gateway refuses
    /// charges below its own floor, so reject early with a clear error.
    #[serde(default = "default_min_amount_minor")]
    pub min_amount_minor: i64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            min_amount_minor: default_min_amount_minor(),
        }
    }
}

fn default_currency() -> String {
    "INR".to_owned()
}

fn default_min_amount_minor() -> i64 {
    1000
}

/// Gateway section. Credentials are environment-only; the file carries
/// just the API root (overridable for sandbox endpoints).
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayFileConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for GatewayFileConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.razorpay.com/v1".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[merchant]
name = "Test Store"
allowed_origins = ["https://shop.example.com"]

[checkout]
currency = "INR"
min_amount_minor = 2000

[gateway]
api_base_url = "https://api.razorpay.com/v1"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.merchant.name, "Test Store");
        assert_eq!(config.merchant.allowed_origins.len(), 1);
        assert_eq!(config.checkout.min_amount_minor, 2000);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.merchant.name, "Shabdashri");
        assert!(config.merchant.allowed_origins.is_empty());
        assert_eq!(config.checkout.currency, "INR");
        assert_eq!(config.checkout.min_amount_minor, 1000);
        assert_eq!(config.gateway.api_base_url, "https://api.razorpay.com/v1");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: FileConfig = toml::from_str("[checkout]\nmin_amount_minor = 500\n").unwrap();
        assert_eq!(config.checkout.min_amount_minor, 500);
        assert_eq!(config.checkout.currency, "INR");
    }
}
