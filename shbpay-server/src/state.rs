//! Application state shared across all request handlers.

use crate::config::AppConfig;
use shbpay_gateway::client::RazorpayClient;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc
/// or pooled).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Gateway HTTP client holding the server credentials.
    pub gateway: RazorpayClient,
    /// Immutable configuration, validated at startup.
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState.
    pub fn new(db: PgPool, gateway: RazorpayClient, config: AppConfig) -> Self {
        Self {
            db,
            gateway,
            config: Arc::new(config),
        }
    }
}
