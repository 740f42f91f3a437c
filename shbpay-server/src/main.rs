//! Shabdashri payment server
//!
//! Server-side home of the storefront's payment order flow: gateway order
//! creation, client-reported checkout outcomes, webhook ingestion, and
//! status reconciliation.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use server::{build_router, run_server};
use shbpay_gateway::client::RazorpayClient;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Shabdashri payment server - payment order creation and reconciliation
#[derive(Parser, Debug)]
#[command(name = "shbpay-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./shbpay-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting shbpay-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file + environment secrets); a missing secret
    // fails here, before anything listens.
    let app_config = config::load(&args.config, args.listen).map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = app_config.server.listen;

    // Get database URL from environment
    let database_url = config::get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    // Run migrations if requested
    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    // Gateway HTTP client (server credentials never reach the browser)
    let gateway = RazorpayClient::new(
        app_config.gateway.api_base_url.clone(),
        app_config.gateway.key_id.clone(),
        app_config.gateway.key_secret.clone(),
    );

    // Create application state
    let state = AppState::new(db_pool.clone(), gateway, app_config);

    // Build the router
    let router = build_router(state)?;

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Close database connections gracefully
    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
