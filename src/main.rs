//! Vigil Server
//!
//! Run with: cargo run
//!
//! Configuration:
//! - VIGIL_CONFIG: Path to a YAML configuration file (optional)
//! - VIGIL_HOST / VIGIL_PORT: Bind address (default: 0.0.0.0:8080)
//! - VIGIL_INTERVAL: Check-in deadline in seconds (default: 60)
//! - VIGIL_SENDER: slack | pagerduty | teams | telegram | generic
//! - VIGIL_SLACK_WEBHOOK, VIGIL_PAGERDUTY_KEY, VIGIL_TEAMS_WEBHOOK,
//!   VIGIL_TELEGRAM_TOKEN, VIGIL_TELEGRAM_CHAT_ID, VIGIL_HTTP_ENDPOINT:
//!   per-transport credentials
//! - RUST_LOG: Log level (default: info)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil::api::run_server;
use vigil::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting vigil {}", env!("CARGO_PKG_VERSION"));

    // Unparseable configuration aborts before any traffic is served
    let config = Config::load()?;

    tracing::info!("Vigil configuration:");
    tracing::info!("  Listen: {}:{}", config.host, config.port);
    tracing::info!("  Deadline interval: {}s", config.interval);
    tracing::info!("  Sender: {}", config.sender);
    if !config.environment.is_empty() {
        tracing::info!("  Environment: {}", config.environment);
    }
    tracing::info!("  Notify timeout: {}s", config.notify_timeout);

    run_server(config).await
}
