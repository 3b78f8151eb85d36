//! Flightwatch server
//!
//! Run with: cargo run
//!
//! Configuration comes from `FLIGHTWATCH_*` environment variables (see
//! `flightwatch::config`). RUST_LOG sets the log level (default: info).

use flightwatch::alerts::AlertStatus;
use flightwatch::api::run_server;
use flightwatch::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flightwatch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    tracing::info!("Flightwatch configuration:");
    tracing::info!("  Host: {}:{}", settings.host, settings.port);
    match &settings.store_dir {
        Some(dir) => tracing::info!("  Store: {}", dir.display()),
        None => tracing::info!("  Store: in-memory"),
    }
    tracing::info!("  Lookup API: {}", settings.lookup_url);
    tracing::info!(
        "  Notifier: {}",
        if settings.telegram_token.is_some() { "telegram" } else { "log" }
    );
    tracing::info!(
        "  Freeze horizon: {} days, diff tolerance: {} seconds",
        settings.policy.freeze_horizon_days,
        settings.policy.diff_tolerance_secs
    );
    for status in AlertStatus::ALL {
        let s = settings.sweeper(status);
        tracing::info!(
            "  {} sweeper: every {:?}, pool {}, timeout {:?}",
            status,
            s.interval,
            s.pool_size,
            s.sweep_timeout
        );
    }

    run_server(settings).await
}
