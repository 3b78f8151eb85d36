use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{create_alert, delete_alert, get_alert, health_check, stats, AppState};
use crate::alerts::{ActiveProcessor, AlertProcessor, FrozenProcessor, QueuedProcessor};
use crate::config::Settings;
use crate::context::AlertContext;
use crate::lookup::Fr24Client;
use crate::notify::{LogNotifier, Notifier, TelegramNotifier};
use crate::store::{AlertStore, JsonFileStore, MemoryStore};
use crate::sweep::Sweeper;

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/alerts", post(create_alert))
        .route("/alerts/:id", get(get_alert).delete(delete_alert))
        .route("/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

fn open_store(settings: &Settings) -> Result<Arc<dyn AlertStore>, Box<dyn std::error::Error>> {
    Ok(match &settings.store_dir {
        Some(dir) => {
            let store = JsonFileStore::open(dir)?;
            tracing::info!("Using JSON file store at {}", store.data_dir().display());
            Arc::new(store)
        }
        None => {
            tracing::warn!("No store directory configured, alerts are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    })
}

fn build_notifier(settings: &Settings) -> Result<Arc<dyn Notifier>, Box<dyn std::error::Error>> {
    Ok(match &settings.telegram_token {
        Some(token) => Arc::new(TelegramNotifier::new(token.clone(), settings.http_timeout)?),
        None => {
            tracing::warn!("No Telegram token configured, notifications are only logged");
            Arc::new(LogNotifier)
        }
    })
}

/// Run the sweepers and the intake API until Ctrl+C
pub async fn run_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&settings)?;
    let lookup = Arc::new(Fr24Client::new(settings.lookup_config())?);
    let notifier = build_notifier(&settings)?;
    let ctx = AlertContext::new(Arc::clone(&store), lookup, notifier, settings.policy);

    let processors: [Arc<dyn AlertProcessor>; 3] = [
        Arc::new(QueuedProcessor),
        Arc::new(FrozenProcessor),
        Arc::new(ActiveProcessor),
    ];
    let mut sweepers: Vec<Sweeper> = processors
        .into_iter()
        .map(|processor| {
            let sweeper_settings = settings.sweeper(processor.status());
            Sweeper::new(ctx.clone(), processor, sweeper_settings)
        })
        .collect();
    let handles: Vec<_> = sweepers.iter_mut().map(|s| s.start()).collect();

    let state = Arc::new(AppState {
        store,
        reports: sweepers.iter().map(|s| s.report_handle()).collect(),
    });
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    tracing::info!("Starting flightwatch intake API on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, stopping sweepers...");
    for sweeper in &mut sweepers {
        sweeper.stop().await;
    }
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Sweeper task ended abnormally");
        }
    }

    tracing::info!("flightwatch stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    }
}
