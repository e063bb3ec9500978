//! Confluence Signal Server
//!
//! Runs the periodic analysis scheduler and serves the HTTP status surface.

use confluence::config::AppConfig;
use confluence::core::http::{start_server, AppState};
use confluence::core::orchestrator::{OrchestratorConfig, SignalOrchestrator};
use confluence::core::scheduler::SignalScheduler;
use confluence::db::{seed_default_instruments, MemoryStore, PostgresStore, SignalRepository};
use confluence::logging;
use confluence::metrics::Metrics;
use confluence::services::market_data::MarketDataProvider;
use confluence::services::notifier::NotificationTransport;
use confluence::services::telegram::TelegramNotifier;
use confluence::services::yahoo::YahooMarketDataProvider;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = AppConfig::from_env();
    info!("Starting Confluence Signal Server");
    info!(environment = %config.environment, "Environment");

    let metrics = Arc::new(Metrics::new()?);

    let repository: Arc<dyn SignalRepository> = match config.database_url.as_deref() {
        Some(url) => {
            info!("Initializing PostgreSQL connection...");
            Arc::new(PostgresStore::connect(url).await?)
        }
        None => {
            warn!("DATABASE_URL not set; signals are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    if let Err(e) = seed_default_instruments(repository.as_ref()).await {
        warn!(error = %e, "Failed to seed default instruments");
    }

    let provider: Arc<dyn MarketDataProvider> = Arc::new(YahooMarketDataProvider::with_timeout(
        &config.market_data_url,
        config.fetch_timeout,
    ));
    let telegram = Arc::new(TelegramNotifier::with_timeout(
        config.telegram.clone(),
        config.notify_timeout,
    ));
    let notifier: Arc<dyn NotificationTransport> = telegram.clone();

    let orchestrator = Arc::new(SignalOrchestrator::new(
        provider,
        repository,
        notifier,
        metrics.clone(),
        OrchestratorConfig::from(&config),
    ));

    let scheduler = if config.analysis_interval_seconds > 0 {
        let scheduler = SignalScheduler::new(
            orchestrator.clone(),
            config.analysis_interval_seconds,
            Some(config.warm_start_delay),
        )?;
        scheduler.start().await;
        Some(scheduler)
    } else {
        warn!("ANALYSIS_INTERVAL_SECONDS is 0; scheduler disabled");
        None
    };

    let state = AppState::new(metrics, orchestrator, telegram);
    let port = config.port;

    info!("Signal server started, waiting for shutdown signal...");
    tokio::select! {
        result = start_server(state, port) => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server stopped");
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutting down signal server...");
        }
    }

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }
    info!("Signal server stopped");

    Ok(())
}
