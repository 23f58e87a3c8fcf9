//! Actions API server.
//!
//! Run with: `cargo run --bin actions-api`
//!
//! - API: `http://localhost:8080/api/Customers/{c}/Interactions/{i}/ActionPlans/{p}/Actions`
//! - Definition: `http://localhost:8080/api/Actions/api-definition`
//! - Health: `http://localhost:8080/health`
//! - Metrics: `http://localhost:8080/metrics`

use actions_core::environment::SystemClock;
use actions_postgres::{PostgresActionStore, PostgresAncestorLookup};
use actions_redpanda::RedpandaNotificationBus;
use actions_server::{Config, exporter, shutdown_signal};
use actions_web::AppState;
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("Invalid configuration")?;
    init_tracing(&config.server.log_level);

    info!("Starting Actions API");

    let prometheus = if config.server.metrics_enabled {
        Some(exporter::install_recorder().context("Failed to install Prometheus recorder")?)
    } else {
        None
    };

    info!(
        database = config.postgres.url.split('@').next_back().unwrap_or("unknown"),
        "Connecting to PostgreSQL"
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .acquire_timeout(config.postgres.connect_timeout())
        .connect(&config.postgres.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let store = PostgresActionStore::new(pool.clone(), &config.postgres.tables)?;
    store.migrate().await.context("Failed to migrate action table")?;
    let ancestors = PostgresAncestorLookup::new(pool.clone(), config.postgres.tables.clone())?;
    info!("PostgreSQL store ready");

    let notifications = RedpandaNotificationBus::builder()
        .brokers(&config.redpanda.brokers)
        .topic(&config.redpanda.topic)
        .producer_acks(&config.redpanda.acks)
        .compression(&config.redpanda.compression)
        .timeout(config.redpanda.timeout())
        .build()
        .context("Failed to create Redpanda producer")?;

    let state = AppState::new(
        Arc::new(store),
        Arc::new(ancestors),
        Arc::new(notifications),
        Arc::new(SystemClock),
    );
    let app = actions_server::app(state, prometheus);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "HTTP server listening");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    info!(
        timeout_secs = config.server.shutdown_timeout,
        "Draining in-flight requests"
    );
    match tokio::time::timeout(config.server.shutdown_timeout(), server).await {
        Ok(Ok(Ok(()))) => info!("HTTP server stopped"),
        Ok(Ok(Err(e))) => warn!(error = %e, "HTTP server error during shutdown"),
        Ok(Err(e)) => warn!(error = %e, "Server task error during shutdown"),
        Err(_) => warn!("Shutdown timeout elapsed with requests still in flight"),
    }

    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
