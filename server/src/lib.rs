//! # Actions Server
//!
//! Process wiring for the Actions API: configuration, the Prometheus
//! exporter, application assembly and shutdown signals. The `actions-api`
//! binary in `main.rs` connects these to `PostgreSQL` and Redpanda.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod exporter;

use actions_web::AppState;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;

pub use config::{Config, ConfigError};

/// The full application: the Actions API router plus `/metrics` when enabled.
pub fn app(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    let router = actions_web::router(state);
    match metrics {
        Some(handle) => router.merge(exporter::metrics_router(handle)),
        None => router,
    }
}

/// Resolve when the process receives Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Unable to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
