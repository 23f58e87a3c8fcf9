//! Prometheus metrics exporter.
//!
//! Handlers record counters through the `metrics` facade; this module
//! installs the Prometheus recorder behind it and serves the rendered text.

use axum::{Router, routing::get};
use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Route serving the Prometheus text format.
pub const METRICS_PATH: &str = "/metrics";

/// Register descriptions for every counter the service records.
pub fn describe_metrics() {
    describe_counter!("actions_created_total", "Actions created");
    describe_counter!("actions_updated_total", "Actions updated");
    describe_counter!(
        "actions_validation_failures_total",
        "Requests rejected by validation"
    );
    describe_counter!(
        "actions_ancestor_missing_total",
        "Requests answered 204 because an ancestor record does not exist"
    );
    describe_counter!(
        "actions_notifications_failed_total",
        "Change notifications that failed to publish"
    );
    describe_counter!("actions_store_errors_total", "Failed storage operations");
}

/// Install the global Prometheus recorder.
///
/// # Errors
///
/// Returns [`BuildError`] if a global recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// Router serving `handle` at [`METRICS_PATH`].
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        METRICS_PATH,
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn renders_recorded_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("actions_created_total").increment(2);
        });

        let response = metrics_router(handle)
            .oneshot(Request::builder().uri(METRICS_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("actions_created_total 2"), "{text}");
    }
}
