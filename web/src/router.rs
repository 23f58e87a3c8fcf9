//! Route table for the Actions API.

use crate::handlers::{
    actions::{self, COLLECTION_PATH, ITEM_PATH},
    api_definition::{API_DEFINITION_PATH, api_definition},
    health_check,
};
use crate::middleware::request_context_layer;
use crate::openapi::axum_path;
use crate::state::AppState;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Methods other than those routed (PUT, DELETE) answer 405.
///
/// # Example
///
/// ```
/// use actions_web::{AppState, router};
/// use actions_testing::{
///     InMemoryActionStore, InMemoryAncestors, RecordingNotificationBus, test_clock,
/// };
/// use std::sync::Arc;
///
/// let state = AppState::new(
///     Arc::new(InMemoryActionStore::new()),
///     Arc::new(InMemoryAncestors::new()),
///     Arc::new(RecordingNotificationBus::new()),
///     Arc::new(test_clock()),
/// );
/// let app = router(state);
/// ```
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            &axum_path(COLLECTION_PATH),
            get(actions::list_actions).post(actions::create_action),
        )
        .route(
            &axum_path(ITEM_PATH),
            get(actions::get_action).patch(actions::update_action),
        )
        .route(API_DEFINITION_PATH, get(api_definition))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(request_context_layer())
        .with_state(state)
}
