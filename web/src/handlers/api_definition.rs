//! API definition endpoint.

use super::actions::{ACTION_ROUTES, action_schemas};
use crate::openapi;
use axum::Json;
use serde_json::Value;

/// Route serving the API definition document.
pub const API_DEFINITION_PATH: &str = "/api/Actions/api-definition";

/// Title published in the API definition.
pub const API_TITLE: &str = "Actions API";

/// Serve the OpenAPI document for every action operation.
///
/// ```text
/// GET /api/Actions/api-definition
/// ```
#[allow(clippy::unused_async)]
pub async fn api_definition() -> Json<Value> {
    Json(openapi::document(
        API_TITLE,
        env!("CARGO_PKG_VERSION"),
        ACTION_ROUTES,
        &action_schemas(),
    ))
}
