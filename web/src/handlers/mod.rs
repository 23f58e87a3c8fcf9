//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by resource.

pub mod actions;
pub mod api_definition;
pub mod health;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

// Re-export common handler utilities
pub use api_definition::api_definition;
pub use health::health_check;

/// Successful handler outcome.
///
/// Missing ancestors and missing records are not errors: they answer
/// `204 No Content` with an empty body.
#[derive(Debug)]
pub enum Outcome<T> {
    /// `200 OK` with a JSON body.
    Ok(T),
    /// `201 Created` with a JSON body.
    Created(T),
    /// `204 No Content`.
    NoContent,
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Self::Created(body) => (StatusCode::CREATED, Json(body)).into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}
