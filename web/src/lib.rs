//! Axum HTTP surface for the Actions API.
//!
//! This crate is the imperative shell around `actions-core`: it parses
//! requests, drives the domain logic through the seams held in [`AppState`],
//! and maps outcomes to HTTP responses.
//!
//! # Routes
//!
//! ```text
//! GET   /api/Customers/{c}/Interactions/{i}/ActionPlans/{p}/Actions        list
//! POST  /api/Customers/{c}/Interactions/{i}/ActionPlans/{p}/Actions        create
//! GET   /api/Customers/{c}/Interactions/{i}/ActionPlans/{p}/Actions/{a}    get
//! PATCH /api/Customers/{c}/Interactions/{i}/ActionPlans/{p}/Actions/{a}    update
//! GET   /api/Actions/api-definition                                        OpenAPI document
//! GET   /health                                                            liveness
//! ```
//!
//! # Status mapping
//!
//! | Outcome                                   | Status |
//! |-------------------------------------------|--------|
//! | missing header, malformed GUID, store write failure | 400 |
//! | read-only customer on create              | 403    |
//! | unreadable body, validation findings      | 422    |
//! | missing ancestor or record                | 204    |
//! | success                                   | 200 / 201 |

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod notify;
pub mod openapi;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{ApiUrl, ResourceBaseUrl, TouchpointId};
pub use handlers::Outcome;
pub use middleware::{CORRELATION_ID_HEADER, CorrelationId, request_context_layer};
pub use router::router;
pub use state::AppState;
