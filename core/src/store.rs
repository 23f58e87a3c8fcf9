//! Storage abstraction for action documents.
//!
//! Actions are stored as one JSON document per action, keyed by
//! [`ActionId`] and filterable by customer and action plan. `CreatedBy` is
//! kept next to the document, never inside the response body.
//!
//! # Implementations
//!
//! - `PostgresActionStore` (actions-postgres) - JSONB documents in PostgreSQL
//! - `InMemoryActionStore` (actions-testing) - for tests

use crate::action::{Action, ActionId, ActionPlanId, CustomerId};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Query or connection failure
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A document could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// No document with this id exists
    #[error("Action not found: {0}")]
    NotFound(ActionId),

    /// The action is missing a field the store keys on
    #[error("Invalid action: {0}")]
    InvalidAction(String),
}

/// Boxed future returned by [`ActionStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Document store for actions.
///
/// Methods return boxed futures so the trait stays dyn-compatible and can be
/// shared as `Arc<dyn ActionStore>` in application state. Implementations
/// clone borrowed arguments before building the future.
///
/// # Errors
///
/// Every method returns [`StoreError`] when the backing store fails.
pub trait ActionStore: Send + Sync {
    /// Fetch one action under a customer and action plan.
    fn get_action(
        &self,
        customer_id: CustomerId,
        action_plan_id: ActionPlanId,
        action_id: ActionId,
    ) -> StoreFuture<'_, Option<Action>>;

    /// Fetch every action under a customer and action plan.
    fn list_actions(
        &self,
        customer_id: CustomerId,
        action_plan_id: ActionPlanId,
    ) -> StoreFuture<'_, Vec<Action>>;

    /// Fetch the raw stored JSON document of one action.
    fn get_action_document(
        &self,
        customer_id: CustomerId,
        action_plan_id: ActionPlanId,
        action_id: ActionId,
    ) -> StoreFuture<'_, Option<String>>;

    /// Insert a new action. The action must carry its id and ancestry.
    fn create_action(&self, action: &Action) -> StoreFuture<'_, Action>;

    /// Replace the stored document of an existing action.
    fn replace_action(&self, action_id: ActionId, document: &str) -> StoreFuture<'_, Action>;
}

/// Keys a new action must carry before it can be stored.
///
/// # Errors
///
/// Returns [`StoreError::InvalidAction`] naming the first missing key.
pub fn storage_keys(action: &Action) -> Result<(ActionId, CustomerId, ActionPlanId), StoreError> {
    let action_id = action
        .action_id
        .ok_or_else(|| StoreError::InvalidAction("ActionId is not set".to_string()))?;
    let customer_id = action
        .customer_id
        .ok_or_else(|| StoreError::InvalidAction("CustomerId is not set".to_string()))?;
    let action_plan_id = action
        .action_plan_id
        .ok_or_else(|| StoreError::InvalidAction("ActionPlanId is not set".to_string()))?;
    Ok((action_id, customer_id, action_plan_id))
}

/// Parse a stored document back into an [`Action`], restoring `CreatedBy`.
///
/// # Errors
///
/// Returns [`StoreError::SerializationError`] if the document is not an action.
pub fn action_from_document(
    document: serde_json::Value,
    created_by: Option<String>,
) -> Result<Action, StoreError> {
    let mut action: Action = serde_json::from_value(document)
        .map_err(|e| StoreError::SerializationError(e.to_string()))?;
    action.created_by = created_by;
    Ok(action)
}
