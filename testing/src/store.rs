//! In-memory action store.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use actions_core::store::{StoreFuture, action_from_document, storage_keys};
use actions_core::{Action, ActionId, ActionPlanId, ActionStore, CustomerId, StoreError};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Clone, Debug)]
struct StoredDocument {
    action_id: ActionId,
    customer_id: CustomerId,
    action_plan_id: ActionPlanId,
    created_by: Option<String>,
    document: Value,
}

/// Vec-backed [`ActionStore`] for fast, deterministic tests.
///
/// Documents are kept in insertion order. Reads and writes can be switched
/// to fail so error paths can be exercised.
///
/// # Example
///
/// ```
/// use actions_testing::{InMemoryActionStore, fixtures};
/// use actions_core::ActionStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryActionStore::new();
/// let path = fixtures::action_path();
/// let action = fixtures::stored_action(&path);
///
/// store.create_action(&action).await?;
/// let listed = store.list_actions(path.customer_id, path.action_plan_id).await?;
/// assert_eq!(listed.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryActionStore {
    documents: Arc<RwLock<Vec<StoredDocument>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryActionStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail with a database error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Store a raw document, bypassing serialization of [`Action`].
    ///
    /// Useful for documents carrying fields the service does not model.
    pub fn insert_document(
        &self,
        customer_id: CustomerId,
        action_plan_id: ActionPlanId,
        action_id: ActionId,
        document: Value,
    ) {
        self.documents.write().unwrap().push(StoredDocument {
            action_id,
            customer_id,
            action_plan_id,
            created_by: None,
            document,
        });
    }

    /// The stored JSON document for `action_id`.
    #[must_use]
    pub fn document(&self, action_id: ActionId) -> Option<Value> {
        self.documents
            .read()
            .unwrap()
            .iter()
            .find(|stored| stored.action_id == action_id)
            .map(|stored| stored.document.clone())
    }

    /// The `CreatedBy` value stored beside `action_id`.
    #[must_use]
    pub fn created_by(&self, action_id: ActionId) -> Option<String> {
        self.documents
            .read()
            .unwrap()
            .iter()
            .find(|stored| stored.action_id == action_id)
            .and_then(|stored| stored.created_by.clone())
    }

    /// Number of stored actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().unwrap().is_empty()
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::DatabaseError("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::DatabaseError("writes disabled".to_string()));
        }
        Ok(())
    }

    fn find(
        &self,
        customer_id: CustomerId,
        action_plan_id: ActionPlanId,
        action_id: ActionId,
    ) -> Option<StoredDocument> {
        self.documents
            .read()
            .unwrap()
            .iter()
            .find(|stored| {
                stored.action_id == action_id
                    && stored.customer_id == customer_id
                    && stored.action_plan_id == action_plan_id
            })
            .cloned()
    }
}

impl ActionStore for InMemoryActionStore {
    fn get_action(
        &self,
        customer_id: CustomerId,
        action_plan_id: ActionPlanId,
        action_id: ActionId,
    ) -> StoreFuture<'_, Option<Action>> {
        Box::pin(async move {
            self.check_reads()?;
            self.find(customer_id, action_plan_id, action_id)
                .map(|stored| action_from_document(stored.document, stored.created_by))
                .transpose()
        })
    }

    fn list_actions(
        &self,
        customer_id: CustomerId,
        action_plan_id: ActionPlanId,
    ) -> StoreFuture<'_, Vec<Action>> {
        Box::pin(async move {
            self.check_reads()?;
            let matching: Vec<StoredDocument> = self
                .documents
                .read()
                .unwrap()
                .iter()
                .filter(|stored| {
                    stored.customer_id == customer_id && stored.action_plan_id == action_plan_id
                })
                .cloned()
                .collect();

            matching
                .into_iter()
                .map(|stored| action_from_document(stored.document, stored.created_by))
                .collect()
        })
    }

    fn get_action_document(
        &self,
        customer_id: CustomerId,
        action_plan_id: ActionPlanId,
        action_id: ActionId,
    ) -> StoreFuture<'_, Option<String>> {
        Box::pin(async move {
            self.check_reads()?;
            self.find(customer_id, action_plan_id, action_id)
                .map(|stored| {
                    serde_json::to_string(&stored.document)
                        .map_err(|e| StoreError::SerializationError(e.to_string()))
                })
                .transpose()
        })
    }

    fn create_action(&self, action: &Action) -> StoreFuture<'_, Action> {
        let action = action.clone();
        Box::pin(async move {
            self.check_writes()?;
            let (action_id, customer_id, action_plan_id) = storage_keys(&action)?;
            let document = serde_json::to_value(&action)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?;

            self.documents.write().unwrap().push(StoredDocument {
                action_id,
                customer_id,
                action_plan_id,
                created_by: action.created_by.clone(),
                document,
            });
            Ok(action)
        })
    }

    fn replace_action(&self, action_id: ActionId, document: &str) -> StoreFuture<'_, Action> {
        let document = document.to_string();
        Box::pin(async move {
            self.check_writes()?;
            let document: Value = serde_json::from_str(&document)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?;

            let mut documents = self.documents.write().unwrap();
            let stored = documents
                .iter_mut()
                .find(|stored| stored.action_id == action_id)
                .ok_or(StoreError::NotFound(action_id))?;
            stored.document = document;
            action_from_document(stored.document.clone(), stored.created_by.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::json;

    #[tokio::test]
    async fn create_then_get() {
        let store = InMemoryActionStore::new();
        let path = fixtures::action_path();
        let action = fixtures::stored_action(&path);
        let id = action.action_id.unwrap();

        store.create_action(&action).await.unwrap();

        let found = store
            .get_action(path.customer_id, path.action_plan_id, id)
            .await
            .unwrap();
        assert_eq!(found, Some(action));
        assert_eq!(store.created_by(id).as_deref(), Some(fixtures::TOUCHPOINT_ID));
        assert!(store.document(id).unwrap().get("CreatedBy").is_none());
    }

    #[tokio::test]
    async fn get_is_scoped_to_customer_and_plan() {
        let store = InMemoryActionStore::new();
        let path = fixtures::action_path();
        let action = fixtures::stored_action(&path);
        store.create_action(&action).await.unwrap();

        let other = fixtures::action_path();
        let found = store
            .get_action(other.customer_id, path.action_plan_id, action.action_id.unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn create_requires_keys() {
        let store = InMemoryActionStore::new();
        let result = store.create_action(&fixtures::valid_action()).await;
        assert!(matches!(result, Err(StoreError::InvalidAction(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn replace_swaps_document() {
        let store = InMemoryActionStore::new();
        let path = fixtures::action_path();
        let id = ActionId::new();
        store.insert_document(
            path.customer_id,
            path.action_plan_id,
            id,
            json!({ "ActionSummary": "old" }),
        );

        let updated = store
            .replace_action(id, r#"{"ActionSummary":"new"}"#)
            .await
            .unwrap();

        assert_eq!(updated.action_summary.as_deref(), Some("new"));
        assert_eq!(store.document(id), Some(json!({ "ActionSummary": "new" })));
    }

    #[tokio::test]
    async fn replace_unknown_id_is_not_found() {
        let store = InMemoryActionStore::new();
        let id = ActionId::new();
        let result = store.replace_action(id, "{}").await;
        assert!(matches!(result, Err(StoreError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn failure_switches() {
        let store = InMemoryActionStore::new();
        let path = fixtures::action_path();

        store.fail_writes(true);
        assert!(store.create_action(&fixtures::stored_action(&path)).await.is_err());

        store.fail_reads(true);
        assert!(
            store
                .list_actions(path.customer_id, path.action_plan_id)
                .await
                .is_err()
        );
    }
}
