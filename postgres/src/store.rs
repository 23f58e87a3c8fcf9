//! JSONB document store for actions.

use crate::tables::{InvalidTableName, TableNames, validate_identifier};
use actions_core::store::{StoreFuture, action_from_document, storage_keys};
use actions_core::{Action, ActionId, ActionPlanId, ActionStore, CustomerId, StoreError};
use serde_json::Value;
use sqlx::PgPool;

/// `PostgreSQL`-backed [`ActionStore`].
///
/// Each action is one row: the JSON document in a `JSONB` column, plus the
/// keys it is looked up by and the `CreatedBy` touchpoint, which is kept out
/// of the document.
///
/// ```text
/// id UUID PK | customer_id UUID | action_plan_id UUID | created_by TEXT | document JSONB
/// ```
#[derive(Clone, Debug)]
pub struct PostgresActionStore {
    pool: PgPool,
    table: String,
}

impl PostgresActionStore {
    /// Create a store over an existing pool, writing to `tables.actions`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTableName`] if the table name is not a plain identifier.
    pub fn new(pool: PgPool, tables: &TableNames) -> Result<Self, InvalidTableName> {
        validate_identifier(&tables.actions)?;
        Ok(Self {
            pool,
            table: tables.actions.clone(),
        })
    }

    /// Create a store over an existing pool using the default table name.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            table: TableNames::default().actions,
        }
    }

    /// Create the actions table and its lookup index if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if either statement fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let table = &self.table;

        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS {table} (
                id UUID PRIMARY KEY,
                customer_id UUID NOT NULL,
                action_plan_id UUID NOT NULL,
                created_by TEXT,
                document JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_customer_plan ON {table}(customer_id, action_plan_id)"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        tracing::info!(table = %self.table, "Actions table ready");
        Ok(())
    }
}

fn database_error(operation: &'static str, error: &sqlx::Error) -> StoreError {
    tracing::error!(operation, error = %error, "Action store query failed");
    metrics::counter!("actions_store_errors_total", "operation" => operation).increment(1);
    StoreError::DatabaseError(error.to_string())
}

impl ActionStore for PostgresActionStore {
    fn get_action(
        &self,
        customer_id: CustomerId,
        action_plan_id: ActionPlanId,
        action_id: ActionId,
    ) -> StoreFuture<'_, Option<Action>> {
        Box::pin(async move {
            let row: Option<(Value, Option<String>)> = sqlx::query_as(&format!(
                "SELECT document, created_by FROM {} \
                 WHERE id = $1 AND customer_id = $2 AND action_plan_id = $3",
                self.table
            ))
            .bind(action_id.as_uuid())
            .bind(customer_id.as_uuid())
            .bind(action_plan_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("get", &e))?;

            row.map(|(document, created_by)| action_from_document(document, created_by))
                .transpose()
        })
    }

    fn list_actions(
        &self,
        customer_id: CustomerId,
        action_plan_id: ActionPlanId,
    ) -> StoreFuture<'_, Vec<Action>> {
        Box::pin(async move {
            let rows: Vec<(Value, Option<String>)> = sqlx::query_as(&format!(
                "SELECT document, created_by FROM {} \
                 WHERE customer_id = $1 AND action_plan_id = $2 \
                 ORDER BY created_at, id",
                self.table
            ))
            .bind(customer_id.as_uuid())
            .bind(action_plan_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("list", &e))?;

            tracing::debug!(
                customer_id = %customer_id,
                action_plan_id = %action_plan_id,
                count = rows.len(),
                "Listed actions"
            );

            rows.into_iter()
                .map(|(document, created_by)| action_from_document(document, created_by))
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
            let row: Option<(String,)> = sqlx::query_as(&format!(
                "SELECT document::text FROM {} \
                 WHERE id = $1 AND customer_id = $2 AND action_plan_id = $3",
                self.table
            ))
            .bind(action_id.as_uuid())
            .bind(customer_id.as_uuid())
            .bind(action_plan_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("get_document", &e))?;

            Ok(row.map(|(document,)| document))
        })
    }

    fn create_action(&self, action: &Action) -> StoreFuture<'_, Action> {
        let action = action.clone();
        Box::pin(async move {
            let (action_id, customer_id, action_plan_id) = storage_keys(&action)?;
            let document = serde_json::to_value(&action)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?;

            sqlx::query(&format!(
                "INSERT INTO {} (id, customer_id, action_plan_id, created_by, document) \
                 VALUES ($1, $2, $3, $4, $5)",
                self.table
            ))
            .bind(action_id.as_uuid())
            .bind(customer_id.as_uuid())
            .bind(action_plan_id.as_uuid())
            .bind(action.created_by.as_deref())
            .bind(&document)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("create", &e))?;

            tracing::debug!(action_id = %action_id, customer_id = %customer_id, "Action stored");
            Ok(action)
        })
    }

    fn replace_action(&self, action_id: ActionId, document: &str) -> StoreFuture<'_, Action> {
        let document = document.to_string();
        Box::pin(async move {
            let document: Value = serde_json::from_str(&document)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?;

            let row: Option<(Value, Option<String>)> = sqlx::query_as(&format!(
                "UPDATE {} SET document = $2, updated_at = now() \
                 WHERE id = $1 RETURNING document, created_by",
                self.table
            ))
            .bind(action_id.as_uuid())
            .bind(&document)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("replace", &e))?;

            let (document, created_by) = row.ok_or(StoreError::NotFound(action_id))?;
            tracing::debug!(action_id = %action_id, "Action replaced");
            action_from_document(document, created_by)
        })
    }
}
