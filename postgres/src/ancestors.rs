//! Existence checks against the ancestor tables.
//!
//! The customer, interaction and action-plan tables belong to sibling
//! services; this crate only reads them. Expected columns:
//!
//! ```text
//! customers(id UUID, date_of_termination TIMESTAMPTZ NULL)
//! interactions(id UUID, customer_id UUID)
//! action_plans(id UUID, customer_id UUID, interaction_id UUID)
//! ```

use crate::tables::{InvalidTableName, TableNames};
use actions_core::existence::LookupFuture;
use actions_core::{ActionPlanId, AncestorLookup, CustomerId, InteractionId};
use sqlx::PgPool;
use uuid::Uuid;

/// `PostgreSQL`-backed [`AncestorLookup`].
///
/// Every predicate is a `COUNT(1)` query. Query failures are logged at warn
/// level and answered with `false`.
#[derive(Clone, Debug)]
pub struct PostgresAncestorLookup {
    pool: PgPool,
    tables: TableNames,
}

impl PostgresAncestorLookup {
    /// Create a lookup over an existing pool.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTableName`] if any table name is not a plain identifier.
    pub fn new(pool: PgPool, tables: TableNames) -> Result<Self, InvalidTableName> {
        tables.validate()?;
        Ok(Self { pool, tables })
    }

    fn count_matches(&self, check: &'static str, sql: String, ids: Vec<Uuid>) -> LookupFuture<'_> {
        Box::pin(async move {
            let mut query = sqlx::query_scalar::<_, i64>(&sql);
            for id in ids {
                query = query.bind(id);
            }

            match query.fetch_one(&self.pool).await {
                Ok(count) => count > 0,
                Err(e) => {
                    tracing::warn!(check, error = %e, "Ancestor lookup failed, treating as absent");
                    false
                }
            }
        })
    }
}

impl AncestorLookup for PostgresAncestorLookup {
    fn customer_exists(&self, customer_id: CustomerId) -> LookupFuture<'_> {
        self.count_matches(
            "customer_exists",
            format!("SELECT COUNT(1) FROM {} WHERE id = $1", self.tables.customers),
            vec![*customer_id.as_uuid()],
        )
    }

    fn is_customer_read_only(&self, customer_id: CustomerId) -> LookupFuture<'_> {
        self.count_matches(
            "is_customer_read_only",
            format!(
                "SELECT COUNT(1) FROM {} WHERE id = $1 AND date_of_termination IS NOT NULL",
                self.tables.customers
            ),
            vec![*customer_id.as_uuid()],
        )
    }

    fn interaction_exists_for_customer(
        &self,
        interaction_id: InteractionId,
        customer_id: CustomerId,
    ) -> LookupFuture<'_> {
        self.count_matches(
            "interaction_exists_for_customer",
            format!(
                "SELECT COUNT(1) FROM {} WHERE id = $1 AND customer_id = $2",
                self.tables.interactions
            ),
            vec![*interaction_id.as_uuid(), *customer_id.as_uuid()],
        )
    }

    fn action_plan_exists_for_interaction(
        &self,
        action_plan_id: ActionPlanId,
        interaction_id: InteractionId,
        customer_id: CustomerId,
    ) -> LookupFuture<'_> {
        self.count_matches(
            "action_plan_exists_for_interaction",
            format!(
                "SELECT COUNT(1) FROM {} WHERE id = $1 AND interaction_id = $2 AND customer_id = $3",
                self.tables.action_plans
            ),
            vec![
                *action_plan_id.as_uuid(),
                *interaction_id.as_uuid(),
                *customer_id.as_uuid(),
            ],
        )
    }
}
