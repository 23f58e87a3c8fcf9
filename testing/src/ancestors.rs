//! In-memory ancestor registry.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use actions_core::existence::LookupFuture;
use actions_core::{ActionPath, ActionPlanId, AncestorLookup, CustomerId, InteractionId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Registry {
    /// Customer id to read-only flag.
    customers: HashMap<CustomerId, bool>,
    interactions: HashSet<(InteractionId, CustomerId)>,
    action_plans: HashSet<(ActionPlanId, InteractionId, CustomerId)>,
    calls: Vec<&'static str>,
}

/// [`AncestorLookup`] backed by in-memory sets.
///
/// Records the name of every lookup issued so tests can assert on
/// ordering and short-circuiting.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAncestors {
    registry: Arc<RwLock<Registry>>,
}

impl InMemoryAncestors {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an active customer.
    pub fn add_customer(&self, customer_id: CustomerId) {
        self.registry
            .write()
            .unwrap()
            .customers
            .insert(customer_id, false);
    }

    /// Mark a customer as terminated, registering it if needed.
    pub fn terminate_customer(&self, customer_id: CustomerId) {
        self.registry
            .write()
            .unwrap()
            .customers
            .insert(customer_id, true);
    }

    /// Register an interaction for a customer.
    pub fn add_interaction(&self, interaction_id: InteractionId, customer_id: CustomerId) {
        self.registry
            .write()
            .unwrap()
            .interactions
            .insert((interaction_id, customer_id));
    }

    /// Register an action plan for an interaction.
    pub fn add_action_plan(
        &self,
        action_plan_id: ActionPlanId,
        interaction_id: InteractionId,
        customer_id: CustomerId,
    ) {
        self.registry
            .write()
            .unwrap()
            .action_plans
            .insert((action_plan_id, interaction_id, customer_id));
    }

    /// Register every link of `path`.
    pub fn add_path(&self, path: &ActionPath) {
        self.add_customer(path.customer_id);
        self.add_interaction(path.interaction_id, path.customer_id);
        self.add_action_plan(path.action_plan_id, path.interaction_id, path.customer_id);
    }

    /// Names of the lookups issued so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.registry.read().unwrap().calls.clone()
    }

    fn record(&self, call: &'static str) {
        self.registry.write().unwrap().calls.push(call);
    }
}

impl AncestorLookup for InMemoryAncestors {
    fn customer_exists(&self, customer_id: CustomerId) -> LookupFuture<'_> {
        Box::pin(async move {
            self.record("customer_exists");
            self.registry
                .read()
                .unwrap()
                .customers
                .contains_key(&customer_id)
        })
    }

    fn is_customer_read_only(&self, customer_id: CustomerId) -> LookupFuture<'_> {
        Box::pin(async move {
            self.record("is_customer_read_only");
            self.registry
                .read()
                .unwrap()
                .customers
                .get(&customer_id)
                .copied()
                .unwrap_or(false)
        })
    }

    fn interaction_exists_for_customer(
        &self,
        interaction_id: InteractionId,
        customer_id: CustomerId,
    ) -> LookupFuture<'_> {
        Box::pin(async move {
            self.record("interaction_exists_for_customer");
            self.registry
                .read()
                .unwrap()
                .interactions
                .contains(&(interaction_id, customer_id))
        })
    }

    fn action_plan_exists_for_interaction(
        &self,
        action_plan_id: ActionPlanId,
        interaction_id: InteractionId,
        customer_id: CustomerId,
    ) -> LookupFuture<'_> {
        Box::pin(async move {
            self.record("action_plan_exists_for_interaction");
            self.registry
                .read()
                .unwrap()
                .action_plans
                .contains(&(action_plan_id, interaction_id, customer_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use actions_core::{MissingAncestor, verify_ancestors};

    #[tokio::test]
    async fn registered_path_verifies() {
        let ancestors = InMemoryAncestors::new();
        let path = fixtures::action_path();
        ancestors.add_path(&path);

        assert_eq!(verify_ancestors(&ancestors, &path).await, Ok(()));
        assert_eq!(
            ancestors.calls(),
            vec![
                "customer_exists",
                "interaction_exists_for_customer",
                "action_plan_exists_for_interaction",
            ]
        );
    }

    #[tokio::test]
    async fn interaction_must_belong_to_customer() {
        let ancestors = InMemoryAncestors::new();
        let path = fixtures::action_path();
        ancestors.add_customer(path.customer_id);
        ancestors.add_interaction(path.interaction_id, CustomerId::new());

        assert_eq!(
            verify_ancestors(&ancestors, &path).await,
            Err(MissingAncestor::Interaction)
        );
    }

    #[tokio::test]
    async fn terminated_customer_is_read_only() {
        let ancestors = InMemoryAncestors::new();
        let customer = CustomerId::new();

        assert!(!ancestors.is_customer_read_only(customer).await);
        ancestors.terminate_customer(customer);
        assert!(ancestors.is_customer_read_only(customer).await);
        assert!(ancestors.customer_exists(customer).await);
    }
}
