//! Ancestor existence checks.
//!
//! An action is only reachable through its full ancestor chain:
//!
//! ```text
//! Customer ──► Interaction ──► ActionPlan ──► Action
//! ```
//!
//! [`AncestorLookup`] answers single-link questions against whatever holds
//! the ancestor records. [`verify_ancestors`] walks the chain in fixed order
//! and stops at the first missing link.
//!
//! Lookups return plain booleans. An implementation that fails to reach its
//! backing store must log the failure and answer `false`: callers treat an
//! unreachable ancestor exactly like an absent one.

use crate::action::{ActionPath, ActionPlanId, CustomerId, InteractionId};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`AncestorLookup`] predicates.
pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

/// Point lookups against the ancestor records of an action.
///
/// Methods return boxed futures so the trait stays dyn-compatible and can be
/// shared as `Arc<dyn AncestorLookup>` in application state.
pub trait AncestorLookup: Send + Sync {
    /// Whether the customer exists.
    fn customer_exists(&self, customer_id: CustomerId) -> LookupFuture<'_>;

    /// Whether the customer has been terminated and so accepts no new records.
    fn is_customer_read_only(&self, customer_id: CustomerId) -> LookupFuture<'_>;

    /// Whether the interaction exists and belongs to the customer.
    fn interaction_exists_for_customer(
        &self,
        interaction_id: InteractionId,
        customer_id: CustomerId,
    ) -> LookupFuture<'_>;

    /// Whether the action plan exists under the interaction and customer.
    fn action_plan_exists_for_interaction(
        &self,
        action_plan_id: ActionPlanId,
        interaction_id: InteractionId,
        customer_id: CustomerId,
    ) -> LookupFuture<'_>;
}

/// The first link of the ancestor chain that could not be found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MissingAncestor {
    /// No such customer.
    Customer,
    /// No such interaction for the customer.
    Interaction,
    /// No such action plan for the interaction.
    ActionPlan,
}

impl MissingAncestor {
    /// Lower-case label, used as a metric label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Interaction => "interaction",
            Self::ActionPlan => "action_plan",
        }
    }
}

impl fmt::Display for MissingAncestor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Customer => "Customer",
            Self::Interaction => "Interaction",
            Self::ActionPlan => "ActionPlan",
        };
        write!(f, "{name} does not exist")
    }
}

impl std::error::Error for MissingAncestor {}

/// Check the ancestor chain of `path` in order Customer, Interaction, ActionPlan.
///
/// Later lookups are not issued once one fails.
///
/// # Errors
///
/// Returns the first [`MissingAncestor`] found.
pub async fn verify_ancestors(
    lookup: &dyn AncestorLookup,
    path: &ActionPath,
) -> Result<(), MissingAncestor> {
    if !lookup.customer_exists(path.customer_id).await {
        return Err(MissingAncestor::Customer);
    }

    if !lookup
        .interaction_exists_for_customer(path.interaction_id, path.customer_id)
        .await
    {
        return Err(MissingAncestor::Interaction);
    }

    if !lookup
        .action_plan_exists_for_interaction(
            path.action_plan_id,
            path.interaction_id,
            path.customer_id,
        )
        .await
    {
        return Err(MissingAncestor::ActionPlan);
    }

    tracing::debug!(
        customer_id = %path.customer_id,
        action_plan_id = %path.action_plan_id,
        "Ancestor chain verified"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Answers from fixed flags and records which lookups ran.
    struct Scripted {
        customer: bool,
        interaction: bool,
        plan: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl Scripted {
        fn new(customer: bool, interaction: bool, plan: bool) -> Self {
            Self {
                customer,
                interaction,
                plan,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn answer(&self, call: &'static str, result: bool) -> LookupFuture<'_> {
            self.calls.lock().unwrap().push(call);
            Box::pin(async move { result })
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AncestorLookup for Scripted {
        fn customer_exists(&self, _: CustomerId) -> LookupFuture<'_> {
            self.answer("customer", self.customer)
        }

        fn is_customer_read_only(&self, _: CustomerId) -> LookupFuture<'_> {
            self.answer("read_only", false)
        }

        fn interaction_exists_for_customer(
            &self,
            _: InteractionId,
            _: CustomerId,
        ) -> LookupFuture<'_> {
            self.answer("interaction", self.interaction)
        }

        fn action_plan_exists_for_interaction(
            &self,
            _: ActionPlanId,
            _: InteractionId,
            _: CustomerId,
        ) -> LookupFuture<'_> {
            self.answer("plan", self.plan)
        }
    }

    fn path() -> ActionPath {
        ActionPath {
            customer_id: CustomerId::new(),
            interaction_id: InteractionId::new(),
            action_plan_id: ActionPlanId::new(),
        }
    }

    #[tokio::test]
    async fn all_ancestors_present() {
        let lookup = Scripted::new(true, true, true);
        assert_eq!(verify_ancestors(&lookup, &path()).await, Ok(()));
        assert_eq!(lookup.calls(), vec!["customer", "interaction", "plan"]);
    }

    #[tokio::test]
    async fn missing_customer_stops_the_chain() {
        let lookup = Scripted::new(false, false, false);
        assert_eq!(
            verify_ancestors(&lookup, &path()).await,
            Err(MissingAncestor::Customer)
        );
        assert_eq!(lookup.calls(), vec!["customer"]);
    }

    #[tokio::test]
    async fn missing_interaction_skips_plan_lookup() {
        let lookup = Scripted::new(true, false, true);
        assert_eq!(
            verify_ancestors(&lookup, &path()).await,
            Err(MissingAncestor::Interaction)
        );
        assert_eq!(lookup.calls(), vec!["customer", "interaction"]);
    }

    #[tokio::test]
    async fn missing_plan_is_reported_last() {
        let lookup = Scripted::new(true, true, false);
        assert_eq!(
            verify_ancestors(&lookup, &path()).await,
            Err(MissingAncestor::ActionPlan)
        );
    }

    #[test]
    fn labels() {
        assert_eq!(MissingAncestor::ActionPlan.as_str(), "action_plan");
        assert_eq!(MissingAncestor::Interaction.to_string(), "Interaction does not exist");
    }
}
