//! Application state for Axum handlers.

use actions_core::environment::Clock;
use actions_core::{ActionStore, AncestorLookup, NotificationBus, Validator};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Every dependency is a trait object so the same router serves production
/// (`PostgreSQL` + Redpanda) and tests (in-memory doubles).
///
/// # Examples
///
/// ```
/// use actions_web::AppState;
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
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Action documents.
    pub store: Arc<dyn ActionStore>,
    /// Ancestor existence checks.
    pub ancestors: Arc<dyn AncestorLookup>,
    /// Change notifications.
    pub notifications: Arc<dyn NotificationBus>,
    /// Time source for stamping and validation.
    pub clock: Arc<dyn Clock>,
    /// Validator bound to `clock`.
    pub validator: Validator,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn ActionStore>,
        ancestors: Arc<dyn AncestorLookup>,
        notifications: Arc<dyn NotificationBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let validator = Validator::new(Arc::clone(&clock));
        Self {
            store,
            ancestors,
            notifications,
            clock,
            validator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone_send_sync() {
        // Axum requires state to be Clone + Send + Sync
        fn assert_state<T: Clone + Send + Sync + 'static>() {}
        assert_state::<AppState>();
    }
}
