//! # Actions Testing
//!
//! Testing utilities for the Actions API.
//!
//! This crate provides:
//! - In-memory implementations of the storage, ancestor and notification seams
//! - A fixed clock for deterministic validation
//! - Fixtures for building valid actions and ancestor chains
//!
//! ## Example
//!
//! ```
//! use actions_testing::{InMemoryAncestors, fixtures};
//! use actions_core::verify_ancestors;
//!
//! # async fn example() {
//! let ancestors = InMemoryAncestors::new();
//! let path = fixtures::action_path();
//! ancestors.add_path(&path);
//!
//! assert!(verify_ancestors(&ancestors, &path).await.is_ok());
//! # }
//! ```

use actions_core::environment::Clock;
use chrono::{DateTime, Utc};

pub mod ancestors;
pub mod notifications;
pub mod store;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use actions_testing::mocks::FixedClock;
    /// use actions_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Builders for valid test data.
pub mod fixtures {
    use actions_core::{
        Action, ActionPath, ActionPlanId, ActionStatus, ActionType, Code, CustomerId,
        InteractionId, PersonResponsible, SignpostedToCategory,
    };
    use chrono::Duration;
    use serde_json::{Value, json};

    use super::mocks::test_clock;
    use super::Clock;

    /// Touchpoint used by fixtures.
    pub const TOUCHPOINT_ID: &str = "0000000101";

    /// A fresh ancestor chain with random identifiers.
    #[must_use]
    pub fn action_path() -> ActionPath {
        ActionPath {
            customer_id: CustomerId::new(),
            interaction_id: InteractionId::new(),
            action_plan_id: ActionPlanId::new(),
        }
    }

    /// An action that passes create validation against [`test_clock`].
    #[must_use]
    pub fn valid_action() -> Action {
        let now = test_clock().now();
        Action {
            date_action_agreed: Some(now - Duration::days(7)),
            date_action_aims_to_be_completed_by: Some(now - Duration::days(1)),
            action_summary: Some("Update CV with recent work experience".to_string()),
            signposted_to: Some("Local college".to_string()),
            signposted_to_category: Some(Code::from(SignpostedToCategory::Skills)),
            action_type: Some(Code::from(ActionType::CreateOrUpdateCv)),
            person_responsible: Some(Code::from(PersonResponsible::Customer)),
            ..Action::default()
        }
    }

    /// JSON body of [`valid_action`] as a client would send it.
    #[must_use]
    pub fn valid_action_body() -> Value {
        json!({
            "DateActionAgreed": "2024-12-25T00:00:00Z",
            "DateActionAimsToBeCompletedBy": "2024-12-31T00:00:00Z",
            "ActionSummary": "Update CV with recent work experience",
            "SignpostedTo": "Local college",
            "SignpostedToCategory": SignpostedToCategory::Skills as i32,
            "ActionType": ActionType::CreateOrUpdateCv as i32,
            "PersonResponsible": PersonResponsible::Customer as i32,
        })
    }

    /// A stored action under `path`, stamped as if created by [`TOUCHPOINT_ID`].
    #[must_use]
    pub fn stored_action(path: &ActionPath) -> Action {
        let mut action = valid_action();
        action.stamp_for_create(path, TOUCHPOINT_ID, test_clock().now());
        action.action_status = Some(Code::from(ActionStatus::InProgress));
        action
    }
}

/// Install a test-friendly tracing subscriber, ignoring repeat calls.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use ancestors::InMemoryAncestors;
pub use mocks::{FixedClock, test_clock};
pub use notifications::RecordingNotificationBus;
pub use store::InMemoryActionStore;
