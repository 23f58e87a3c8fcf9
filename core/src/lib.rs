//! # Actions Core
//!
//! Domain types and pure logic for the Actions API.
//!
//! An **Action** is a case-management task agreed with a customer as part of
//! an action plan. This crate holds everything about Actions that does not
//! touch the network:
//!
//! - **Reference data**: the coded enumerations shared with sibling services
//! - **Entities**: [`Action`] and its sparse update form [`ActionPatch`]
//! - **Validation**: field rules returning every finding at once
//! - **Patch merging**: overlaying an [`ActionPatch`] onto a stored document
//! - **Existence checks**: the Customer → Interaction → ActionPlan guard chain
//! - **Seams**: the [`ActionStore`], [`AncestorLookup`] and [`NotificationBus`]
//!   traits implemented by the storage, queue and testing crates
//!
//! ## Request pipeline
//!
//! ```text
//! headers/path ─► existence checks ─► validation ─► store ─► notification
//!                  (short-circuit)     (POST/PATCH)           (best-effort)
//! ```
//!
//! ## Example
//!
//! ```
//! use actions_core::{ActionPatch, patch::merge};
//!
//! let stored = r#"{"ActionSummary":"Write CV","ActionStatus":1}"#;
//! let patch = ActionPatch {
//!     action_summary: Some("Update CV".to_string()),
//!     ..ActionPatch::default()
//! };
//!
//! let merged = merge(Some(stored), &patch).unwrap().unwrap();
//! assert!(merged.contains("Update CV"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod existence;
pub mod notification;
pub mod patch;
pub mod reference_data;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use action::{
    Action, ActionFields, ActionId, ActionPatch, ActionPath, ActionPlanId, CustomerId,
    InteractionId,
};
pub use chrono::{DateTime, Utc};
pub use existence::{AncestorLookup, MissingAncestor, verify_ancestors};
pub use notification::{ChangeMessage, NotificationBus, NotifyError};
pub use reference_data::{
    ActionStatus, ActionType, Code, PersonResponsible, ReferenceData, SignpostedToCategory,
};
pub use store::{ActionStore, StoreError};
pub use validation::{ValidationFinding, Validator};

/// Environment module - injected dependencies that are not storage or messaging.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Validation compares submitted dates against "now", so handlers read the
    /// time through this trait rather than calling `Utc::now()` directly.
    ///
    /// # Examples
    ///
    /// ```
    /// use actions_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// assert!(clock.now() <= chrono::Utc::now());
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
