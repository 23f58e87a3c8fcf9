//! Change notifications for downstream consumers.
//!
//! After a successful create or update, a [`ChangeMessage`] is published to
//! a message topic. Publication is best-effort: callers log a
//! [`NotifyError`] and carry on.

use crate::action::{ActionId, ActionPath, CustomerId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur while publishing a notification.
#[derive(Error, Debug, Clone)]
pub enum NotifyError {
    /// Failed to connect to the broker
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The broker rejected or timed out the message
    #[error("Publish failed for topic '{topic}': {reason}")]
    PublishFailed {
        /// The topic that failed
        topic: String,
        /// The reason for failure
        reason: String,
    },

    /// The message could not be serialized
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

/// Notification describing a created or modified action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeMessage {
    /// Human-readable summary of the change.
    pub title_message: String,
    /// Customer the action belongs to.
    pub customer_guid: CustomerId,
    /// `LastModifiedDate` of the action after the change.
    pub last_modified_date: Option<DateTime<Utc>>,
    /// Public URL of the changed action.
    #[serde(rename = "URL")]
    pub url: String,
    /// Always `false` for action changes.
    pub is_new_customer: bool,
    /// Touchpoint that made the change.
    pub touchpoint_id: String,
}

impl ChangeMessage {
    /// Message for a newly created action.
    #[must_use]
    pub fn created(
        path: &ActionPath,
        action_id: ActionId,
        last_modified_date: Option<DateTime<Utc>>,
        touchpoint_id: &str,
        base_url: &str,
    ) -> Self {
        Self {
            title_message: format!(
                "New Action record {action_id} added for {} at {}",
                path.customer_id,
                format_date(last_modified_date)
            ),
            customer_guid: path.customer_id,
            last_modified_date,
            url: path.resource_url(base_url, action_id),
            is_new_customer: false,
            touchpoint_id: touchpoint_id.to_string(),
        }
    }

    /// Message for a modified action.
    #[must_use]
    pub fn updated(
        path: &ActionPath,
        action_id: ActionId,
        last_modified_date: Option<DateTime<Utc>>,
        touchpoint_id: &str,
        base_url: &str,
    ) -> Self {
        Self {
            title_message: format!(
                "Action record modification for {} at {}",
                path.customer_id,
                format_date(last_modified_date)
            ),
            customer_guid: path.customer_id,
            last_modified_date,
            url: path.resource_url(base_url, action_id),
            is_new_customer: false,
            touchpoint_id: touchpoint_id.to_string(),
        }
    }
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// Boxed future returned by [`NotificationBus::publish`].
pub type NotifyFuture<'a> = Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;

/// Publishes change notifications to a message topic.
///
/// The topic is fixed when the implementation is constructed.
pub trait NotificationBus: Send + Sync {
    /// Publish `message`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the message could not be delivered.
    fn publish(&self, message: &ChangeMessage) -> NotifyFuture<'_>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::action::{ActionPlanId, InteractionId};
    use chrono::TimeZone;
    use serde_json::json;

    fn path() -> ActionPath {
        ActionPath {
            customer_id: CustomerId::new(),
            interaction_id: InteractionId::new(),
            action_plan_id: ActionPlanId::new(),
        }
    }

    #[test]
    fn created_message_envelope() {
        let path = path();
        let id = ActionId::new();
        let when = Utc.with_ymd_and_hms(2025, 1, 1, 9, 30, 0).unwrap();

        let message = ChangeMessage::created(&path, id, Some(when), "0000000101", "https://api/");
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(
            value["TitleMessage"],
            json!(format!(
                "New Action record {id} added for {} at 2025-01-01T09:30:00Z",
                path.customer_id
            ))
        );
        assert_eq!(value["CustomerGuid"], json!(path.customer_id.to_string()));
        assert_eq!(value["IsNewCustomer"], json!(false));
        assert_eq!(value["TouchpointId"], json!("0000000101"));
        assert_eq!(value["URL"], json!(path.resource_url("https://api", id)));
    }

    #[test]
    fn updated_message_title() {
        let path = path();
        let message = ChangeMessage::updated(&path, ActionId::new(), None, "0000000101", "h");
        assert_eq!(
            message.title_message,
            format!("Action record modification for {} at ", path.customer_id)
        );
    }
}
