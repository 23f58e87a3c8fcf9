//! Background publication of change notifications.
//!
//! A notification never influences the HTTP response: it is published on a
//! spawned task inside the request's tracing span, and a failure is logged
//! and counted, nothing more.

use actions_core::{ChangeMessage, NotificationBus};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Publish `message` on a detached task.
///
/// The returned handle may be dropped; it exists so tests can wait for the
/// attempt to finish.
pub fn publish_in_background(
    bus: Arc<dyn NotificationBus>,
    message: ChangeMessage,
) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            match bus.publish(&message).await {
                Ok(()) => {
                    tracing::debug!(customer_id = %message.customer_guid, "Change notification sent");
                },
                Err(e) => {
                    tracing::warn!(
                        customer_id = %message.customer_guid,
                        error = %e,
                        "Change notification failed"
                    );
                    metrics::counter!("actions_notifications_failed_total").increment(1);
                },
            }
        }
        .instrument(tracing::Span::current()),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use actions_core::ActionId;
    use actions_testing::{RecordingNotificationBus, fixtures};

    fn message() -> ChangeMessage {
        ChangeMessage::created(
            &fixtures::action_path(),
            ActionId::new(),
            None,
            fixtures::TOUCHPOINT_ID,
            "http://localhost/api",
        )
    }

    #[tokio::test]
    async fn publishes_on_spawned_task() {
        let bus = RecordingNotificationBus::new();
        let message = message();

        publish_in_background(Arc::new(bus.clone()), message.clone())
            .await
            .unwrap();

        assert_eq!(bus.published(), vec![message]);
    }

    #[tokio::test]
    async fn failure_is_swallowed() {
        let bus = RecordingNotificationBus::new();
        bus.fail_publishes(true);

        let result = publish_in_background(Arc::new(bus.clone()), message()).await;

        assert!(result.is_ok());
        assert!(bus.published().is_empty());
    }
}
