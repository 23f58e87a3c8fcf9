//! Recording notification bus.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use actions_core::notification::NotifyFuture;
use actions_core::{ChangeMessage, NotificationBus, NotifyError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// [`NotificationBus`] that captures published messages.
///
/// Handlers publish from a spawned task, so tests should use
/// [`wait_for`](Self::wait_for) rather than reading immediately.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotificationBus {
    messages: Arc<RwLock<Vec<ChangeMessage>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingNotificationBus {
    /// Create a bus with no captured messages
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every publish fail. Failed messages are not captured.
    pub fn fail_publishes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Messages captured so far.
    #[must_use]
    pub fn published(&self) -> Vec<ChangeMessage> {
        self.messages.read().unwrap().clone()
    }

    /// Wait up to `timeout` for at least `count` messages, returning what was captured.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<ChangeMessage> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let published = self.published();
            if published.len() >= count || tokio::time::Instant::now() >= deadline {
                return published;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl NotificationBus for RecordingNotificationBus {
    fn publish(&self, message: &ChangeMessage) -> NotifyFuture<'_> {
        let message = message.clone();
        Box::pin(async move {
            if self.fail.load(Ordering::SeqCst) {
                return Err(NotifyError::PublishFailed {
                    topic: "recording".to_string(),
                    reason: "publishing disabled".to_string(),
                });
            }
            self.messages.write().unwrap().push(message);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use actions_core::ActionId;

    #[tokio::test]
    async fn captures_messages() {
        let bus = RecordingNotificationBus::new();
        let message = ChangeMessage::created(
            &fixtures::action_path(),
            ActionId::new(),
            None,
            fixtures::TOUCHPOINT_ID,
            "http://localhost",
        );

        bus.publish(&message).await.unwrap();

        assert_eq!(bus.wait_for(1, Duration::from_millis(50)).await, vec![message]);
    }

    #[tokio::test]
    async fn failing_bus_captures_nothing() {
        let bus = RecordingNotificationBus::new();
        bus.fail_publishes(true);
        let message = ChangeMessage::updated(
            &fixtures::action_path(),
            ActionId::new(),
            None,
            fixtures::TOUCHPOINT_ID,
            "http://localhost",
        );

        assert!(bus.publish(&message).await.is_err());
        assert!(bus.published().is_empty());
    }
}
