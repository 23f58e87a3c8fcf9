//! Redpanda notification publisher for the Actions API.
//!
//! This crate provides [`RedpandaNotificationBus`], which implements the
//! [`NotificationBus`] trait from `actions-core` using rdkafka. Any
//! Kafka-compatible broker works: Redpanda, Apache Kafka, AWS MSK.
//!
//! # Message Format
//!
//! Each [`ChangeMessage`] is published as a JSON object to the configured
//! topic, keyed by the customer id so all changes for one customer land on
//! the same partition:
//!
//! ```text
//! key:     6f1e...-customer-guid
//! payload: {"TitleMessage": "...", "CustomerGuid": "...", "URL": "...", ...}
//! ```
//!
//! # Delivery Semantics
//!
//! Publication is fire-and-forget from the caller's point of view: the web
//! layer spawns the publish and only logs a failure. The producer itself
//! waits for broker acknowledgement up to the configured timeout.
//!
//! # Example
//!
//! ```no_run
//! use actions_redpanda::RedpandaNotificationBus;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bus = RedpandaNotificationBus::builder()
//!     .brokers("localhost:9092")
//!     .topic("action-changes")
//!     .producer_acks("all")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use actions_core::notification::NotifyFuture;
use actions_core::{ChangeMessage, NotificationBus, NotifyError};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;

/// Topic used when none is configured.
pub const DEFAULT_TOPIC: &str = "action-changes";

/// Redpanda-backed [`NotificationBus`].
///
/// # Configuration
///
/// - **Broker addresses**: Bootstrap servers (required)
/// - **Topic**: Destination topic (default: `action-changes`)
/// - **Producer settings**: Acks, compression, timeout
pub struct RedpandaNotificationBus {
    /// Kafka producer for publishing messages
    producer: FutureProducer,
    /// Broker addresses
    brokers: String,
    /// Destination topic
    topic: String,
    /// Producer timeout
    timeout: Duration,
}

impl RedpandaNotificationBus {
    /// Create a bus with default settings publishing to `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::ConnectionFailed`] if the producer cannot be created.
    pub fn new(brokers: &str, topic: &str) -> Result<Self, NotifyError> {
        Self::builder().brokers(brokers).topic(topic).build()
    }

    /// Create a new builder for configuring the bus.
    #[must_use]
    pub fn builder() -> RedpandaNotificationBusBuilder {
        RedpandaNotificationBusBuilder::default()
    }

    /// Get a reference to the brokers string.
    #[must_use]
    pub fn brokers(&self) -> &str {
        &self.brokers
    }

    /// Get the destination topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl std::fmt::Debug for RedpandaNotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedpandaNotificationBus")
            .field("brokers", &self.brokers)
            .field("topic", &self.topic)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a [`RedpandaNotificationBus`].
///
/// # Example
///
/// ```no_run
/// use actions_redpanda::RedpandaNotificationBus;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bus = RedpandaNotificationBus::builder()
///     .brokers("localhost:9092,localhost:9093")
///     .topic("action-changes")
///     .compression("lz4")
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug)]
pub struct RedpandaNotificationBusBuilder {
    brokers: Option<String>,
    topic: Option<String>,
    producer_acks: Option<String>,
    compression: Option<String>,
    timeout: Option<Duration>,
}

impl RedpandaNotificationBusBuilder {
    /// Set the broker addresses.
    ///
    /// # Parameters
    ///
    /// - `brokers`: Comma-separated list of broker addresses (e.g., "localhost:9092")
    #[must_use]
    pub fn brokers(mut self, brokers: impl Into<String>) -> Self {
        self.brokers = Some(brokers.into());
        self
    }

    /// Set the destination topic.
    ///
    /// Default: `action-changes`
    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set the producer acknowledgment mode.
    ///
    /// # Parameters
    ///
    /// - `acks`: "0" (no acks), "1" (leader ack), "all" (all replicas ack)
    ///
    /// Default: "1"
    #[must_use]
    pub fn producer_acks(mut self, acks: impl Into<String>) -> Self {
        self.producer_acks = Some(acks.into());
        self
    }

    /// Set the compression codec.
    ///
    /// # Parameters
    ///
    /// - `compression`: "none", "gzip", "snappy", "lz4", "zstd"
    ///
    /// Default: "none"
    #[must_use]
    pub fn compression(mut self, compression: impl Into<String>) -> Self {
        self.compression = Some(compression.into());
        self
    }

    /// Set the producer send timeout.
    ///
    /// Default: 5 seconds
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the [`RedpandaNotificationBus`].
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::ConnectionFailed`] if:
    /// - Brokers not set
    /// - Cannot create producer
    /// - Invalid configuration
    pub fn build(self) -> Result<RedpandaNotificationBus, NotifyError> {
        let brokers = self
            .brokers
            .ok_or_else(|| NotifyError::ConnectionFailed("Brokers not configured".to_string()))?;
        let topic = self.topic.unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        let timeout = self.timeout.unwrap_or(Duration::from_secs(5));
        let acks = self.producer_acks.as_deref().unwrap_or("1");
        let compression = self.compression.as_deref().unwrap_or("none");

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &brokers)
            .set("message.timeout.ms", timeout.as_millis().to_string())
            .set("acks", acks)
            .set("compression.type", compression)
            .create()
            .map_err(|e| {
                NotifyError::ConnectionFailed(format!("Failed to create producer: {e}"))
            })?;

        tracing::info!(
            brokers = %brokers,
            topic = %topic,
            acks,
            compression,
            "RedpandaNotificationBus created successfully"
        );

        Ok(RedpandaNotificationBus {
            producer,
            brokers,
            topic,
            timeout,
        })
    }
}

/// Serialize a message to its wire payload.
///
/// # Errors
///
/// Returns [`NotifyError::SerializationFailed`] if serialization fails.
pub fn encode_message(message: &ChangeMessage) -> Result<Vec<u8>, NotifyError> {
    serde_json::to_vec(message).map_err(|e| NotifyError::SerializationFailed(e.to_string()))
}

impl NotificationBus for RedpandaNotificationBus {
    fn publish(&self, message: &ChangeMessage) -> NotifyFuture<'_> {
        // Clone data before moving into async block
        let message = message.clone();

        Box::pin(async move {
            let payload = encode_message(&message)?;
            let key = message.customer_guid.to_string();

            let record = FutureRecord::to(&self.topic).payload(&payload).key(&key);

            match self.producer.send(record, Timeout::After(self.timeout)).await {
                Ok((partition, offset)) => {
                    tracing::debug!(
                        topic = %self.topic,
                        partition,
                        offset,
                        customer_id = %message.customer_guid,
                        "Change notification published"
                    );
                    Ok(())
                },
                Err((kafka_error, _)) => {
                    tracing::error!(
                        topic = %self.topic,
                        error = %kafka_error,
                        "Failed to publish change notification"
                    );
                    Err(NotifyError::PublishFailed {
                        topic: self.topic.clone(),
                        reason: kafka_error.to_string(),
                    })
                },
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use actions_core::{ActionId, ActionPath, ActionPlanId, CustomerId, InteractionId};

    #[test]
    fn redpanda_notification_bus_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<RedpandaNotificationBus>();
        assert_sync::<RedpandaNotificationBus>();
    }

    #[test]
    fn builder_requires_brokers() {
        let result = RedpandaNotificationBus::builder().topic("t").build();
        assert!(matches!(result, Err(NotifyError::ConnectionFailed(_))));
    }

    #[test]
    fn builder_defaults_topic() {
        let bus = RedpandaNotificationBus::builder()
            .brokers("localhost:9092")
            .build()
            .unwrap();
        assert_eq!(bus.topic(), DEFAULT_TOPIC);
        assert_eq!(bus.brokers(), "localhost:9092");
    }

    #[test]
    fn payload_is_pascal_case_json() {
        let path = ActionPath {
            customer_id: CustomerId::new(),
            interaction_id: InteractionId::new(),
            action_plan_id: ActionPlanId::new(),
        };
        let message =
            ChangeMessage::created(&path, ActionId::new(), None, "0000000101", "http://api");

        let payload: serde_json::Value =
            serde_json::from_slice(&encode_message(&message).unwrap()).unwrap();

        assert_eq!(payload["CustomerGuid"], path.customer_id.to_string());
        assert_eq!(payload["IsNewCustomer"], false);
        assert!(payload["URL"].as_str().unwrap().starts_with("http://api/Customers/"));
    }
}
