//! Integration tests for [`RedpandaNotificationBus`] with a real Kafka instance.
//!
//! # Running These Tests
//!
//! These tests are marked as `#[ignore]` by default because they require
//! Docker (for testcontainers) and take 15-60 seconds to spin up Kafka.
//!
//! ```bash
//! cargo test -p actions-redpanda --test integration_tests -- --ignored
//! ```

#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use actions_core::{ActionId, ChangeMessage, NotificationBus};
use actions_redpanda::RedpandaNotificationBus;
use actions_testing::fixtures;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::time::Duration;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::kafka::{KAFKA_PORT, Kafka};

fn sample_message() -> ChangeMessage {
    ChangeMessage::created(
        &fixtures::action_path(),
        ActionId::new(),
        None,
        fixtures::TOUCHPOINT_ID,
        "https://api.example",
    )
}

/// Publish until the broker accepts, which also auto-creates the topic.
async fn wait_for_kafka_ready(bus: &RedpandaNotificationBus) {
    let max_attempts = 60;
    for attempt in 1..=max_attempts {
        if bus.publish(&sample_message()).await.is_ok() {
            tokio::time::sleep(Duration::from_millis(500)).await;
            return;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(
            attempt != max_attempts,
            "Kafka failed to become ready after {max_attempts} attempts"
        );
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_publish_delivers_json_keyed_by_customer() {
    let kafka = Kafka::default()
        .with_env_var("KAFKA_AUTO_CREATE_TOPICS_ENABLE", "true")
        .start()
        .await
        .expect("Failed to start Kafka container");

    let host = kafka.get_host().await.expect("Failed to get host");
    let port = kafka
        .get_host_port_ipv4(KAFKA_PORT)
        .await
        .expect("Failed to get port");
    let brokers = format!("{host}:{port}");

    let bus = RedpandaNotificationBus::builder()
        .brokers(&brokers)
        .topic("action-changes-test")
        .build()
        .expect("Failed to create notification bus");
    wait_for_kafka_ready(&bus).await;

    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &brokers)
        .set("group.id", "actions-integration-test")
        .set("auto.offset.reset", "earliest")
        .create()
        .expect("Failed to create consumer");
    consumer
        .subscribe(&["action-changes-test"])
        .expect("Failed to subscribe");

    let message = sample_message();
    bus.publish(&message).await.expect("Failed to publish");

    let expected_key = message.customer_guid.to_string();
    let received = tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            let record = consumer.recv().await.expect("Consumer error");
            if record.key() == Some(expected_key.as_bytes()) {
                let payload = record.payload().expect("Empty payload");
                return serde_json::from_slice::<ChangeMessage>(payload)
                    .expect("Payload is not a ChangeMessage");
            }
        }
    })
    .await
    .expect("Timed out waiting for notification");

    assert_eq!(received, message);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_publish_to_unreachable_broker_fails() {
    let bus = RedpandaNotificationBus::builder()
        .brokers("127.0.0.1:1")
        .timeout(Duration::from_secs(1))
        .build()
        .expect("Failed to create notification bus");

    assert!(bus.publish(&sample_message()).await.is_err());
}
