use anyhow::{Context, Result};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::KafkaConfig;
use crate::metrics;

// Fixed delivery-reliability contract. These are not configuration:
// every producer in the pipeline publishes with exactly this profile,
// and callers cannot weaken it.
//
// - acks=all: every in-sync replica must acknowledge before a publish
//   is confirmed (durability over latency).
// - 5 retries with a fixed 1 s backoff for transient failures.
// - One in-flight request per connection: a retried record can never be
//   reordered relative to records sent after it on the same connection.
// - Batches capped at 16 KiB or a 5 ms linger, whichever comes first.
const PRODUCER_ACKS: &str = "all";
const PRODUCER_RETRIES: &str = "5";
const PRODUCER_RETRY_BACKOFF_MS: &str = "1000";
const PRODUCER_MAX_IN_FLIGHT: &str = "1";
const PRODUCER_BATCH_SIZE: &str = "16384";
const PRODUCER_LINGER_MS: &str = "5";

/// Kafka producer with the pipeline's at-least-once delivery profile.
///
/// Publishing is fire-and-observe: `send_observed` hands the record to
/// the client and spawns a task that logs the acknowledgment (placement
/// coordinates) or the failure out of band. `flush` is the
/// synchronization point that waits for every outstanding publish.
pub struct ReliableProducer {
    producer: Arc<FutureProducer>,
    topic: String,
}

impl ReliableProducer {
    /// Create a producer publishing to `topic`.
    ///
    /// Creation does not contact the brokers; call `check_connectivity`
    /// to fail fast at startup.
    pub fn new(config: &KafkaConfig, topic: &str) -> Result<Self> {
        info!("Initializing Kafka producer for topic '{}'", topic);

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            // Reliability settings
            .set("acks", PRODUCER_ACKS)
            .set("retries", PRODUCER_RETRIES)
            .set("retry.backoff.ms", PRODUCER_RETRY_BACKOFF_MS)
            // Fixed backoff, not exponential
            .set("retry.backoff.max.ms", PRODUCER_RETRY_BACKOFF_MS)
            .set("max.in.flight.requests.per.connection", PRODUCER_MAX_IN_FLIGHT)
            // Batching settings
            .set("batch.size", PRODUCER_BATCH_SIZE)
            .set("linger.ms", PRODUCER_LINGER_MS)
            .create()
            .context("Failed to create Kafka producer")?;

        Ok(Self {
            producer: Arc::new(producer),
            topic: topic.to_string(),
        })
    }

    /// Verify the cluster is reachable by fetching topic metadata.
    ///
    /// Unreachable brokers at startup are fatal for the process, so
    /// callers propagate this error instead of retrying.
    pub fn check_connectivity(&self, timeout: Duration) -> Result<()> {
        let metadata = self
            .producer
            .client()
            .fetch_metadata(Some(&self.topic), timeout)
            .context("Failed to fetch cluster metadata")?;

        info!(
            brokers = metadata.brokers().len(),
            topic = %self.topic,
            "Connected to Kafka cluster"
        );
        Ok(())
    }

    /// Submit a record without waiting for acknowledgment.
    ///
    /// The delivery result (success with partition/offset, or failure
    /// with cause) is observed by a spawned task and logged. Returns an
    /// error only if the record could not be handed to the client at
    /// all (e.g., the local queue is full).
    pub fn send_observed(&self, key: String, payload: Vec<u8>) -> Result<()> {
        let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);

        match self.producer.send_result(record) {
            Ok(delivery) => {
                let start = std::time::Instant::now();
                tokio::spawn(async move {
                    match delivery.await {
                        Ok(Ok((partition, offset))) => {
                            metrics::PRODUCE_SUCCESS.inc();
                            metrics::PRODUCE_LATENCY.observe(start.elapsed().as_secs_f64());
                            info!(
                                partition,
                                offset,
                                latency_ms = start.elapsed().as_millis() as u64,
                                "Record acknowledged"
                            );
                        }
                        Ok(Err((e, _))) => {
                            metrics::PRODUCE_FAILURE.inc();
                            error!(error = %e, "Record delivery failed");
                        }
                        Err(_) => {
                            metrics::PRODUCE_FAILURE.inc();
                            error!("Delivery channel closed before acknowledgment");
                        }
                    }
                });
                Ok(())
            }
            Err((e, _record)) => {
                metrics::PRODUCE_FAILURE.inc();
                Err(anyhow::anyhow!("Kafka enqueue failed: {}", e))
            }
        }
    }

    /// Publish a record and wait for its acknowledgment.
    ///
    /// Used by the moderation stage, which must not commit its input
    /// offset until the output record is durable.
    pub async fn send_awaited(
        &self,
        key: String,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<(i32, i64)> {
        let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);
        let start = std::time::Instant::now();

        match self.producer.send(record, Timeout::After(timeout)).await {
            Ok((partition, offset)) => {
                metrics::PRODUCE_SUCCESS.inc();
                metrics::PRODUCE_LATENCY.observe(start.elapsed().as_secs_f64());
                Ok((partition, offset))
            }
            Err((e, _)) => {
                metrics::PRODUCE_FAILURE.inc();
                Err(anyhow::anyhow!("Kafka send failed: {}", e))
            }
        }
    }

    /// Blocking flush: returns only after every previously-submitted
    /// publish for this producer has resolved, successfully or not.
    pub fn flush(&self, timeout: Duration) -> Result<()> {
        self.producer
            .flush(Timeout::After(timeout))
            .context("Failed to flush Kafka producer")?;
        Ok(())
    }

    /// Get topic name
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

// Implement Clone manually to avoid cloning the producer (Arc handles it)
impl Clone for ReliableProducer {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
            topic: self.topic.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KafkaConfig;

    fn test_config() -> KafkaConfig {
        KafkaConfig {
            brokers: "localhost:9092".to_string(),
            messages_topic: "messages".to_string(),
            filtered_topic: "filtered_messages".to_string(),
            blocked_users_topic: "blocked_users".to_string(),
            censored_words_topic: "censored_words".to_string(),
            consumer_group: "test-group".to_string(),
        }
    }

    #[test]
    fn test_producer_creation_is_lazy() {
        // Creation builds the client without contacting any broker
        let producer = ReliableProducer::new(&test_config(), "messages");
        assert!(producer.is_ok());
        assert_eq!(producer.unwrap().topic(), "messages");
    }
}
