// ============================================================================
// Load Generator
// ============================================================================
//
// Synthesizes peer-to-peer traffic exercising every moderation path:
// clean content, forbidden-word content, and content from senders a
// recipient is expected to block. Publishes through the pipeline's
// fixed reliability contract (see kafka::producer) and flushes every
// ten messages so a crash leaves at most one flush window of
// unacknowledged data.
//
// ============================================================================

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{error, info, warn};

use crate::codec::{self, ChatMessage};
use crate::config::{Config, FLUSH_EVERY_MESSAGES};
use crate::kafka::ReliableProducer;

/// Fixed sample contents. Chosen independently of the recipient, so
/// tests can predict which moderation rule fires from sender and
/// content alone.
const SAMPLE_CONTENTS: &[&str] = &[
    "Hello, how are you today?",
    "I'm fine, thanks!",
    "What's the weather like?",
    "Check out this spam message!",
    "Amazing discount 50 off!!!",
    "This is offensive content",
    "Don't advertise here",
    "I hate this violence",
    "This should be blocked after blocking",
    "This should also be blocked",
    "Spam and advertisement are bad",
    "Promo code: DISCOUNT50",
    "Casino gambling is illegal here",
];

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const FLUSH_TIMEOUT: Duration = Duration::from_secs(30);
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct LoadGenerator {
    producer: ReliableProducer,
    next_message_id: u64,
}

impl LoadGenerator {
    /// Create the generator and verify the cluster is reachable.
    /// An unreachable broker here is fatal for the process.
    pub fn new(config: &Config) -> Result<Self> {
        let producer = ReliableProducer::new(&config.kafka, &config.kafka.messages_topic)?;
        producer
            .check_connectivity(CONNECT_TIMEOUT)
            .context("Cannot reach Kafka cluster")?;

        Ok(Self {
            producer,
            next_message_id: 0,
        })
    }

    /// Generate and publish `count` messages, one every `interval`,
    /// drawing senders and recipients from a pool of `user_pool_size`
    /// synthetic users.
    ///
    /// Publishing is asynchronous; delivery results are observed and
    /// logged out of band. Every ten messages (and once at the end) a
    /// blocking flush waits for all outstanding publishes. Ctrl-C stops
    /// generation early but still runs the final flush.
    pub async fn run(&mut self, interval: Duration, count: u32, user_pool_size: u32) -> Result<()> {
        if user_pool_size < 2 {
            anyhow::bail!("user pool must contain at least two users");
        }

        info!(
            count,
            user_pool_size,
            interval_ms = interval.as_millis() as u64,
            "Starting message production"
        );

        let user_ids: Vec<u64> = (1..=u64::from(user_pool_size)).collect();
        let mut sent: u32 = 0;

        // One interrupt future for the whole run. The signal handler
        // registers on creation and buffers an interrupt that fires
        // while the loop is busy publishing or flushing, so it is
        // observed at the next pause instead of being dropped with a
        // per-iteration throwaway future.
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        for i in 0..count {
            let message = self.next_message(&user_ids);

            // A single failed submit does not halt generation
            if let Err(e) = self.publish(&message) {
                error!(
                    error = %e,
                    message_id = message.message_id,
                    "Failed to submit message"
                );
            }
            sent += 1;

            if (i + 1) % FLUSH_EVERY_MESSAGES == 0 {
                if let Err(e) = self.producer.flush(FLUSH_TIMEOUT) {
                    error!(error = %e, "Periodic flush failed");
                }
                info!("Progress: {}/{} messages", i + 1, count);
            }

            if pause_or_stop(&mut ctrl_c, interval).await {
                info!("Production interrupted by operator");
                break;
            }
        }

        // Final flush: no submitted record may be left unacknowledged
        if let Err(e) = self.producer.flush(FLUSH_TIMEOUT) {
            error!(error = %e, "Final flush failed");
        }
        info!(sent, "Message production finished");
        Ok(())
    }

    /// Flush with a bounded wait and release the producer. Best-effort:
    /// a failed flush during shutdown is logged, never raised.
    pub fn close(self) {
        match self.producer.flush(CLOSE_FLUSH_TIMEOUT) {
            Ok(()) => info!("Producer closed"),
            Err(e) => warn!(
                error = %e,
                "Flush during close failed; some records may be unacknowledged"
            ),
        }
    }

    fn next_message(&mut self, user_ids: &[u64]) -> ChatMessage {
        self.next_message_id += 1;
        synthesize_message(&mut rand::thread_rng(), self.next_message_id, user_ids)
    }

    fn publish(&self, message: &ChatMessage) -> Result<()> {
        let payload = codec::encode(message).context("Failed to encode message")?;
        self.producer.send_observed(message.partition_key(), payload)
    }
}

/// Sleep out the inter-message interval unless `stop` completes first.
/// Returns true when the run should stop.
///
/// `stop` is created once by the caller and re-polled across
/// iterations, so a stop that completed while the caller was busy
/// between pauses is still seen here.
async fn pause_or_stop<F>(stop: &mut F, interval: Duration) -> bool
where
    F: Future + Unpin,
{
    tokio::select! {
        _ = stop => true,
        _ = tokio::time::sleep(interval) => false,
    }
}

/// Pick a random distinct (sender, recipient) pair and a random sample
/// content for one message.
fn synthesize_message<R: Rng>(rng: &mut R, message_id: u64, user_ids: &[u64]) -> ChatMessage {
    let sender_idx = rng.gen_range(0..user_ids.len());
    // Draw the recipient from the pool minus the sender
    let mut recipient_idx = rng.gen_range(0..user_ids.len() - 1);
    if recipient_idx >= sender_idx {
        recipient_idx += 1;
    }

    ChatMessage {
        message_id,
        sender_id: user_ids[sender_idx],
        recipient_id: user_ids[recipient_idx],
        content: SAMPLE_CONTENTS[rng.gen_range(0..SAMPLE_CONTENTS.len())].to_string(),
    }
}
