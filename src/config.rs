use anyhow::Result;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default broker list matching the reference three-node deployment.
const DEFAULT_BROKERS: &str = "localhost:9092,localhost:9093,localhost:9094";

const DEFAULT_MESSAGES_TOPIC: &str = "messages";
const DEFAULT_FILTERED_TOPIC: &str = "filtered_messages";
const DEFAULT_BLOCKED_USERS_TOPIC: &str = "blocked_users";
const DEFAULT_CENSORED_WORDS_TOPIC: &str = "censored_words";
const DEFAULT_CONSUMER_GROUP: &str = "moderation-workers";

const DEFAULT_MESSAGE_COUNT: u32 = 50;
const DEFAULT_SEND_INTERVAL_MS: u64 = 300;
const DEFAULT_USER_POOL_SIZE: u32 = 8;

/// How many messages the load generator submits between blocking
/// flushes. Bounds the amount of unacknowledged data lost in a crash.
pub const FLUSH_EVERY_MESSAGES: u32 = 10;

// ============================================================================
// Configuration Structures
// ============================================================================

/// Kafka connection and topic configuration.
///
/// Producer delivery-reliability tuning is deliberately NOT here: the
/// acknowledgment/retry/batching contract is fixed (see
/// `kafka::producer`) and not negotiable through the environment.
#[derive(Clone, Debug)]
pub struct KafkaConfig {
    /// Comma-separated list of Kafka brokers (e.g., "kafka1:9092,kafka2:9092")
    pub brokers: String,
    /// Input topic carrying raw peer-to-peer messages (3 partitions, keyed by sender)
    pub messages_topic: String,
    /// Output topic carrying moderated messages
    pub filtered_topic: String,
    /// Control topic carrying block/unblock events
    pub blocked_users_topic: String,
    /// Control topic carrying censored-word updates (single partition)
    pub censored_words_topic: String,
    /// Consumer group ID for the moderation workers
    pub consumer_group: String,
}

impl KafkaConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            brokers: std::env::var("KAFKA_BROKERS")
                .unwrap_or_else(|_| DEFAULT_BROKERS.to_string()),
            messages_topic: std::env::var("KAFKA_MESSAGES_TOPIC")
                .unwrap_or_else(|_| DEFAULT_MESSAGES_TOPIC.to_string()),
            filtered_topic: std::env::var("KAFKA_FILTERED_TOPIC")
                .unwrap_or_else(|_| DEFAULT_FILTERED_TOPIC.to_string()),
            blocked_users_topic: std::env::var("KAFKA_BLOCKED_USERS_TOPIC")
                .unwrap_or_else(|_| DEFAULT_BLOCKED_USERS_TOPIC.to_string()),
            censored_words_topic: std::env::var("KAFKA_CENSORED_WORDS_TOPIC")
                .unwrap_or_else(|_| DEFAULT_CENSORED_WORDS_TOPIC.to_string()),
            consumer_group: std::env::var("KAFKA_CONSUMER_GROUP")
                .unwrap_or_else(|_| DEFAULT_CONSUMER_GROUP.to_string()),
        }
    }
}

/// Load generator configuration
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Delay between generated messages (milliseconds)
    pub send_interval_ms: u64,
    /// How many messages to produce when no count argument is given
    pub message_count: u32,
    /// Size of the synthetic user pool senders/recipients are drawn from
    pub user_pool_size: u32,
}

impl GeneratorConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            send_interval_ms: std::env::var("GENERATOR_SEND_INTERVAL_MS")
                .unwrap_or_else(|_| DEFAULT_SEND_INTERVAL_MS.to_string())
                .parse()
                .unwrap_or(DEFAULT_SEND_INTERVAL_MS),
            message_count: std::env::var("GENERATOR_MESSAGE_COUNT")
                .unwrap_or_else(|_| DEFAULT_MESSAGE_COUNT.to_string())
                .parse()
                .unwrap_or(DEFAULT_MESSAGE_COUNT),
            user_pool_size: std::env::var("GENERATOR_USER_POOL_SIZE")
                .unwrap_or_else(|_| DEFAULT_USER_POOL_SIZE.to_string())
                .parse()
                .unwrap_or(DEFAULT_USER_POOL_SIZE),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub rust_log: String,
    pub kafka: KafkaConfig,
    pub generator: GeneratorConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            kafka: KafkaConfig::from_env(),
            generator: GeneratorConfig::from_env(),
        })
    }
}
