use once_cell::sync::Lazy;
use prometheus::{register_counter, register_histogram, Counter, Histogram};

/// Kafka producer success counter
pub static PRODUCE_SUCCESS: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "moderation_produce_success_total",
        "Total number of successful Kafka produce operations"
    )
    .expect("Failed to register moderation_produce_success_total metric")
});

/// Kafka producer failure counter
pub static PRODUCE_FAILURE: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "moderation_produce_failure_total",
        "Total number of failed Kafka produce operations"
    )
    .expect("Failed to register moderation_produce_failure_total metric")
});

/// Kafka producer latency histogram
pub static PRODUCE_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "moderation_produce_latency_seconds",
        "Kafka produce operation latency in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register moderation_produce_latency_seconds metric")
});

/// Undecodable records dropped from any input stream
pub static DECODE_FAILURES: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "moderation_decode_failure_total",
        "Total number of records dropped because their bytes did not decode"
    )
    .expect("Failed to register moderation_decode_failure_total metric")
});

/// Messages forwarded to the output stream
pub static MESSAGES_FORWARDED: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "moderation_messages_forwarded_total",
        "Total number of messages emitted to the filtered stream"
    )
    .expect("Failed to register moderation_messages_forwarded_total metric")
});

/// Messages suppressed because the sender was blocked by the recipient
pub static MESSAGES_SUPPRESSED: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "moderation_messages_suppressed_total",
        "Total number of messages dropped because the sender was blocked"
    )
    .expect("Failed to register moderation_messages_suppressed_total metric")
});

/// Messages whose content was changed by redaction
pub static MESSAGES_REDACTED: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "moderation_messages_redacted_total",
        "Total number of forwarded messages with at least one redacted word"
    )
    .expect("Failed to register moderation_messages_redacted_total metric")
});

/// Block events that changed block-list table state
pub static BLOCK_EVENTS_APPLIED: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "moderation_block_events_applied_total",
        "Total number of block/unblock events that changed table state"
    )
    .expect("Failed to register moderation_block_events_applied_total metric")
});

/// Word updates that changed censored-word table state
pub static WORD_UPDATES_APPLIED: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "moderation_word_updates_applied_total",
        "Total number of censored-word updates that changed table state"
    )
    .expect("Failed to register moderation_word_updates_applied_total metric")
});
