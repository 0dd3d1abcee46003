// Moderation worker entry point.
//
// Runs the whole stream side of the pipeline in one process: the
// block-event and word-update loops that maintain the two tables, and
// the moderation loop that reads them to drop or redact messages.
// SIGTERM/Ctrl-C stops all three loops between records and waits for
// them to drain before exiting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use moderation_server::config::Config;
use moderation_server::kafka::{ReliableProducer, StreamReader};
use moderation_server::moderation::streams::{
    run_block_event_stream, run_censored_word_stream, run_message_stream,
};
use moderation_server::tables::{BlockListTable, CensoredWordTable};
use tokio::task::JoinError;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Moderation Worker Starting ===");
    info!("Kafka Brokers: {}", config.kafka.brokers);
    info!("Input Topic: {}", config.kafka.messages_topic);
    info!("Output Topic: {}", config.kafka.filtered_topic);
    info!("Consumer Group: {}", config.kafka.consumer_group);

    // Derived tables; the word table seeds its default vocabulary here
    let blocked = Arc::new(BlockListTable::new());
    let censored = Arc::new(CensoredWordTable::new());

    // Output producer; an unreachable cluster at startup is fatal
    let output = ReliableProducer::new(&config.kafka, &config.kafka.filtered_topic)
        .context("Failed to create output producer")?;
    output
        .check_connectivity(CONNECT_TIMEOUT)
        .context("Cannot reach Kafka cluster")?;

    // One reader per input stream. The table readers get their own
    // group: they never commit offsets, so every startup replays their
    // topics from the beginning and rebuilds the tables.
    let table_group = format!("{}-tables", config.kafka.consumer_group);
    let messages = StreamReader::new(
        &config.kafka,
        &config.kafka.messages_topic,
        &config.kafka.consumer_group,
    )?;
    let block_events =
        StreamReader::new(&config.kafka, &config.kafka.blocked_users_topic, &table_group)?;
    let word_updates = StreamReader::new(
        &config.kafka,
        &config.kafka.censored_words_topic,
        &table_group,
    )?;

    // Shutdown flag, set by the signal-handler task
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_signal = shutdown.clone();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("SIGTERM received, initiating graceful shutdown...");
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("SIGINT received, initiating graceful shutdown...");
                }
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok();
            info!("Ctrl-C received, initiating graceful shutdown...");
        }
        shutdown_signal.store(true, Ordering::SeqCst);
    });

    let message_task = tokio::spawn(run_message_stream(
        messages,
        output,
        blocked.clone(),
        censored.clone(),
        shutdown.clone(),
    ));
    let block_task = tokio::spawn(run_block_event_stream(
        block_events,
        blocked,
        shutdown.clone(),
    ));
    let word_task = tokio::spawn(run_censored_word_stream(
        word_updates,
        censored,
        shutdown.clone(),
    ));

    // The message loop returns early only when it can no longer uphold
    // at-least-once (failed rewind after a failed emit). Stop the table
    // loops too rather than keep running without moderation; a restart
    // replays from the last committed offset.
    let message_result = message_task.await;
    shutdown.store(true, Ordering::SeqCst);
    log_task_result("messages", message_result);

    for (name, handle) in [("block_events", block_task), ("censored_words", word_task)] {
        log_task_result(name, handle.await);
    }

    info!("=== Moderation Worker Stopped ===");
    Ok(())
}

fn log_task_result(name: &str, result: Result<Result<()>, JoinError>) {
    match result {
        Ok(Ok(())) => info!(stream = name, "Stream task finished"),
        Ok(Err(e)) => error!(stream = name, error = %e, "Stream task failed"),
        Err(e) => error!(stream = name, error = %e, "Stream task panicked"),
    }
}
