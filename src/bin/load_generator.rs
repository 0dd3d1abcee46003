// Load generator entry point.
//
// Publishes synthetic peer-to-peer messages into the "messages" topic.
// Takes an optional positional argument: the number of messages to
// produce (default 50). Exits 0 on completion or operator interrupt,
// non-zero if the broker cannot be reached at startup.

use std::time::Duration;

use anyhow::{Context, Result};
use moderation_server::config::Config;
use moderation_server::generator::LoadGenerator;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let count = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u32>()
            .with_context(|| format!("Invalid message count: {arg}"))?,
        None => config.generator.message_count,
    };

    info!("=== Load Generator Starting ===");
    info!("Kafka Brokers: {}", config.kafka.brokers);
    info!("Topic: {}", config.kafka.messages_topic);
    info!("Messages: {}", count);

    let mut generator = LoadGenerator::new(&config).context("Failed to start load generator")?;

    generator
        .run(
            Duration::from_millis(config.generator.send_interval_ms),
            count,
            config.generator.user_pool_size,
        )
        .await?;

    generator.close();
    info!("=== Load Generator Stopped ===");
    Ok(())
}
