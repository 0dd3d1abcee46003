// ============================================================================
// Stream Loops
// ============================================================================
//
// One task per input stream, coordinating only through the shared
// tables and the broker:
//
// - message stream:       consume -> moderate -> emit -> commit
// - block-event stream:   consume -> apply to block-list table
// - word-update stream:   consume -> apply to censored-word table
//
// The message loop commits its input offset only after the output
// record is acknowledged (or the message was suppressed/undecodable),
// keeping the stage at-least-once. When an emit fails, the partition
// is rewound to the failed record before anything else happens:
// receiving a record already advances the consumer position past it,
// so without the rewind the commit that follows the next successful
// emit would skip the failed record for good.
//
// The table loops never commit: their topics are the recovery log for
// process-local state, so on startup or partition takeover the group
// re-reads them from the beginning and rebuilds the tables by replay.
// Applies are idempotent, which makes the replay safe.
//
// Shutdown is checked between records only — a record being processed
// is always finished, so a table update is never left half-applied.
//
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use super::processor::{moderate, ModerationOutcome};
use crate::codec::{self, BlockEvent, CensorWordsUpdate, ChatMessage};
use crate::kafka::consumer::StreamRecord;
use crate::kafka::{ReliableProducer, StreamReader};
use crate::tables::{BlockListTable, CensoredWordTable};

/// How long a loop waits on the broker before re-checking the shutdown
/// flag. Waiting on recv is the sole idle state; there is no busy loop.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause between retries of a record whose emit failed.
const EMIT_RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Message-stream loop: the moderation stage proper.
///
/// Returns an error only when the stage can no longer uphold its
/// at-least-once contract (a failed rewind after a failed emit); the
/// caller is expected to stop the worker so a restart replays from
/// the last committed offset.
pub async fn run_message_stream(
    reader: StreamReader,
    producer: ReliableProducer,
    blocked: Arc<BlockListTable>,
    censored: Arc<CensoredWordTable>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    info!(topic = reader.topic(), "Moderation stream started");
    let mut processed: u64 = 0;

    while !shutdown.load(Ordering::SeqCst) {
        let Some(record) = poll_record(&reader).await else {
            continue;
        };

        let Some(message) = codec::decode::<ChatMessage>(&record.payload) else {
            // Malformed record: drop it and keep the stream moving
            commit_or_log(&reader);
            continue;
        };

        match moderate(&message, &blocked, &censored).await {
            ModerationOutcome::Forward(output) => {
                let bytes = match codec::encode(&output) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        error!(
                            error = %e,
                            message_id = output.message_id,
                            "Failed to encode output record, dropping"
                        );
                        commit_or_log(&reader);
                        continue;
                    }
                };

                match producer
                    .send_awaited(output.partition_key(), bytes, SEND_TIMEOUT)
                    .await
                {
                    Ok((partition, offset)) => {
                        debug!(
                            message_id = output.message_id,
                            partition, offset, "Forwarded moderated message"
                        );
                        commit_or_log(&reader);
                    }
                    Err(e) => {
                        error!(
                            error = %e,
                            message_id = output.message_id,
                            "Failed to emit moderated message - rewinding input to retry"
                        );
                        // The consumer position is already past this
                        // record; rewind so it is delivered again and a
                        // later commit cannot skip it. A failed rewind
                        // ends the loop: redelivery can no longer be
                        // guaranteed in this session, only by restart.
                        reader
                            .seek(record.partition, record.offset)
                            .context("Failed to rewind after emit failure")?;
                        tokio::time::sleep(EMIT_RETRY_PAUSE).await;
                    }
                }
            }
            ModerationOutcome::Suppressed => {
                // Terminal outcome for this message
                commit_or_log(&reader);
            }
        }

        processed += 1;
        if processed % 100 == 0 {
            info!(processed, "Moderation progress");
        }
    }

    info!("Moderation stream stopped");
    Ok(())
}

/// Block-event stream loop: maintains the block-list table.
pub async fn run_block_event_stream(
    reader: StreamReader,
    blocked: Arc<BlockListTable>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    info!(topic = reader.topic(), "Block-event stream started");

    while !shutdown.load(Ordering::SeqCst) {
        let Some(record) = poll_record(&reader).await else {
            continue;
        };

        let Some(event) = codec::decode::<BlockEvent>(&record.payload) else {
            continue;
        };

        info!(
            user_id = %event.user_id,
            blocked_user_id = %event.blocked_user_id,
            action = ?event.action,
            "Processing block event"
        );
        blocked.apply(&event).await;
    }

    info!("Block-event stream stopped");
    Ok(())
}

/// Word-update stream loop: maintains the censored-word table.
pub async fn run_censored_word_stream(
    reader: StreamReader,
    censored: Arc<CensoredWordTable>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    info!(topic = reader.topic(), "Censored-word stream started");

    while !shutdown.load(Ordering::SeqCst) {
        let Some(record) = poll_record(&reader).await else {
            continue;
        };

        let Some(update) = codec::decode::<CensorWordsUpdate>(&record.payload) else {
            continue;
        };

        info!(
            word = %update.word,
            action = ?update.action,
            "Processing censored-word update"
        );
        censored.apply(&update).await;
    }

    info!("Censored-word stream stopped");
    Ok(())
}

/// Wait up to `POLL_INTERVAL` for the next record so the caller can
/// observe the shutdown flag between records. Receive errors are
/// logged and paced; they never kill the loop.
async fn poll_record(reader: &StreamReader) -> Option<StreamRecord> {
    match tokio::time::timeout(POLL_INTERVAL, reader.recv_record()).await {
        Ok(Ok(record)) => Some(record),
        Ok(Err(e)) => {
            error!(topic = reader.topic(), error = %e, "Stream receive failed");
            tokio::time::sleep(Duration::from_secs(1)).await;
            None
        }
        Err(_elapsed) => None,
    }
}

fn commit_or_log(reader: &StreamReader) {
    if let Err(e) = reader.commit() {
        error!(topic = reader.topic(), error = %e, "Failed to commit offset");
    }
}
