use tracing::info;

use super::censor::censor_text;
use crate::codec::ChatMessage;
use crate::metrics;
use crate::tables::{BlockListTable, CensoredWordTable};

/// Outcome of moderating one message.
///
/// Controls what the stream loop emits: `Forward` carries the output
/// record, `Suppressed` emits nothing. Both are terminal for the input
/// record — a suppressed message is never retried or re-queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationOutcome {
    /// Emit this (possibly redacted) message to the output stream
    Forward(ChatMessage),
    /// Sender is blocked by the recipient; emit nothing
    Suppressed,
}

/// Decide drop-or-forward for one message and apply redaction.
///
/// Reads current snapshots of both tables; never mutates either. The
/// snapshots may be stale relative to in-flight control events (the
/// update streams are consumed independently), bounded only by stream
/// consumption latency.
pub async fn moderate(
    message: &ChatMessage,
    blocked: &BlockListTable,
    censored: &CensoredWordTable,
) -> ModerationOutcome {
    let blocked_senders = blocked.get(&message.recipient_id.to_string()).await;
    if blocked_senders.contains(&message.sender_id.to_string()) {
        metrics::MESSAGES_SUPPRESSED.inc();
        info!(
            sender_id = message.sender_id,
            recipient_id = message.recipient_id,
            "Message suppressed - sender is blocked by recipient"
        );
        return ModerationOutcome::Suppressed;
    }

    let words = censored.snapshot().await;
    let content = censor_text(&message.content, &words);
    if content != message.content {
        metrics::MESSAGES_REDACTED.inc();
    }
    metrics::MESSAGES_FORWARDED.inc();

    ModerationOutcome::Forward(ChatMessage {
        content,
        ..message.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BlockAction, BlockEvent};

    fn message(sender: u64, recipient: u64, content: &str) -> ChatMessage {
        ChatMessage {
            message_id: 1,
            sender_id: sender,
            recipient_id: recipient,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_blocked_sender_is_suppressed() {
        let blocked = BlockListTable::new();
        let censored = CensoredWordTable::new();
        blocked
            .apply(&BlockEvent::new("5", "3", BlockAction::Block))
            .await;

        let outcome = moderate(&message(3, 5, "hello"), &blocked, &censored).await;
        assert_eq!(outcome, ModerationOutcome::Suppressed);
    }

    #[tokio::test]
    async fn test_other_senders_still_reach_recipient() {
        let blocked = BlockListTable::new();
        let censored = CensoredWordTable::new();
        blocked
            .apply(&BlockEvent::new("5", "3", BlockAction::Block))
            .await;

        let input = message(4, 5, "hello");
        let outcome = moderate(&input, &blocked, &censored).await;
        assert_eq!(outcome, ModerationOutcome::Forward(input));
    }

    #[tokio::test]
    async fn test_unblock_restores_delivery() {
        let blocked = BlockListTable::new();
        let censored = CensoredWordTable::new();
        blocked
            .apply(&BlockEvent::new("5", "3", BlockAction::Block))
            .await;
        blocked
            .apply(&BlockEvent::new("5", "3", BlockAction::Unblock))
            .await;

        let input = message(3, 5, "hello");
        let outcome = moderate(&input, &blocked, &censored).await;
        assert_eq!(outcome, ModerationOutcome::Forward(input));
    }

    #[tokio::test]
    async fn test_forwarded_content_is_redacted() {
        let blocked = BlockListTable::new();
        let censored = CensoredWordTable::new();

        let outcome = moderate(
            &message(3, 5, "Check out this spam message!"),
            &blocked,
            &censored,
        )
        .await;

        match outcome {
            ModerationOutcome::Forward(output) => {
                assert_eq!(output.content, "Check out this **** message!");
                // Everything except content survives untouched
                assert_eq!(output.message_id, 1);
                assert_eq!(output.sender_id, 3);
                assert_eq!(output.recipient_id, 5);
            }
            ModerationOutcome::Suppressed => panic!("message should be forwarded"),
        }
    }
}
