use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::metrics;

/// A peer-to-peer chat message.
///
/// This structure is serialized to JSON on the wire. The partition key
/// is the decimal string encoding of `sender_id`, so all messages from
/// one sender land on the same partition and keep their order.
///
/// `message_id` is scoped to the producing session; ids are NOT
/// globally unique across producers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message_id: u64,
    pub sender_id: u64,
    pub recipient_id: u64,
    pub content: String,
}

impl ChatMessage {
    /// Partition key preserving per-sender ordering.
    pub fn partition_key(&self) -> String {
        self.sender_id.to_string()
    }
}

/// A recipient's instruction to start or stop suppressing a sender.
///
/// Transient: consumed once to mutate block-list table state, never
/// retained afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEvent {
    pub user_id: String,
    pub blocked_user_id: String,
    pub action: BlockAction,
    /// Seconds since epoch
    pub timestamp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockAction {
    Block,
    Unblock,
}

impl BlockEvent {
    pub fn new(user_id: &str, blocked_user_id: &str, action: BlockAction) -> Self {
        Self {
            user_id: user_id.to_string(),
            blocked_user_id: blocked_user_id.to_string(),
            action,
            timestamp: epoch_seconds(),
        }
    }
}

/// An update to the global censored-word list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensorWordsUpdate {
    pub word: String,
    pub action: WordAction,
    /// Seconds since epoch
    pub timestamp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordAction {
    Add,
    Remove,
}

impl CensorWordsUpdate {
    pub fn new(word: &str, action: WordAction) -> Self {
        Self {
            word: word.to_string(),
            action,
            timestamp: epoch_seconds(),
        }
    }
}

fn epoch_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Serialize a record to its wire bytes.
///
/// The format is self-describing JSON: field names travel with the
/// record, so a reader that ignores unknown fields survives future
/// field additions. Should not fail for well-formed records; a failure
/// is fatal to the single publish attempt that hit it.
pub fn encode<T: Serialize>(record: &T) -> AppResult<Vec<u8>> {
    serde_json::to_vec(record).map_err(AppError::Encoding)
}

/// Decode wire bytes into a record.
///
/// Returns `None` on malformed input. Callers must treat `None` as
/// "drop and log", never as fatal: one bad record must not stall the
/// stream behind it.
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Option<T> {
    match serde_json::from_slice(payload) {
        Ok(record) => Some(record),
        Err(e) => {
            metrics::DECODE_FAILURES.inc();
            warn!(
                error = %e,
                payload_len = payload.len(),
                "Dropping undecodable record"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> ChatMessage {
        ChatMessage {
            message_id: 7,
            sender_id: 3,
            recipient_id: 5,
            content: "Hello, how are you today?".to_string(),
        }
    }

    #[test]
    fn test_message_round_trip() {
        let message = sample_message();
        let bytes = encode(&message).unwrap();
        let decoded: ChatMessage = decode(&bytes).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_block_event_round_trip() {
        let event = BlockEvent::new("5", "3", BlockAction::Block);
        let bytes = encode(&event).unwrap();
        let decoded: BlockEvent = decode(&bytes).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_word_update_round_trip() {
        let update = CensorWordsUpdate::new("crypto", WordAction::Add);
        let bytes = encode(&update).unwrap();
        let decoded: CensorWordsUpdate = decode(&bytes).unwrap();
        assert_eq!(decoded, update);
    }

    #[test]
    fn test_actions_use_lowercase_wire_names() {
        let event = BlockEvent::new("1", "2", BlockAction::Unblock);
        let json = String::from_utf8(encode(&event).unwrap()).unwrap();
        assert!(json.contains("\"unblock\""));

        let update = CensorWordsUpdate::new("x", WordAction::Remove);
        let json = String::from_utf8(encode(&update).unwrap()).unwrap();
        assert!(json.contains("\"remove\""));
    }

    #[test]
    fn test_decode_truncated_bytes_returns_none() {
        let mut bytes = encode(&sample_message()).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert_eq!(decode::<ChatMessage>(&bytes), None);
    }

    #[test]
    fn test_decode_garbage_returns_none() {
        assert_eq!(decode::<ChatMessage>(b"not json at all"), None);
        assert_eq!(decode::<ChatMessage>(b""), None);
        assert_eq!(decode::<BlockEvent>(&[0xff, 0xfe, 0x00]), None);
    }

    #[test]
    fn test_decode_wrong_shape_returns_none() {
        // Valid JSON, wrong record shape
        assert_eq!(decode::<ChatMessage>(b"{\"message_id\": \"nope\"}"), None);
        assert_eq!(decode::<ChatMessage>(b"[1, 2, 3]"), None);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = br#"{
            "message_id": 1,
            "sender_id": 2,
            "recipient_id": 3,
            "content": "hi",
            "added_in_a_future_version": true
        }"#;
        let decoded: ChatMessage = decode(json).unwrap();
        assert_eq!(decoded.message_id, 1);
        assert_eq!(decoded.content, "hi");
    }

    #[test]
    fn test_partition_key_is_sender_id() {
        assert_eq!(sample_message().partition_key(), "3");
    }
}
