use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use tokio::sync::RwLock;
use tracing::debug;

use crate::codec::{BlockAction, BlockEvent};
use crate::metrics;

const SHARD_COUNT: usize = 16;

/// Per-recipient block lists: `recipient_id -> set of blocked sender ids`.
///
/// Storage is sharded by recipient key, so a read-modify-write holds
/// one shard's write lock and writers for different recipients almost
/// never contend. Readers get a cloned snapshot of a single key's set
/// and can never observe a half-applied mutation.
pub struct BlockListTable {
    shards: Vec<RwLock<HashMap<String, HashSet<String>>>>,
}

impl BlockListTable {
    pub fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| RwLock::new(HashMap::new())).collect(),
        }
    }

    fn shard_for(&self, key: &str) -> &RwLock<HashMap<String, HashSet<String>>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }

    /// Snapshot of the blocked-sender set for a recipient.
    ///
    /// An unseen recipient resolves to the documented default: the
    /// empty set. Never an error.
    pub async fn get(&self, recipient_id: &str) -> HashSet<String> {
        self.shard_for(recipient_id)
            .read()
            .await
            .get(recipient_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Apply one block/unblock event.
    ///
    /// Idempotent in both directions: blocking an already-blocked pair
    /// and unblocking an already-unblocked pair are no-ops.
    pub async fn apply(&self, event: &BlockEvent) {
        let mut shard = self.shard_for(&event.user_id).write().await;
        let entry = shard.entry(event.user_id.clone()).or_default();

        let changed = match event.action {
            BlockAction::Block => entry.insert(event.blocked_user_id.clone()),
            BlockAction::Unblock => entry.remove(&event.blocked_user_id),
        };

        if changed {
            metrics::BLOCK_EVENTS_APPLIED.inc();
        }
        debug!(
            user_id = %event.user_id,
            blocked_user_id = %event.blocked_user_id,
            action = ?event.action,
            changed,
            "Applied block event"
        );
    }

    /// Rebuild table state by replaying a sequence of events in order.
    /// Used for startup/takeover recovery from the update stream.
    pub async fn replay<I>(&self, events: I)
    where
        I: IntoIterator<Item = BlockEvent>,
    {
        for event in events {
            self.apply(&event).await;
        }
    }
}

impl Default for BlockListTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(user: &str, blocked: &str) -> BlockEvent {
        BlockEvent::new(user, blocked, BlockAction::Block)
    }

    fn unblock(user: &str, blocked: &str) -> BlockEvent {
        BlockEvent::new(user, blocked, BlockAction::Unblock)
    }

    #[tokio::test]
    async fn test_unseen_recipient_defaults_to_empty_set() {
        let table = BlockListTable::new();
        assert!(table.get("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn test_block_is_idempotent() {
        let table = BlockListTable::new();
        table.apply(&block("5", "3")).await;
        table.apply(&block("5", "3")).await;

        let blocked = table.get("5").await;
        assert_eq!(blocked.len(), 1);
        assert!(blocked.contains("3"));
    }

    #[tokio::test]
    async fn test_unblock_removes_and_is_idempotent() {
        let table = BlockListTable::new();
        table.apply(&block("5", "3")).await;
        table.apply(&unblock("5", "3")).await;
        assert!(table.get("5").await.is_empty());

        // Unblocking an already-unblocked pair is a no-op
        table.apply(&unblock("5", "3")).await;
        assert!(table.get("5").await.is_empty());
    }

    #[tokio::test]
    async fn test_recipients_are_independent() {
        let table = BlockListTable::new();
        table.apply(&block("5", "3")).await;
        table.apply(&block("6", "4")).await;

        assert!(table.get("5").await.contains("3"));
        assert!(!table.get("5").await.contains("4"));
        assert!(table.get("6").await.contains("4"));
    }

    #[tokio::test]
    async fn test_replay_rebuilds_net_state() {
        let table = BlockListTable::new();
        table
            .replay(vec![
                block("5", "3"),
                block("5", "7"),
                unblock("5", "3"),
                block("5", "3"),
                unblock("5", "7"),
            ])
            .await;

        let blocked = table.get("5").await;
        assert!(blocked.contains("3"));
        assert!(!blocked.contains("7"));
    }
}
