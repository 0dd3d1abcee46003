use tokio::sync::RwLock;
use tracing::debug;

use crate::codec::{CensorWordsUpdate, WordAction};
use crate::metrics;

/// Fixed seed vocabulary, applied once when the table is created.
/// Seeded words may be removed later like any other word.
pub const DEFAULT_CENSORED_WORDS: [&str; 12] = [
    "spam",
    "advertisement",
    "promo",
    "discount",
    "badword",
    "offensive",
    "hate",
    "violence",
    "sex",
    "porn",
    "gambling",
    "casino",
];

/// Global censored-word table: one logical key holding the word list.
///
/// Words are stored in insertion order (a Vec with set semantics
/// enforced on insert), so redaction iterates over words in the order
/// they were added. Readers get a cloned snapshot; the single writer
/// is the word-update stream loop.
pub struct CensoredWordTable {
    words: RwLock<Vec<String>>,
}

impl CensoredWordTable {
    /// Create the table seeded with the default vocabulary.
    ///
    /// Seeding happens here and nowhere else, so it runs at most once
    /// per table lifetime and is never re-applied after updates.
    pub fn new() -> Self {
        Self::with_words(&DEFAULT_CENSORED_WORDS)
    }

    /// Create the table with a caller-chosen word list. Lets tests fix
    /// the construction order the redaction pass iterates in.
    pub fn with_words(words: &[&str]) -> Self {
        Self {
            words: RwLock::new(words.iter().map(|w| w.to_string()).collect()),
        }
    }

    /// Snapshot of the current word list, in insertion order.
    pub async fn snapshot(&self) -> Vec<String> {
        self.words.read().await.clone()
    }

    /// Apply one add/remove update.
    ///
    /// Idempotent: adding a present word and removing an absent word
    /// are no-ops.
    pub async fn apply(&self, update: &CensorWordsUpdate) {
        let mut words = self.words.write().await;

        let changed = match update.action {
            WordAction::Add => {
                if words.iter().any(|w| w == &update.word) {
                    false
                } else {
                    words.push(update.word.clone());
                    true
                }
            }
            WordAction::Remove => {
                let before = words.len();
                words.retain(|w| w != &update.word);
                words.len() != before
            }
        };

        if changed {
            metrics::WORD_UPDATES_APPLIED.inc();
        }
        debug!(
            word = %update.word,
            action = ?update.action,
            changed,
            "Applied censored-word update"
        );
    }
}

impl Default for CensoredWordTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(word: &str) -> CensorWordsUpdate {
        CensorWordsUpdate::new(word, WordAction::Add)
    }

    fn remove(word: &str) -> CensorWordsUpdate {
        CensorWordsUpdate::new(word, WordAction::Remove)
    }

    #[tokio::test]
    async fn test_seeded_with_defaults_in_order() {
        let table = CensoredWordTable::new();
        let words = table.snapshot().await;
        assert_eq!(words.len(), DEFAULT_CENSORED_WORDS.len());
        assert_eq!(words[0], "spam");
        assert_eq!(words[11], "casino");
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let table = CensoredWordTable::new();
        table.apply(&add("crypto")).await;
        table.apply(&add("crypto")).await;

        let words = table.snapshot().await;
        assert_eq!(words.iter().filter(|w| *w == "crypto").count(), 1);
        // New words go at the end
        assert_eq!(words.last().map(String::as_str), Some("crypto"));
    }

    #[tokio::test]
    async fn test_default_words_are_removable() {
        let table = CensoredWordTable::new();
        table.apply(&remove("spam")).await;
        assert!(!table.snapshot().await.contains(&"spam".to_string()));
    }

    #[tokio::test]
    async fn test_remove_absent_word_is_noop() {
        let table = CensoredWordTable::new();
        let before = table.snapshot().await;
        table.apply(&remove("not-there")).await;
        assert_eq!(table.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_re_add_moves_word_to_end() {
        let table = CensoredWordTable::with_words(&["a", "b"]);
        table.apply(&remove("a")).await;
        table.apply(&add("a")).await;
        assert_eq!(table.snapshot().await, vec!["b", "a"]);
    }
}
