// Derived state tables
//
// Both tables are process-local keyed state materialized from a
// dedicated update stream. The moderation stage only reads them; the
// only writers are the stream loops that consume their update topics.
// On startup or partition takeover the tables are rebuilt by replaying
// the update stream (see `moderation::streams`), so applies must be
// idempotent.

pub mod block_list;
pub mod censored_words;

pub use block_list::BlockListTable;
pub use censored_words::{CensoredWordTable, DEFAULT_CENSORED_WORDS};
