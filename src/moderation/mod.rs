// ============================================================================
// Moderation Stage
// ============================================================================
//
// Consumes the message stream, reads the block-list and censored-word
// tables, decides drop-or-forward per message, redacts forbidden words
// from forwarded content, and emits survivors to the output stream.
//
// The stage never mutates either table. Suppression is best-effort
// eventually consistent with the block-event stream: a block event and
// a message racing through their separate streams may be processed in
// either order.
//
// ============================================================================

pub mod censor;
pub mod processor;
pub mod streams;

pub use censor::censor_text;
pub use processor::{moderate, ModerationOutcome};
