// ============================================================================
// Moderation Server
// ============================================================================
//
// Real-time moderation of a peer-to-peer message stream.
//
// Pipeline:
//   load-generator -> "messages" topic -> moderation worker -> "filtered_messages"
//
// Side inputs:
//   "blocked_users" topic   -> per-recipient block-list table
//   "censored_words" topic  -> global censored-word table
//
// The moderation worker drops messages whose sender is blocked by the
// recipient and redacts forbidden words from the rest. Both tables are
// process-local derived state, rebuilt from their update streams on
// startup; the worker only ever reads them while moderating.
//
// Delivery guarantee is at-least-once end to end: the producer requires
// acknowledgment from all in-sync replicas, and the worker commits its
// input offset only after the output record is acknowledged.
//
// ============================================================================

pub mod codec;
pub mod config;
pub mod error;
pub mod generator;
pub mod kafka;
pub mod metrics;
pub mod moderation;
pub mod tables;
