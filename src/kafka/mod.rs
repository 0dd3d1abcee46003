// Kafka transport layer
//
// Thin wrappers over rdkafka carrying the pipeline's delivery contract:
// the producer enforces the fixed acks/retry/batching configuration,
// the consumer handles subscription and manual offset commits.

pub mod consumer;
pub mod producer;

pub use consumer::{StreamReader, StreamRecord};
pub use producer::ReliableProducer;
