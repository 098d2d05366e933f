//! Message-broker seams and the receive/produce operations built on them.
//!
//! Client construction (connection properties, security, serialisers) is
//! left to the host. The engine only needs the capabilities described by
//! [`BrokerConsumer`], [`ConsumerFactory`] and [`BrokerProducer`].

mod commit;
mod consume;
mod delivery;
mod error;
mod produce;

use std::time::Duration;

use async_trait::async_trait;
pub use commit::{CommitMode, ConsumeSettings, ConsumerLocalConfig};
pub use consume::{ConsumptionLoop, LoopState, receive};
pub use delivery::{
    BrokerRecord,
    ConsumedRecords,
    DeliveryStatus,
    ProducerRecord,
    RecordMetadata,
    STATUS_OK,
};
pub use error::{BoxError, BrokerError, ConfigurationError, ConsumeError, ProduceError};
pub use produce::produce;

/// A subscribed consumer owned by exactly one receive.
///
/// `poll` must return within roughly `timeout`, yielding an empty batch when
/// nothing arrived.
#[async_trait]
pub trait BrokerConsumer: Send {
    /// Fetch the next batch of records.
    async fn poll(&mut self, timeout: Duration) -> Result<Vec<BrokerRecord>, BrokerError>;

    /// Commit consumed offsets and wait for the acknowledgement.
    async fn commit_sync(&mut self) -> Result<(), BrokerError>;

    /// Request an offset commit without waiting for it.
    fn commit_async(&mut self) -> Result<(), BrokerError>;

    /// Release the consumer. Called exactly once per receive.
    fn close(&mut self);
}

/// Creates a fresh consumer subscribed to a topic.
#[async_trait]
pub trait ConsumerFactory: Send + Sync {
    /// Subscribe a new consumer to `topic`.
    async fn subscribe(&self, topic: &str) -> Result<Box<dyn BrokerConsumer>, BrokerError>;
}

/// Publishes records to a topic.
#[async_trait]
pub trait BrokerProducer: Send + Sync {
    /// Publish one record and report where it landed.
    async fn send(&self, topic: &str, record: ProducerRecord) -> Result<RecordMetadata, BrokerError>;
}
