//! Error types for broker produce and receive operations.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Boxed error returned by broker client implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures reported by a broker client.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Creating or subscribing a consumer failed.
    #[error("failed to subscribe to topic '{topic}': {source}")]
    Subscribe {
        /// Topic being subscribed to.
        topic: String,
        /// Client error.
        #[source]
        source: BoxError,
    },
    /// A poll call failed.
    #[error("poll failed: {0}")]
    Poll(#[source] BoxError),
    /// Committing consumer offsets failed.
    #[error("offset commit failed: {0}")]
    Commit(#[source] BoxError),
    /// Publishing a record failed.
    #[error("failed to publish to topic '{topic}': {source}")]
    Publish {
        /// Destination topic.
        topic: String,
        /// Client error.
        #[source]
        source: BoxError,
    },
}

/// Errors raised by a produce operation.
#[derive(Debug, Error)]
pub enum ProduceError {
    /// The request has a `records` field that is not a list of records.
    #[error("invalid records list: {0}")]
    InvalidRecords(#[source] serde_json::Error),
    /// The broker client failed.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Invalid receive configuration. Raised before any broker interaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Synchronous and asynchronous commits were both requested.
    #[error("both commitSync and commitAsync are enabled; at most one may be true")]
    BothCommitModes,
    /// The `consumerLocalConfigs` object could not be read.
    #[error("invalid consumer local configuration: {0}")]
    InvalidLocalConfig(String),
}

/// Errors raised by a receive operation.
#[derive(Debug, Error)]
pub enum ConsumeError {
    /// The receive was misconfigured; no poll was issued.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The broker client failed.
    #[error(transparent)]
    Broker(#[from] BrokerError),
    /// Writing the records dump failed.
    #[error("failed to dump records to {}: {source}", .path.display())]
    Dump {
        /// Requested dump location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Rendering the result as JSON failed.
    #[error("failed to render consumed records: {0}")]
    Render(#[from] serde_json::Error),
}
