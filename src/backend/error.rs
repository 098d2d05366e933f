//! Errors raised by backend executors.

use thiserror::Error;

use crate::broker::{BoxError, ConsumeError, ProduceError};

/// Failures while executing a step against a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP transport failed before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
    /// The step operation is not a valid HTTP method.
    #[error("unsupported HTTP method '{0}'")]
    InvalidMethod(String),
    /// The resolved request cannot be sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The response body is not JSON.
    #[error("malformed response (status {status}): {reason}")]
    MalformedResponse {
        /// HTTP status of the response.
        status: u16,
        /// Parser message.
        reason: String,
    },
    /// Nothing is registered under the target and operation.
    #[error("no operation '{operation}' registered for '{target}'")]
    UnknownOperation {
        /// Step target.
        target: String,
        /// Step operation.
        operation: String,
    },
    /// A registered in-process operation returned an error.
    #[error("call to '{target}.{operation}' failed: {source}")]
    LocalCall {
        /// Step target.
        target: String,
        /// Step operation.
        operation: String,
        /// Error returned by the handler.
        #[source]
        source: BoxError,
    },
    /// The backend needed by the step has not been configured.
    #[error("{0} is not configured")]
    Unavailable(&'static str),
    /// Publishing failed or the records list was malformed.
    #[error(transparent)]
    Produce(#[from] ProduceError),
    /// Receiving failed or was misconfigured.
    #[error(transparent)]
    Consume(#[from] ConsumeError),
    /// Serialising a handler result or status failed.
    #[error("failed to serialise response: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised when registering in-process operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// An operation is already registered under this name.
    #[error("operation '{operation}' is already registered for '{target}'")]
    Duplicate {
        /// Qualified service name.
        target: String,
        /// Operation name.
        operation: String,
    },
}
