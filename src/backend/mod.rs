//! Backend executors.
//!
//! Each [`BackendKind`](crate::scenario::BackendKind) has one executor
//! implementing [`BackendExecutor`]: [`HttpExecutor`] for REST targets,
//! [`LocalCallExecutor`] for in-process operations and [`MessageExecutor`]
//! for broker topics. Executors receive a fully resolved target and request
//! and return the raw response text.

mod error;
pub mod http;
mod local;
mod message;

use async_trait::async_trait;
pub use error::{BackendError, RegistryError};
pub use http::{HttpExecutor, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use local::{LocalCallExecutor, LocalCallRegistry, LocalHandler};
pub use message::MessageExecutor;

/// Executes one resolved step.
#[async_trait]
pub trait BackendExecutor: Send + Sync {
    /// Run `operation` against `target` with the JSON text `request`.
    async fn execute(&self, target: &str, operation: &str, request: &str) -> Result<String, BackendError>;
}

#[async_trait]
impl<T: BackendExecutor + ?Sized> BackendExecutor for std::sync::Arc<T> {
    async fn execute(&self, target: &str, operation: &str, request: &str) -> Result<String, BackendError> {
        (**self).execute(target, operation, request).await
    }
}
