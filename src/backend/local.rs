//! In-process operations.
//!
//! A [`LocalCallRegistry`] maps a qualified service name and an operation to
//! an async handler exchanging JSON values. Steps whose target has no `/`
//! are dispatched here.

use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use futures::{FutureExt, future::BoxFuture};
use log::debug;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::{BackendError, BackendExecutor, RegistryError};
use crate::{broker::BoxError, state::parse_lenient};

/// Type-erased in-process operation.
pub type LocalHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync>;

/// Concurrent table of in-process operations.
///
/// Cloning the registry shares the underlying table.
#[derive(Clone, Default)]
pub struct LocalCallRegistry {
    handlers: Arc<DashMap<(String, String), LocalHandler>>,
}

impl LocalCallRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Register `handler` under `target` and `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is taken.
    pub fn register<F, Fut>(&self, target: &str, operation: &str, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
    {
        let handler: LocalHandler = Arc::new(move |request| handler(request).boxed());
        match self.handlers.entry((target.to_owned(), operation.to_owned())) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate {
                target: target.to_owned(),
                operation: operation.to_owned(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(handler);
                Ok(())
            }
        }
    }

    /// Register a handler with typed request and response.
    ///
    /// The step payload is deserialised into `Req`; a payload that does not
    /// fit fails the call. The handler's `Resp` is serialised back to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is taken.
    pub fn register_typed<Req, Resp, F, Fut>(
        &self,
        target: &str,
        operation: &str,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        Req: DeserializeOwned + Send + 'static,
        Resp: Serialize + 'static,
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, BoxError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.register(target, operation, move |request| {
            let handler = Arc::clone(&handler);
            async move {
                let request: Req = serde_json::from_value(request)?;
                let response = handler(request).await?;
                Ok::<_, BoxError>(serde_json::to_value(response)?)
            }
        })
    }

    /// Look up the handler for `target` and `operation`.
    #[must_use]
    pub fn get(&self, target: &str, operation: &str) -> Option<LocalHandler> {
        self.handlers
            .get(&(target.to_owned(), operation.to_owned()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize { self.handlers.len() }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.handlers.is_empty() }
}

/// Executes in-process steps against a [`LocalCallRegistry`].
#[derive(Clone, Default)]
pub struct LocalCallExecutor {
    registry: LocalCallRegistry,
}

impl LocalCallExecutor {
    /// Dispatch to operations in `registry`.
    #[must_use]
    pub fn new(registry: LocalCallRegistry) -> Self { Self { registry } }

    /// The registry this executor reads.
    #[must_use]
    pub fn registry(&self) -> &LocalCallRegistry { &self.registry }
}

#[async_trait]
impl BackendExecutor for LocalCallExecutor {
    async fn execute(&self, target: &str, operation: &str, request: &str) -> Result<String, BackendError> {
        let Some(handler) = self.registry.get(target, operation) else {
            return Err(BackendError::UnknownOperation {
                target: target.to_owned(),
                operation: operation.to_owned(),
            });
        };
        debug!("calling in-process operation {target}.{operation}");
        let payload = if request.trim().is_empty() {
            Value::Null
        } else {
            parse_lenient(request)
        };
        let response = handler(payload)
            .await
            .map_err(|source| BackendError::LocalCall {
                target: target.to_owned(),
                operation: operation.to_owned(),
                source,
            })?;
        Ok(serde_json::to_string(&response)?)
    }
}
