//! Message-broker backend.

use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use super::{BackendError, BackendExecutor};
use crate::{
    broker::{BrokerProducer, ConsumerFactory, produce, receive},
    config::ConsumerDefaults,
    scenario::TOPIC_SCHEME,
};

/// Executes `topic://` steps.
///
/// `produce`/`send` publish the payload, `consume`/`receive` run a
/// consumption loop. Either side may be left unconfigured.
#[derive(Clone, Default)]
pub struct MessageExecutor {
    producer: Option<Arc<dyn BrokerProducer>>,
    consumers: Option<Arc<dyn ConsumerFactory>>,
    defaults: ConsumerDefaults,
}

impl MessageExecutor {
    /// Create an executor with no broker attached.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Publish through `producer`.
    #[must_use]
    pub fn with_producer(mut self, producer: Arc<dyn BrokerProducer>) -> Self {
        self.producer = Some(producer);
        self
    }

    /// Subscribe consumers through `factory`.
    #[must_use]
    pub fn with_consumers(mut self, factory: Arc<dyn ConsumerFactory>) -> Self {
        self.consumers = Some(factory);
        self
    }

    /// Defaults applied when a receive does not override them.
    #[must_use]
    pub fn with_defaults(mut self, defaults: ConsumerDefaults) -> Self {
        self.defaults = defaults.normalized();
        self
    }
}

#[async_trait]
impl BackendExecutor for MessageExecutor {
    async fn execute(&self, target: &str, operation: &str, request: &str) -> Result<String, BackendError> {
        let topic = target.strip_prefix(TOPIC_SCHEME).unwrap_or(target);
        if topic.is_empty() {
            return Err(BackendError::InvalidRequest(format!("no topic in '{target}'")));
        }
        match operation.to_ascii_lowercase().as_str() {
            "produce" | "send" => {
                let producer = self
                    .producer
                    .as_deref()
                    .ok_or(BackendError::Unavailable("message producer"))?;
                let status = produce(producer, topic, request).await?;
                info!("produced {} record(s) to {topic}", status.records_count);
                Ok(serde_json::to_string(&status)?)
            }
            "consume" | "receive" => {
                let factory = self
                    .consumers
                    .as_deref()
                    .ok_or(BackendError::Unavailable("message consumer"))?;
                Ok(receive(factory, topic, request, &self.defaults).await?)
            }
            _ => Err(BackendError::UnknownOperation {
                target: target.to_owned(),
                operation: operation.to_owned(),
            }),
        }
    }
}
