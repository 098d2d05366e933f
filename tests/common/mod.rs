//! Shared utilities for integration tests.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::sync::Arc;

use stepwright::{
    EndpointConfig,
    LocalCallExecutor,
    LocalCallRegistry,
    MessageExecutor,
    ScenarioRunner,
    StepDispatcher,
    broker::{BrokerProducer, ConsumerFactory},
    config::ConsumerDefaults,
};

/// Result type used by integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Runner with the real HTTP executor pointed at `127.0.0.1:<port>`.
pub fn http_runner(port: u16, registry: LocalCallRegistry) -> ScenarioRunner {
    let dispatcher = StepDispatcher::new(EndpointConfig::new("http://127.0.0.1", port, ""))
        .with_local(LocalCallExecutor::new(registry));
    ScenarioRunner::new(dispatcher)
}

/// Runner whose message backend uses the given broker doubles.
pub fn broker_runner(
    producer: Arc<dyn BrokerProducer>,
    consumers: Arc<dyn ConsumerFactory>,
    defaults: ConsumerDefaults,
) -> ScenarioRunner {
    let message = MessageExecutor::new()
        .with_producer(producer)
        .with_consumers(consumers)
        .with_defaults(defaults);
    ScenarioRunner::new(StepDispatcher::new(EndpointConfig::default()).with_message(message))
}
