#![doc(html_root_url = "https://docs.rs/stepwright/latest")]
//! Public API for the `stepwright` library.
//!
//! This crate runs declarative, multi-step test scenarios against HTTP
//! endpoints, in-process operations and message-broker topics. Steps pass
//! values to later steps through `${$.<step>.<path>}` placeholders and check
//! responses against partial JSON fragments.
//!
//! ```no_run
//! use stepwright::{EngineConfig, ScenarioRunner, ScenarioSpec};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let scenario = ScenarioSpec::from_file("scenarios/users.json")?;
//! let report = ScenarioRunner::from_config(&EngineConfig::default()).run(&scenario).await;
//! assert!(report.passed());
//! # Ok(())
//! # }
//! ```

pub mod assertion;
pub mod backend;
pub mod broker;
pub mod config;
pub mod correlation;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod resolver;
pub mod runner;
pub mod scenario;
pub mod state;

pub use assertion::{AssertionReport, evaluate};
pub use backend::{
    BackendError,
    BackendExecutor,
    HttpExecutor,
    LocalCallExecutor,
    LocalCallRegistry,
    MessageExecutor,
};
pub use config::{ConsumerDefaults, EndpointConfig, EngineConfig};
pub use correlation::CorrelationId;
pub use dispatch::StepDispatcher;
pub use error::{Result, StepError};
pub use metrics::{IDLE_POLLS, RECORDS_CONSUMED, RECORDS_PRODUCED, STEPS_TOTAL};
pub use resolver::{ResolutionError, resolve, resolve_text};
pub use runner::{ScenarioReport, ScenarioRunner, StepOutcome, StepReport};
pub use scenario::{BackendKind, ScenarioSpec, Step};
pub use state::{ScenarioExecutionState, StateError, StepExecutionState};
