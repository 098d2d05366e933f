//! Execution state threaded through a scenario run.
//!
//! [`ScenarioExecutionState`] is an append-only log of completed steps keyed
//! by their resolved names. Placeholders can only see what has been recorded,
//! so a reference to the current step or a later one fails at lookup time.

use serde_json::{Map, Value, json};
use thiserror::Error;

/// Errors raised when merging a step into the scenario state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// A step with this resolved name was already recorded in this pass.
    #[error("step name '{0}' was already recorded in this scenario pass")]
    DuplicateStep(String),
}

/// Scratch record for one step iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct StepExecutionState {
    name: String,
    request: Value,
    response: Value,
}

impl StepExecutionState {
    /// Start a record for the step with resolved name `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            request: Value::Null,
            response: Value::Null,
        }
    }

    /// Store the resolved request text.
    ///
    /// Text that is not JSON is kept as a JSON string.
    pub fn set_request(&mut self, request: &str) { self.request = parse_lenient(request); }

    /// Store the raw response text.
    ///
    /// Text that is not JSON is kept as a JSON string.
    pub fn set_response(&mut self, response: &str) { self.response = parse_lenient(response); }

    /// Resolved step name.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Resolved request.
    #[must_use]
    pub fn request(&self) -> &Value { &self.request }

    /// Parsed response.
    #[must_use]
    pub fn response(&self) -> &Value { &self.response }
}

/// Parse `text` as JSON, falling back to a JSON string.
#[must_use]
pub fn parse_lenient(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

/// Ordered record of every step completed in the current scenario pass.
#[derive(Clone, Debug, Default)]
pub struct ScenarioExecutionState {
    steps: Map<String, Value>,
}

impl ScenarioExecutionState {
    /// Create an empty state for a new scenario pass.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Merge a completed step.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::DuplicateStep`] when the name is already present.
    pub fn record(&mut self, step: StepExecutionState) -> Result<(), StateError> {
        if self.steps.contains_key(&step.name) {
            return Err(StateError::DuplicateStep(step.name));
        }
        let entry = json!({ "request": step.request, "response": step.response });
        self.steps.insert(step.name, entry);
        Ok(())
    }

    /// Look up the `{request, response}` record of a completed step.
    #[must_use]
    pub fn step(&self, name: &str) -> Option<&Value> { self.steps.get(name) }

    /// Names of completed steps in completion order.
    pub fn step_names(&self) -> impl Iterator<Item = &str> { self.steps.keys().map(String::as_str) }

    /// Number of completed steps.
    #[must_use]
    pub fn len(&self) -> usize { self.steps.len() }

    /// Whether no step has completed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.steps.is_empty() }
}
