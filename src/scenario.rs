//! Scenario and step definitions.
//!
//! Scenarios are deserialised from JSON and are immutable afterwards. Each
//! [`Step`] is tagged with a [`BackendKind`] at load time from the shape of
//! its target template. A target that holds placeholders is classified
//! again once they are resolved; see [`Step::resolved_kind`].

use std::{fs, path::Path};

use serde::Deserialize;
use serde_json::Value;

/// Scheme prefix marking a message-broker target.
pub const TOPIC_SCHEME: &str = "topic://";

/// Backend family a step is dispatched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// HTTP call against a URL or a path relative to the configured endpoint.
    Rest,
    /// Call into an operation registered in the in-process registry.
    LocalCall,
    /// Produce to or consume from a broker topic.
    Message,
}

impl BackendKind {
    /// Classify a target template.
    ///
    /// `topic://` targets are broker targets; any other target containing a
    /// `/` is an HTTP target; everything else names an in-process operation.
    ///
    /// ```
    /// use stepwright::scenario::BackendKind;
    ///
    /// assert_eq!(BackendKind::classify("/users/1"), BackendKind::Rest);
    /// assert_eq!(BackendKind::classify("topic://orders"), BackendKind::Message);
    /// assert_eq!(BackendKind::classify("billing.Invoices"), BackendKind::LocalCall);
    /// ```
    #[must_use]
    pub fn classify(target: &str) -> Self {
        if target.starts_with(TOPIC_SCHEME) {
            Self::Message
        } else if target.contains('/') {
            Self::Rest
        } else {
            Self::LocalCall
        }
    }
}

/// A named, ordered list of steps with an optional repeat count.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ScenarioSpec {
    /// Scenario name used in reports and logs.
    #[serde(rename = "scenarioName", alias = "name")]
    pub name: String,
    /// Steps executed in order.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Number of times the whole step list runs. Defaults to 1.
    #[serde(rename = "loop", default)]
    pub loop_count: Option<u32>,
}

impl ScenarioSpec {
    /// Create a scenario that runs once.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
            loop_count: None,
        }
    }

    /// Repeat the whole scenario `count` times.
    #[must_use]
    pub fn with_loop(mut self, count: u32) -> Self {
        self.loop_count = Some(count);
        self
    }

    /// Effective scenario repeat count.
    #[must_use]
    pub fn loops(&self) -> u32 { self.loop_count.unwrap_or(1) }

    /// Parse a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] when the text is not a
    /// valid scenario.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> { serde_json::from_str(raw) }

    /// Read and parse a scenario file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be read, or an
    /// [`std::io::ErrorKind::InvalidData`] error when it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// One request/response/assertion unit.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(from = "StepDef")]
pub struct Step {
    /// Step name; unique within one pass of the scenario.
    pub name: String,
    /// Target template: URL, path, qualified operation name or `topic://` target.
    pub target: String,
    /// HTTP verb, method name or broker operation.
    pub operation: String,
    /// Request payload template.
    pub request: Value,
    /// Expected response fragment template.
    pub assertions: Value,
    /// Number of times this step repeats. Defaults to 1.
    pub loop_count: Option<u32>,
    kind: BackendKind,
}

impl Step {
    /// Build a step, classifying its target.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        operation: impl Into<String>,
        request: Value,
        assertions: Value,
    ) -> Self {
        let target = target.into();
        Self {
            name: name.into(),
            kind: BackendKind::classify(&target),
            target,
            operation: operation.into(),
            request,
            assertions,
            loop_count: None,
        }
    }

    /// Repeat this step `count` times.
    #[must_use]
    pub fn with_loop(mut self, count: u32) -> Self {
        self.loop_count = Some(count);
        self
    }

    /// Backend chosen from the target template at load time.
    #[must_use]
    pub fn kind(&self) -> BackendKind { self.kind }

    /// Backend for this step once its target resolved to `resolved`.
    ///
    /// Literal targets keep their load-time tag; templated ones are
    /// classified from the resolved text.
    ///
    /// ```
    /// use serde_json::json;
    /// use stepwright::scenario::{BackendKind, Step};
    ///
    /// let step = Step::new("follow", "${$.link.response.href}", "GET", json!(null), json!({}));
    /// assert_eq!(step.kind(), BackendKind::LocalCall);
    /// assert_eq!(step.resolved_kind("/users/42"), BackendKind::Rest);
    /// ```
    #[must_use]
    pub fn resolved_kind(&self, resolved: &str) -> BackendKind {
        if resolved == self.target {
            self.kind
        } else {
            BackendKind::classify(resolved)
        }
    }

    /// Effective repeat count.
    #[must_use]
    pub fn loops(&self) -> u32 { self.loop_count.unwrap_or(1) }

    /// Name recorded for loop iteration `index`: the bare name first, then
    /// the name suffixed with the index.
    ///
    /// ```
    /// use serde_json::json;
    /// use stepwright::scenario::Step;
    ///
    /// let step = Step::new("poll", "svc.Poller", "next", json!(null), json!({}));
    /// assert_eq!(step.iteration_name(0), "poll");
    /// assert_eq!(step.iteration_name(2), "poll2");
    /// ```
    #[must_use]
    pub fn iteration_name(&self, index: u32) -> String {
        if index == 0 {
            self.name.clone()
        } else {
            format!("{}{index}", self.name)
        }
    }
}

#[derive(Deserialize)]
struct StepDef {
    name: String,
    #[serde(alias = "target")]
    url: String,
    #[serde(alias = "method")]
    operation: String,
    #[serde(default)]
    request: Value,
    #[serde(alias = "verify", default = "empty_object")]
    assertions: Value,
    #[serde(rename = "loop", default)]
    loop_count: Option<u32>,
}

fn empty_object() -> Value { Value::Object(serde_json::Map::new()) }

impl From<StepDef> for Step {
    fn from(def: StepDef) -> Self {
        let mut step = Step::new(def.name, def.url, def.operation, def.request, def.assertions);
        step.loop_count = def.loop_count;
        step
    }
}
