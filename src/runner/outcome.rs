//! Values returned by a scenario run.

use std::{fmt, time::Duration};

use serde_json::Value;

use crate::{assertion::AssertionReport, correlation::CorrelationId, metrics::Outcome};

/// Result of one step iteration.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// The response satisfied every assertion.
    Passed,
    /// The step ran but the response did not match.
    AssertionFailed(Vec<AssertionReport>),
    /// The step could not run to completion.
    Errored(String),
}

impl StepOutcome {
    /// Whether this outcome lets the scenario continue.
    #[must_use]
    pub fn is_passed(&self) -> bool { matches!(self, Self::Passed) }

    pub(crate) fn metric(&self) -> Outcome {
        match self {
            Self::Passed => Outcome::Passed,
            Self::AssertionFailed(_) => Outcome::AssertionFailed,
            Self::Errored(_) => Outcome::Errored,
        }
    }
}

/// Report for one step iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Resolved step name, including any loop suffix.
    pub name: String,
    /// Pass, mismatch or error.
    pub outcome: StepOutcome,
    /// Identifier shared with the step's log lines.
    pub correlation_id: CorrelationId,
    /// Final target, when resolution got that far.
    pub target: Option<String>,
    /// Resolved request, when resolution got that far.
    pub request: Option<Value>,
    /// Backend response, when the call returned.
    pub response: Option<Value>,
    /// Wall-clock time spent on the step.
    pub elapsed: Duration,
}

impl StepReport {
    pub(crate) fn new(name: String, correlation_id: CorrelationId) -> Self {
        Self {
            name,
            outcome: StepOutcome::Passed,
            correlation_id,
            target: None,
            request: None,
            response: None,
            elapsed: Duration::ZERO,
        }
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StepOutcome::Passed => write!(f, "PASS {} ({} ms)", self.name, self.elapsed.as_millis()),
            StepOutcome::AssertionFailed(reports) => {
                write!(f, "FAIL {}", self.name)?;
                for report in reports {
                    write!(f, "\n    {report}")?;
                }
                Ok(())
            }
            StepOutcome::Errored(message) => write!(f, "ERROR {message}"),
        }
    }
}

/// Report for a whole scenario, in execution order.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioReport {
    /// Scenario name.
    pub scenario_name: String,
    /// One report per executed step iteration.
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    /// Start an empty report.
    #[must_use]
    pub fn new(scenario_name: impl Into<String>) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            steps: Vec::new(),
        }
    }

    /// `true` when every executed step passed. An empty scenario passes.
    #[must_use]
    pub fn passed(&self) -> bool { self.steps.iter().all(|s| s.outcome.is_passed()) }

    /// First step that did not pass.
    #[must_use]
    pub fn first_failure(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| !s.outcome.is_passed())
    }
}
