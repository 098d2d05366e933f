//! Metric helpers for `stepwright`.
//!
//! This module defines metric names and simple helper functions wrapping
//! the [`metrics`](https://docs.rs/metrics) crate. Without the `metrics`
//! feature the helpers compile to no-ops.

/// Name of the counter tracking executed steps, labelled by `outcome`.
pub const STEPS_TOTAL: &str = "stepwright_steps_total";
/// Name of the counter tracking records fetched by receive steps.
pub const RECORDS_CONSUMED: &str = "stepwright_records_consumed_total";
/// Name of the counter tracking records published by produce steps.
pub const RECORDS_PRODUCED: &str = "stepwright_records_produced_total";
/// Name of the counter tracking polls that returned no records.
pub const IDLE_POLLS: &str = "stepwright_idle_polls_total";

/// Outcome label for step metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Response satisfied the assertions.
    Passed,
    /// Response did not satisfy the assertions.
    AssertionFailed,
    /// The step raised an error.
    Errored,
}

impl Outcome {
    /// Label value used for this outcome.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::AssertionFailed => "assertion_failed",
            Outcome::Errored => "errored",
        }
    }
}

/// Record a finished step.
#[cfg(feature = "metrics")]
pub fn inc_steps(outcome: Outcome) {
    metrics::counter!(STEPS_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

/// Record a finished step.
#[cfg(not(feature = "metrics"))]
pub fn inc_steps(_outcome: Outcome) {}

/// Record an empty poll.
#[cfg(feature = "metrics")]
pub fn inc_idle_polls() { metrics::counter!(IDLE_POLLS).increment(1); }

/// Record an empty poll.
#[cfg(not(feature = "metrics"))]
pub fn inc_idle_polls() {}

/// Record fetched records.
#[cfg(feature = "metrics")]
pub fn add_records_consumed(count: usize) {
    metrics::counter!(RECORDS_CONSUMED).increment(count as u64);
}

/// Record fetched records.
#[cfg(not(feature = "metrics"))]
pub fn add_records_consumed(_count: usize) {}

/// Record published records.
#[cfg(feature = "metrics")]
pub fn add_records_produced(count: usize) {
    metrics::counter!(RECORDS_PRODUCED).increment(count as u64);
}

/// Record published records.
#[cfg(not(feature = "metrics"))]
pub fn add_records_produced(_count: usize) {}
