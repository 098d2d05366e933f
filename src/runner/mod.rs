//! Scenario execution.
//!
//! [`ScenarioRunner`] walks a [`ScenarioSpec`]: for each scenario pass it
//! starts from an empty [`ScenarioExecutionState`], runs every step
//! iteration in order and stops at the first step that does not pass.
//!
//! A step iteration resolves its request and target against the steps
//! already recorded, picks its backend from the resolved target, dispatches,
//! resolves its assertions against the same state and compares the
//! response. Only then is the step recorded, so a step can never reference
//! itself or a later step.

mod outcome;

use std::time::Instant;

use log::{error, info, warn};
pub use outcome::{ScenarioReport, StepOutcome, StepReport};
use tracing::{Instrument, info_span};

use crate::{
    assertion::{AssertionReport, evaluate_text},
    backend::{BackendExecutor, HttpExecutor, LocalCallExecutor, MessageExecutor},
    config::EngineConfig,
    correlation::CorrelationId,
    dispatch::StepDispatcher,
    error::Result,
    metrics,
    resolver::{resolve_text, resolve_value},
    scenario::{ScenarioSpec, Step},
    state::{ScenarioExecutionState, StepExecutionState, parse_lenient},
};

/// Runs scenarios against a [`StepDispatcher`].
///
/// The runner holds no per-run state; one instance may run many scenarios,
/// concurrently if the host wishes.
#[derive(Clone, Default)]
pub struct ScenarioRunner<H = HttpExecutor, L = LocalCallExecutor, M = MessageExecutor> {
    dispatcher: StepDispatcher<H, L, M>,
}

impl ScenarioRunner {
    /// Runner with default executors for `config`.
    ///
    /// REST targets are qualified against `config.endpoint` and sent over
    /// HTTP. In-process targets go to an empty [`crate::LocalCallRegistry`]
    /// reachable through [`StepDispatcher::local`]. Receive steps use
    /// `config.consumer` as defaults, but no broker is attached.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        let message = MessageExecutor::new().with_defaults(config.consumer);
        Self::new(StepDispatcher::new(config.endpoint.clone()).with_message(message))
    }
}

impl<H, L, M> ScenarioRunner<H, L, M> {
    /// Run steps through `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: StepDispatcher<H, L, M>) -> Self { Self { dispatcher } }

    /// The dispatcher steps are sent through.
    #[must_use]
    pub fn dispatcher(&self) -> &StepDispatcher<H, L, M> { &self.dispatcher }
}

impl<H, L, M> ScenarioRunner<H, L, M>
where
    H: BackendExecutor,
    L: BackendExecutor,
    M: BackendExecutor,
{
    /// Run `scenario` and report every executed step iteration.
    ///
    /// Step failures never escape as errors; they end the run and appear as
    /// the last entry of [`ScenarioReport::steps`].
    pub async fn run(&self, scenario: &ScenarioSpec) -> ScenarioReport {
        let mut report = ScenarioReport::new(&scenario.name);
        info!("running scenario '{}'", scenario.name);

        'passes: for pass in 0..scenario.loops() {
            let mut state = ScenarioExecutionState::new();
            for step in &scenario.steps {
                for index in 0..step.loops() {
                    let step_report = self
                        .run_step(&scenario.name, pass, step, step.iteration_name(index), &mut state)
                        .await;
                    let passed = step_report.outcome.is_passed();
                    report.steps.push(step_report);
                    if !passed {
                        break 'passes;
                    }
                }
            }
        }

        if report.passed() {
            info!(
                "scenario '{}' passed ({} step(s))",
                scenario.name,
                report.steps.len()
            );
        } else {
            warn!("scenario '{}' failed", scenario.name);
        }
        report
    }

    async fn run_step(
        &self,
        scenario: &str,
        pass: u32,
        step: &Step,
        name: String,
        state: &mut ScenarioExecutionState,
    ) -> StepReport {
        let correlation_id = CorrelationId::new();
        let span = info_span!(
            "step",
            scenario,
            pass,
            step = %name,
            correlation_id = %correlation_id
        );
        let started = Instant::now();
        let mut report = StepReport::new(name, correlation_id);

        let result = self
            .execute(step, state, &mut report)
            .instrument(span.clone())
            .await;

        report.elapsed = started.elapsed();
        span.in_scope(|| {
            report.outcome = match result {
                Ok(mismatches) if mismatches.is_empty() => StepOutcome::Passed,
                Ok(mismatches) => {
                    warn!(
                        "step '{}' of scenario '{scenario}' did not match {} field(s)",
                        report.name,
                        mismatches.len()
                    );
                    StepOutcome::AssertionFailed(mismatches)
                }
                Err(err) => {
                    let message = format!("step '{}' of scenario '{scenario}' failed: {err}", report.name);
                    error!("{message}");
                    StepOutcome::Errored(message)
                }
            };
        });
        metrics::inc_steps(report.outcome.metric());
        report
    }

    async fn execute(
        &self,
        step: &Step,
        state: &mut ScenarioExecutionState,
        report: &mut StepReport,
    ) -> Result<Vec<AssertionReport>> {
        let request = resolve_value(&step.request, state)?;
        let target = resolve_text(&step.target, state)?;
        let kind = step.resolved_kind(&target);
        let target = self.dispatcher.target_for(kind, &target);
        report.target = Some(target.clone());
        report.request = Some(parse_lenient(&request));
        tracing::debug!(%target, operation = %step.operation, %request, "step request");

        let response = self
            .dispatcher
            .dispatch(kind, &target, &step.operation, &request)
            .await?;
        report.response = Some(parse_lenient(&response));
        tracing::debug!(%response, "step response");

        let expected = resolve_value(&step.assertions, state)?;
        let mismatches = evaluate_text(&expected, &response);

        let mut record = StepExecutionState::new(report.name.clone());
        record.set_request(&request);
        record.set_response(&response);
        state.record(record)?;
        Ok(mismatches)
    }
}

#[cfg(test)]
mod tests;
