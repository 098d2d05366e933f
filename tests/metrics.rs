//! Tests for `stepwright` metrics helpers.
//!
//! Counters are read back through `metrics_util::debugging::DebuggingRecorder`.

use rstest::rstest;
use serde_json::json;
use stepwright::{
    EndpointConfig,
    LocalCallExecutor,
    LocalCallRegistry,
    ScenarioRunner,
    ScenarioSpec,
    Step,
    StepDispatcher,
    metrics::{self, Outcome},
};
use stepwright_testing::{counter_value, debugging_recorder};

#[rstest]
#[case(Outcome::Passed, "passed")]
#[case(Outcome::AssertionFailed, "assertion_failed")]
#[case(Outcome::Errored, "errored")]
fn step_counter_is_labelled_by_outcome(#[case] outcome: Outcome, #[case] label: &str) {
    let (snapshotter, recorder) = debugging_recorder();
    ::metrics::with_local_recorder(&recorder, || {
        metrics::inc_steps(outcome);
        metrics::inc_steps(outcome);
    });

    assert_eq!(
        counter_value(&snapshotter, metrics::STEPS_TOTAL, Some(("outcome", label))),
        2
    );
}

#[test]
fn record_counters_accumulate() {
    let (snapshotter, recorder) = debugging_recorder();
    ::metrics::with_local_recorder(&recorder, || {
        metrics::add_records_consumed(3);
        metrics::add_records_consumed(2);
        metrics::add_records_produced(4);
        metrics::inc_idle_polls();
    });

    assert_eq!(counter_value(&snapshotter, metrics::RECORDS_CONSUMED, None), 5);
    assert_eq!(counter_value(&snapshotter, metrics::RECORDS_PRODUCED, None), 4);
    assert_eq!(counter_value(&snapshotter, metrics::IDLE_POLLS, None), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn scenario_run_counts_steps() {
    let registry = LocalCallRegistry::new();
    registry
        .register("echo.Service", "echo", |request| async move { Ok(request) })
        .expect("register echo");
    let runner = ScenarioRunner::new(
        StepDispatcher::new(EndpointConfig::default()).with_local(LocalCallExecutor::new(registry)),
    );
    let scenario = ScenarioSpec::new(
        "counted",
        vec![
            Step::new("a", "echo.Service", "echo", json!({"v": 1}), json!({"v": 1})),
            Step::new("b", "echo.Service", "echo", json!({"v": 2}), json!({"v": 3})),
        ],
    );

    let (snapshotter, recorder) = debugging_recorder();
    let _guard = ::metrics::set_default_local_recorder(&recorder);
    let report = runner.run(&scenario).await;

    assert!(!report.passed());
    assert_eq!(counter_value(&snapshotter, metrics::STEPS_TOTAL, Some(("outcome", "passed"))), 1);
    assert_eq!(
        counter_value(&snapshotter, metrics::STEPS_TOTAL, Some(("outcome", "assertion_failed"))),
        1
    );
}
