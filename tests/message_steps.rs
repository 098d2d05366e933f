//! Scenarios that publish to and receive from broker topics.

mod common;

use std::sync::Arc;

use common::{TestResult, broker_runner};
use rstest::rstest;
use serde_json::json;
use serial_test::serial;
use stepwright::{ScenarioSpec, StepOutcome, config::ConsumerDefaults};
use stepwright_testing::{LoggerHandle, RecordingProducer, ScriptedFactory, logger, records};

fn scenario(steps: serde_json::Value) -> TestResult<ScenarioSpec> {
    Ok(ScenarioSpec::from_json(
        &json!({"scenarioName": "orders", "steps": steps}).to_string(),
    )?)
}

#[tokio::test]
async fn produce_then_receive() -> TestResult {
    let producer = Arc::new(RecordingProducer::new());
    let factory = Arc::new(ScriptedFactory::new(vec![
        Ok(records(0, 0..3)),
        Ok(records(1, 0..2)),
    ]));
    let runner = broker_runner(
        producer.clone(),
        factory.clone(),
        ConsumerDefaults::default().with_commit_sync(true),
    );
    let scenario = scenario(json!([
        {"name": "publish", "url": "topic://orders", "operation": "produce",
         "request": {"records": [{"key": "o-1", "value": {"total": 10}}]},
         "assertions": {"status": "Ok", "recordsCount": 1}},
        {"name": "drain", "url": "topic://orders", "operation": "receive",
         "request": {"consumerLocalConfigs": {"maxNoOfRetryPollsOrTimeouts": 5}},
         "assertions": {"size": 5,
                        "records": [{"offset": 0}, {"offset": 1}, {}, {"partition": "$EQ.1"}]}}
    ]))?;

    let report = runner.run(&scenario).await;

    assert!(report.passed(), "{:?}", report.first_failure());
    let sent = producer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "orders");
    assert_eq!(sent[0].1.key.as_deref(), Some("o-1"));

    let journal = factory.journal();
    assert_eq!(journal.non_empty_polls, [1, 2]);
    assert_eq!(journal.polls, 7);
    assert_eq!(journal.sync_commits, 7);
    assert_eq!(journal.closes, 1);
    Ok(())
}

#[rstest]
#[case(json!({"consumerLocalConfigs": {"commitSync": true, "commitAsync": true}}), false)]
#[case(json!({"consumerLocalConfigs": {"commitSync": true}}), true)]
#[tokio::test]
async fn conflicting_commit_modes_fail_the_step(
    #[case] request: serde_json::Value,
    #[case] default_async: bool,
) -> TestResult {
    let factory = Arc::new(ScriptedFactory::new(vec![Ok(records(0, 0..1))]));
    let runner = broker_runner(
        Arc::new(RecordingProducer::new()),
        factory.clone(),
        ConsumerDefaults::default().with_commit_async(default_async),
    );
    let scenario = scenario(json!([
        {"name": "drain", "url": "topic://orders", "operation": "consume", "request": request}
    ]))?;

    let report = runner.run(&scenario).await;

    let StepOutcome::Errored(message) = &report.steps[0].outcome else {
        panic!("expected a configuration error");
    };
    assert!(message.contains("both commitSync and commitAsync are enabled"), "{message}");
    assert_eq!(factory.journal().subscriptions, 0);
    assert_eq!(factory.journal().polls, 0);
    Ok(())
}

#[rstest]
#[serial]
#[tokio::test]
async fn receive_without_commit_mode_warns(mut logger: LoggerHandle) -> TestResult {
    let factory = Arc::new(ScriptedFactory::new(vec![Ok(records(0, 0..1))]));
    let runner = broker_runner(
        Arc::new(RecordingProducer::new()),
        factory.clone(),
        ConsumerDefaults::default().with_max_idle_polls(1),
    );
    let scenario = scenario(json!([
        {"name": "drain", "url": "topic://orders", "operation": "receive",
         "request": {"consumerLocalConfigs": {"showRecordsAsResponse": false}},
         "assertions": {"recordsCount": 1}}
    ]))?;

    let report = runner.run(&scenario).await;

    assert!(report.passed(), "{:?}", report.first_failure());
    let warnings = logger
        .messages()
        .into_iter()
        .filter(|m| m.contains("neither committed synchronously nor asynchronously"))
        .count();
    assert_eq!(warnings, factory.journal().polls);
    Ok(())
}
