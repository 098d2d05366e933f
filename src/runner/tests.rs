//! Tests for scenario execution.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::{ScenarioRunner, StepOutcome};
use crate::{
    backend::{BackendError, BackendExecutor, LocalCallExecutor, LocalCallRegistry, MessageExecutor},
    config::{EndpointConfig, EngineConfig},
    dispatch::StepDispatcher,
    scenario::{ScenarioSpec, Step},
};

type Call = (String, String, String);

#[derive(Clone, Default)]
struct FakeHttp {
    responses: HashMap<String, String>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeHttp {
    fn respond(mut self, url: &str, body: Value) -> Self {
        self.responses.insert(url.to_owned(), body.to_string());
        self
    }

    fn calls(&self) -> Vec<Call> { self.calls.lock().expect("calls lock").clone() }
}

#[async_trait]
impl BackendExecutor for FakeHttp {
    async fn execute(&self, target: &str, operation: &str, request: &str) -> Result<String, BackendError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((target.to_owned(), operation.to_owned(), request.to_owned()));
        Ok(self.responses.get(target).cloned().unwrap_or_else(|| "null".into()))
    }
}

#[fixture]
fn registry() -> LocalCallRegistry {
    let registry = LocalCallRegistry::new();
    registry
        .register("echo.Service", "echo", |request| async move { Ok(request) })
        .expect("register echo");
    registry
}

fn runner(
    http: FakeHttp,
    registry: LocalCallRegistry,
) -> ScenarioRunner<FakeHttp, LocalCallExecutor, MessageExecutor> {
    let dispatcher = StepDispatcher::new(EndpointConfig::new("http://svc", 8080, "/api"))
        .with_http(http)
        .with_local(LocalCallExecutor::new(registry));
    ScenarioRunner::new(dispatcher)
}

fn echo(name: &str, request: Value, assertions: Value) -> Step {
    Step::new(name, "echo.Service", "echo", request, assertions)
}

#[rstest]
#[tokio::test]
async fn zero_steps_pass(registry: LocalCallRegistry) {
    let report = runner(FakeHttp::default(), registry)
        .run(&ScenarioSpec::new("empty", vec![]))
        .await;
    assert!(report.passed());
    assert!(report.steps.is_empty());
    assert_eq!(report.scenario_name, "empty");
}

#[rstest]
#[tokio::test]
async fn looped_steps_get_indexed_names(registry: LocalCallRegistry) {
    let scenario = ScenarioSpec::new(
        "loop",
        vec![
            echo("a", json!({"n": 1}), json!({"n": 1})).with_loop(3),
            echo("b", json!({"last": "${$.a2.response.n}"}), json!({"last": 1})),
        ],
    );

    let report = runner(FakeHttp::default(), registry).run(&scenario).await;

    let names: Vec<_> = report.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["a", "a1", "a2", "b"]);
    assert!(report.passed(), "{:?}", report.first_failure());
}

#[rstest]
#[tokio::test]
async fn forward_reference_is_a_step_error(registry: LocalCallRegistry) {
    let http = FakeHttp::default();
    let scenario = ScenarioSpec::new(
        "forward",
        vec![
            Step::new("first", "/users/${$.second.response.id}", "GET", json!(null), json!({})),
            Step::new("second", "/users", "GET", json!(null), json!({})),
        ],
    );

    let report = runner(http.clone(), registry).run(&scenario).await;

    assert_eq!(report.steps.len(), 1);
    let StepOutcome::Errored(message) = &report.steps[0].outcome else {
        panic!("expected an errored step, got {:?}", report.steps[0].outcome);
    };
    assert!(message.starts_with("step 'first' of scenario 'forward' failed: "));
    assert!(message.contains("'second' which has not run yet"));
    assert!(http.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn self_reference_in_assertions_fails(registry: LocalCallRegistry) {
    let scenario = ScenarioSpec::new(
        "self",
        vec![echo("me", json!({"id": 1}), json!({"id": "${$.me.response.id}"}))],
    );

    let report = runner(FakeHttp::default(), registry).run(&scenario).await;

    assert!(matches!(report.steps[0].outcome, StepOutcome::Errored(_)));
    assert!(report.steps[0].response.is_some(), "the call itself ran");
}

fn id_scenario() -> ScenarioSpec {
    ScenarioSpec::new(
        "users",
        vec![
            Step::new("create", "/users", "POST", json!({"name": "Ada"}), json!({"id": "$NOT.NULL"})),
            Step::new(
                "fetch",
                "/users/${$.create.response.id}",
                "GET",
                json!(null),
                json!({"id": "${$.create.response.id}", "name": "Ada"}),
            ),
        ],
    )
}

#[rstest]
#[tokio::test]
async fn response_values_flow_into_later_steps(registry: LocalCallRegistry) {
    let http = FakeHttp::default()
        .respond("http://svc:8080/api/users", json!({"id": 42}))
        .respond("http://svc:8080/api/users/42", json!({"id": 42, "name": "Ada"}));

    let report = runner(http.clone(), registry).run(&id_scenario()).await;

    assert!(report.passed(), "{:?}", report.first_failure());
    let calls = http.calls();
    assert_eq!(calls[0].0, "http://svc:8080/api/users");
    assert_eq!(calls[0].2, r#"{"name":"Ada"}"#);
    assert_eq!(calls[1], ("http://svc:8080/api/users/42".into(), "GET".into(), "null".into()));
    assert_eq!(report.steps[1].target.as_deref(), Some("http://svc:8080/api/users/42"));
}

#[rstest]
#[tokio::test]
async fn mismatch_reports_literal_values(registry: LocalCallRegistry) {
    let http = FakeHttp::default()
        .respond("http://svc:8080/api/users", json!({"id": 42}))
        .respond("http://svc:8080/api/users/42", json!({"id": 7, "name": "Ada"}));

    let report = runner(http, registry).run(&id_scenario()).await;

    let StepOutcome::AssertionFailed(mismatches) = &report.steps[1].outcome else {
        panic!("expected an assertion failure");
    };
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].path, "id");
    assert_eq!(mismatches[0].expected, json!(42));
    assert_eq!(mismatches[0].actual, Some(json!(7)));
}

#[rstest]
#[tokio::test]
async fn first_failure_stops_the_scenario(registry: LocalCallRegistry) {
    let scenario = ScenarioSpec::new(
        "fail-fast",
        vec![
            echo("one", json!({"ok": false}), json!({"ok": true})),
            echo("two", json!({}), json!({})),
        ],
    )
    .with_loop(3);

    let report = runner(FakeHttp::default(), registry).run(&scenario).await;

    assert_eq!(report.steps.len(), 1);
    assert!(!report.passed());
}

#[rstest]
#[tokio::test]
async fn targets_without_slash_never_reach_http(registry: LocalCallRegistry) {
    let http = FakeHttp::default();
    let scenario = ScenarioSpec::new(
        "local",
        vec![
            echo("a", json!({"x": 1}), json!({"x": 1})),
            Step::new("b", "missing.Service", "call", json!(null), json!({})),
        ],
    );

    let report = runner(http.clone(), registry).run(&scenario).await;

    assert!(report.steps[0].outcome.is_passed());
    let StepOutcome::Errored(message) = &report.steps[1].outcome else {
        panic!("unregistered operation must error");
    };
    assert!(message.contains("no operation 'call' registered for 'missing.Service'"));
    assert!(http.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn each_scenario_pass_starts_with_fresh_state(registry: LocalCallRegistry) {
    let scenario = ScenarioSpec::new(
        "passes",
        vec![
            echo("a", json!({"v": 1}), json!({})),
            echo("b", json!("${$.a.response.v}"), json!(1)),
        ],
    )
    .with_loop(2);

    let report = runner(FakeHttp::default(), registry).run(&scenario).await;

    assert!(report.passed(), "{:?}", report.first_failure());
    assert_eq!(report.steps.len(), 4);
}

#[rstest]
#[tokio::test]
async fn colliding_names_are_reported(registry: LocalCallRegistry) {
    let scenario = ScenarioSpec::new(
        "dupes",
        vec![
            echo("a", json!(1), json!({})).with_loop(2),
            echo("a1", json!(2), json!({})),
        ],
    );

    let report = runner(FakeHttp::default(), registry).run(&scenario).await;

    assert_eq!(report.steps.len(), 3);
    let StepOutcome::Errored(message) = &report.steps[2].outcome else {
        panic!("duplicate name must error");
    };
    assert!(message.contains("'a1' was already recorded"));
}

#[rstest]
#[tokio::test]
async fn templated_targets_are_routed_by_their_resolved_text(registry: LocalCallRegistry) {
    registry
        .register("links.Directory", "lookup", |_| async move { Ok(json!({"href": "/users/42"})) })
        .expect("register lookup");
    let http = FakeHttp::default().respond("http://svc:8080/api/users/42", json!({"id": 42}));
    let scenario = ScenarioSpec::new(
        "follow",
        vec![
            Step::new("link", "links.Directory", "lookup", json!(null), json!({})),
            Step::new("follow", "${$.link.response.href}", "GET", json!(null), json!({"id": 42})),
            echo("local", json!({"via": "${$.follow.response.id}"}), json!({"via": 42})),
        ],
    );

    let report = runner(http.clone(), registry).run(&scenario).await;

    assert!(report.passed(), "{:?}", report.first_failure());
    assert_eq!(
        http.calls(),
        [("http://svc:8080/api/users/42".to_owned(), "GET".to_owned(), "null".to_owned())]
    );
    assert_eq!(report.steps[1].target.as_deref(), Some("http://svc:8080/api/users/42"));
}

#[rstest]
#[tokio::test]
async fn templated_targets_can_resolve_to_local_operations(registry: LocalCallRegistry) {
    let http = FakeHttp::default().respond("http://svc:8080/api/routes", json!({"service": "echo.Service"}));
    let scenario = ScenarioSpec::new(
        "route",
        vec![
            Step::new("routes", "/routes", "GET", json!(null), json!({})),
            Step::new("call", "${$.routes.response.service}", "echo", json!({"n": 1}), json!({"n": 1})),
        ],
    );

    let report = runner(http.clone(), registry).run(&scenario).await;

    assert!(report.passed(), "{:?}", report.first_failure());
    assert_eq!(http.calls().len(), 1);
    assert_eq!(report.steps[1].target.as_deref(), Some("echo.Service"));
}

#[tokio::test]
async fn configured_runner_routes_to_http_and_local_backends() {
    let runner = ScenarioRunner::from_config(&EngineConfig::default());
    let scenario = |target: &str, operation: &str| {
        ScenarioSpec::new("cli", vec![Step::new("call", target, operation, json!({"id": 1}), json!({}))])
    };

    let report = runner.run(&scenario("crm.Customers", "find")).await;
    let StepOutcome::Errored(message) = &report.steps[0].outcome else {
        panic!("empty registry must error, got {:?}", report.steps[0].outcome);
    };
    assert!(message.contains("no operation 'find' registered for 'crm.Customers'"), "{message}");

    runner
        .dispatcher()
        .local()
        .registry()
        .register("crm.Customers", "find", |request| async move { Ok(request) })
        .expect("register find");
    let report = runner.run(&scenario("crm.Customers", "find")).await;
    assert!(report.passed(), "{:?}", report.first_failure());

    let report = runner.run(&scenario("topic://orders", "produce")).await;
    let StepOutcome::Errored(message) = &report.steps[0].outcome else {
        panic!("no broker is attached");
    };
    assert!(message.contains("message producer is not configured"), "{message}");
}
