//! End-to-end scenario runs over real HTTP and in-process backends.

mod common;

use common::{TestResult, http_runner};
use rstest::rstest;
use serde_json::{Value, json};
use stepwright::{LocalCallRegistry, ScenarioSpec, StepOutcome};
use stepwright_testing::CannedHttpServer;

const USERS_SCENARIO: &str = r#"{
    "scenarioName": "create then fetch a user",
    "steps": [
        {
            "name": "create_user",
            "url": "/users",
            "operation": "POST",
            "request": {
                "headers": {"X-Request-Source": "stepwright"},
                "body": {"name": "Ada"}
            },
            "assertions": {"id": "$NOT.NULL"}
        },
        {
            "name": "get_user",
            "url": "/users/${$.create_user.response.id}",
            "operation": "GET",
            "request": {"queryParams": {"verbose": true}},
            "assertions": {
                "id": "${$.create_user.response.id}",
                "name": "${$.create_user.request.body.name}",
                "roles.SIZE": 2
            }
        }
    ]
}"#;

async fn users_server(fetched: Value) -> std::io::Result<CannedHttpServer> {
    CannedHttpServer::start([
        ("POST", "/users", 201, json!({"id": 42}).to_string()),
        ("GET", "/users/42", 200, fetched.to_string()),
    ])
    .await
}

#[tokio::test]
async fn values_flow_between_http_steps() -> TestResult {
    let server = users_server(json!({"id": 42, "name": "Ada", "roles": ["a", "b"]})).await?;
    let scenario = ScenarioSpec::from_json(USERS_SCENARIO)?;

    let report = http_runner(server.port(), LocalCallRegistry::new())
        .run(&scenario)
        .await;

    assert!(report.passed(), "{:?}", report.first_failure());
    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].header("x-request-source"), Some("stepwright"));
    assert_eq!(serde_json::from_str::<Value>(&requests[0].body)?, json!({"name": "Ada"}));
    assert_eq!(requests[1].path, "/users/42");
    assert_eq!(requests[1].query, "verbose=true");
    assert_eq!(
        report.steps[1].target.as_deref(),
        Some(server.url("/users/42").as_str())
    );
    Ok(())
}

#[tokio::test]
async fn mismatching_response_reports_each_field() -> TestResult {
    let server = users_server(json!({"id": 7, "name": "Ada", "roles": ["a"]})).await?;
    let scenario = ScenarioSpec::from_json(USERS_SCENARIO)?;

    let report = http_runner(server.port(), LocalCallRegistry::new())
        .run(&scenario)
        .await;

    let StepOutcome::AssertionFailed(mismatches) = &report.steps[1].outcome else {
        panic!("expected a mismatch, got {:?}", report.steps[1].outcome);
    };
    let rendered: Vec<String> = mismatches.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        ["id: expected 42, actual 7", "roles.SIZE: expected 2, actual 1"]
    );
    Ok(())
}

#[rstest]
#[case("/missing", "GET")]
#[case("/users", "DELETE")]
#[tokio::test]
async fn non_json_error_pages_are_step_errors(#[case] url: &str, #[case] method: &str) -> TestResult {
    let server = CannedHttpServer::start([("DELETE", "/users", 500, "<h1>boom</h1>".to_owned())]).await?;
    let scenario = ScenarioSpec::from_json(
        &json!({
            "scenarioName": "errors",
            "steps": [{"name": "call", "url": url, "operation": method, "assertions": {"error": "$NOT.NULL"}}]
        })
        .to_string(),
    )?;

    let report = http_runner(server.port(), LocalCallRegistry::new())
        .run(&scenario)
        .await;

    match &report.steps[0].outcome {
        // the canned 404 body is JSON and carries an "error" field
        StepOutcome::Passed => assert_eq!(url, "/missing"),
        StepOutcome::Errored(message) => {
            assert_eq!(url, "/users");
            assert!(message.contains("malformed response (status 500)"), "{message}");
        }
        StepOutcome::AssertionFailed(reports) => panic!("unexpected mismatch: {reports:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn local_and_http_steps_share_state() -> TestResult {
    let server = CannedHttpServer::start([(
        "GET",
        "/accounts/acc-9",
        200,
        json!({"balance": 120.0}).to_string(),
    )])
    .await?;
    let registry = LocalCallRegistry::new();
    registry.register("bank.Accounts", "open", |request| async move {
        Ok(json!({"accountId": "acc-9", "owner": request["owner"]}))
    })?;
    let scenario = ScenarioSpec::from_json(
        r#"{
            "scenarioName": "mixed",
            "steps": [
                {"name": "open", "url": "bank.Accounts", "operation": "open",
                 "request": {"owner": "Ada"}, "assertions": {"owner": "Ada"}},
                {"name": "balance", "url": "/accounts/${$.open.response.accountId}",
                 "operation": "GET", "assertions": {"balance": "$GT.100"}}
            ]
        }"#,
    )?;

    let report = http_runner(server.port(), registry).run(&scenario).await;

    assert!(report.passed(), "{:?}", report.first_failure());
    assert_eq!(server.requests().len(), 1, "the local step never reached HTTP");
    Ok(())
}
