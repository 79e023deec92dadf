//! End-to-end binary tests: fake identity service, fake ntfy sink, real
//! definition files on disk.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POLICIES_PATH: &str = "/identity/conditionalAccess/policies";

fn write_definition(dir: &Path, file: &str, name: &str) {
    let body = json!({
        "displayName": name,
        "conditions": { "users": { "includeUsers": ["All"] } },
        "grantControls": { "operator": "OR", "builtInControls": ["mfa"] },
        "state": "enabled",
    });
    std::fs::write(dir.join(file), body.to_string()).unwrap();
}

fn capsync(dir: &Path, graph: &MockServer, ntfy_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("capsync").unwrap();
    cmd.arg("--dir")
        .arg(dir)
        .env("CAPSYNC_CLIENT_ID", "app-id")
        .env("CAPSYNC_CLIENT_SECRET", "app-secret")
        .env("CAPSYNC_TENANT_ID", "tenant-id")
        .env("CAPSYNC_NTFY_URL", ntfy_url)
        .env("CAPSYNC_WORKFLOW", "sync-policies")
        .env("CAPSYNC_RUN_ID", "4242")
        .env("CAPSYNC_AUTHORITY_URL", graph.uri())
        .env("CAPSYNC_GRAPH_URL", graph.uri());
    cmd
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/tenant-id/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok_abc",
            "token_type": "Bearer",
            "expires_in": 3599
        })))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, policies: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(POLICIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": policies })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn full_run_reconciles_and_notifies_success() {
    let graph = MockServer::start().await;
    let ntfy = MockServer::start().await;

    mount_token(&graph).await;
    // Remote: "GH - A" (kept), "GH - B" (stale). Local: "GH - A", "GH - C".
    mount_listing(
        &graph,
        json!([
            { "id": "1", "displayName": "GH - A" },
            { "id": "2", "displayName": "GH - B" }
        ]),
    )
    .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{POLICIES_PATH}/2")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&graph)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{POLICIES_PATH}/1")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&graph)
        .await;

    Mock::given(method("POST"))
        .and(path(POLICIES_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "3",
            "displayName": "GH - C"
        })))
        .expect(1)
        .mount(&graph)
        .await;

    Mock::given(method("POST"))
        .and(path("/policy-sync"))
        .and(header("Title", "Conditional Access Policy Sync Successful"))
        .and(header("Priority", "default"))
        .and(header("Tags", "white_check_mark"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ntfy)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_definition(dir.path(), "a.json", "GH - A");
    write_definition(dir.path(), "c.json", "GH - C");

    let ntfy_url = format!("{}/policy-sync", ntfy.uri());
    capsync(dir.path(), &graph, &ntfy_url).assert().success();

    let requests = ntfy.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("Workflow: sync-policies"), "{body}");
    assert!(body.contains("Run: 4242"), "{body}");
    assert!(body.contains("Created: 1"), "{body}");
    assert!(body.contains("Updated: 1"), "{body}");
    assert!(body.contains("Removed: 1"), "{body}");
    assert!(body.contains("Failed: 0"), "{body}");
    assert!(body.contains("- REMOVED GH - B"), "{body}");
    assert!(body.contains("- UPDATED GH - A"), "{body}");
    assert!(body.contains("- CREATED GH - C"), "{body}");
}

#[tokio::test(flavor = "multi_thread")]
async fn authentication_failure_aborts_with_nonzero_exit() {
    let graph = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant-id/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        })))
        .mount(&graph)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_definition(dir.path(), "a.json", "GH - A");

    capsync(dir.path(), &graph, "http://127.0.0.1:9/unused")
        .assert()
        .failure()
        .stderr(predicate::str::contains("authentication failed"));

    // Nothing beyond the token exchange was attempted.
    let requests = graph.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn per_item_failure_reports_errors_but_exits_zero() {
    let graph = MockServer::start().await;
    let ntfy = MockServer::start().await;

    mount_token(&graph).await;
    mount_listing(
        &graph,
        json!([ { "id": "2", "displayName": "GH - Stale" } ]),
    )
    .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{POLICIES_PATH}/2")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": "InternalError", "message": "backend unavailable" }
        })))
        .expect(1)
        .mount(&graph)
        .await;

    Mock::given(method("POST"))
        .and(header("Title", "Conditional Access Policy Sync Completed with Errors"))
        .and(header("Priority", "high"))
        .and(header("Tags", "warning"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ntfy)
        .await;

    let dir = tempfile::tempdir().unwrap();

    capsync(dir.path(), &graph, &ntfy.uri()).assert().success();

    let requests = ntfy.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("Failed: 1"), "{body}");
    assert!(
        body.contains("- FAILED TO REMOVE GH - Stale: graph api returned 500"),
        "{body}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn notification_failure_does_not_change_exit_status() {
    let graph = MockServer::start().await;
    let ntfy = MockServer::start().await;

    mount_token(&graph).await;
    mount_listing(&graph, json!([])).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&ntfy)
        .await;

    let dir = tempfile::tempdir().unwrap();

    capsync(dir.path(), &graph, &ntfy.uri()).assert().success();
}

#[tokio::test(flavor = "multi_thread")]
async fn unparseable_definition_is_reported_not_fatal() {
    let graph = MockServer::start().await;
    let ntfy = MockServer::start().await;

    mount_token(&graph).await;
    mount_listing(&graph, json!([])).await;

    Mock::given(method("POST"))
        .and(header("Priority", "high"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ntfy)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

    capsync(dir.path(), &graph, &ntfy.uri()).assert().success();

    let requests = ntfy.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("Failed: 1"), "{body}");
    assert!(body.contains("- FAILED TO LOAD broken.json:"), "{body}");
}

#[tokio::test(flavor = "multi_thread")]
async fn dry_run_issues_no_writes_and_no_notification() {
    let graph = MockServer::start().await;
    let ntfy = MockServer::start().await;

    mount_token(&graph).await;
    mount_listing(
        &graph,
        json!([ { "id": "2", "displayName": "GH - Stale" } ]),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    write_definition(dir.path(), "a.json", "GH - New");

    let mut cmd = capsync(dir.path(), &graph, &ntfy.uri());
    cmd.arg("--dry-run").assert().success();

    // Only the token exchange and the listing may happen.
    let graph_requests = graph.received_requests().await.unwrap();
    assert_eq!(graph_requests.len(), 2);
    assert!(
        graph_requests
            .iter()
            .any(|r| r.url.path().ends_with("/token"))
    );
    assert!(
        graph_requests
            .iter()
            .any(|r| r.method.as_str() == "GET" && r.url.path() == POLICIES_PATH)
    );

    let ntfy_requests = ntfy.received_requests().await.unwrap();
    assert!(ntfy_requests.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_environment_fails_fast_naming_the_variable() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("capsync").unwrap();
    cmd.env_clear()
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("CAPSYNC_CLIENT_ID"));
}
