//! Hook endpoint tests: trigger responses, skip semantics, and the
//! structured configuration error.

use chrono::FixedOffset;
use std::path::PathBuf;
use taskbrief::server::{AppState, ErrorResponse, HookServer, RunResponse};
use taskbrief::state::{SendRecord, write_record};
use taskbrief::{Config, DigestRunner, Period, RunLock};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(notion_base: &str, webhook: &str, state_path: PathBuf) -> Config {
    Config {
        notion_api_key: "secret_test".to_owned(),
        notion_database_id: "db-1".to_owned(),
        slack_webhook_url: webhook.to_owned(),
        notion_base_url: notion_base.trim_end_matches('/').to_owned(),
        evening_hour: 15,
        utc_offset_hours: 9,
        timeout_seconds: 5,
        state_path,
    }
}

async fn start_ready_server(notion: &MockServer, slack: &MockServer, state_path: PathBuf) -> HookServer {
    let config = test_config(
        &notion.uri(),
        &format!("{}/webhook", slack.uri()),
        state_path,
    );
    let runner = DigestRunner::new(config).expect("runner");
    let state = AppState::ready(runner, RunLock::new());
    HookServer::start("127.0.0.1:0", state)
        .await
        .expect("server starts")
}

#[tokio::test]
async fn healthz_responds_ok() {
    let state = AppState::misconfigured(vec!["NOTION_API_KEY".to_owned()]);
    let server = HookServer::start("127.0.0.1:0", state)
        .await
        .expect("server starts");

    let body = reqwest::get(format!("http://{}/healthz", server.addr()))
        .await
        .expect("request")
        .text()
        .await
        .expect("body");
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn run_reports_every_missing_variable() {
    let state = AppState::misconfigured(vec![
        "NOTION_API_KEY".to_owned(),
        "NOTION_DATABASE_ID".to_owned(),
        "SLACK_WEBHOOK_URL".to_owned(),
    ]);
    let server = HookServer::start("127.0.0.1:0", state)
        .await
        .expect("server starts");

    let response = reqwest::Client::new()
        .post(format!("http://{}/run", server.addr()))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status().as_u16(), 500);

    let body: ErrorResponse = response.json().await.expect("json body");
    assert_eq!(body.error, "missing required configuration");
    assert_eq!(
        body.missing,
        vec![
            "NOTION_API_KEY".to_owned(),
            "NOTION_DATABASE_ID".to_owned(),
            "SLACK_WEBHOOK_URL".to_owned(),
        ]
    );
}

#[tokio::test]
async fn run_sends_then_skips_within_the_same_period() {
    let notion = MockServer::start().await;
    let slack = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .and(path("/v1/databases/db-1/query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })),
        )
        .expect(2)
        .mount(&notion)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&slack)
        .await;

    let server = start_ready_server(&notion, &slack, dir.path().join("sent.json")).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/run", server.addr());

    let first: RunResponse = client
        .post(&url)
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(first.status, "sent");
    assert!(first.period.is_some());

    let second: RunResponse = client
        .post(&url)
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(second.status, "skipped");
    assert_eq!(second.period, first.period);
}

#[tokio::test]
async fn run_failure_returns_message_without_backtrace() {
    let notion = MockServer::start().await;
    let slack = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .and(path("/v1/databases/db-1/query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })),
        )
        .mount(&notion)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
        .mount(&slack)
        .await;

    let server = start_ready_server(&notion, &slack, dir.path().join("sent.json")).await;
    let response = reqwest::Client::new()
        .post(format!("http://{}/run", server.addr()))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status().as_u16(), 500);

    let body: ErrorResponse = response.json().await.expect("json body");
    assert!(body.error.starts_with("notify error:"));
    assert!(body.missing.is_empty());
    assert!(!body.error.contains("backtrace"));
}

#[tokio::test]
async fn run_skips_when_marker_predates_server_start() {
    let notion = MockServer::start().await;
    let slack = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let state_path = dir.path().join("sent.json");

    // Mark the current period as already sent before the server starts.
    let offset = FixedOffset::east_opt(9 * 3600).expect("offset");
    let now = chrono::Utc::now().with_timezone(&offset);
    let period = if chrono::Timelike::hour(&now) < 15 {
        Period::Morning
    } else {
        Period::Evening
    };
    write_record(
        &state_path,
        &SendRecord {
            date: now.date_naive(),
            period,
        },
    );
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&notion)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&slack)
        .await;

    let server = start_ready_server(&notion, &slack, state_path).await;
    let body: RunResponse = reqwest::Client::new()
        .post(format!("http://{}/run", server.addr()))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body.status, "skipped");
}
