#![allow(clippy::unwrap_used, clippy::expect_used)]

//! GitHub platform against a mock REST server.

use serde_json::json;
use workmate_agents::{Agent, PlatformAgent};
use workmate_core::{Task, TaskStatus};
use workmate_platforms::{GitHubConfig, GitHubPlatform};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, token: Option<&str>) -> GitHubConfig {
    GitHubConfig {
        token: token.map(String::from),
        api_base_url: server.uri(),
        default_repository: "acme/web".to_string(),
        ..GitHubConfig::default()
    }
}

#[tokio::test]
async fn creates_issue_through_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/web/issues"))
        .and(header("Authorization", "token ghp_test"))
        .and(body_json(json!({"title": "Crash on login", "body": "Steps attached"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "number": 42,
            "html_url": "https://github.com/acme/web/issues/42"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let platform = GitHubPlatform::new(&config(&server, Some("ghp_test"))).unwrap();
    let mut task = Task::new("bug", "github_create_issue")
        .with_param("title", json!("Crash on login"))
        .with_param("description", json!("Steps attached"));

    let response = platform.execute(&mut task).await;

    assert!(response.is_success());
    assert_eq!(response.message(), "Successfully created GitHub issue #42");
    assert_eq!(response.data().unwrap()["issue_id"], json!(42));
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.result.unwrap()["url"], json!("https://github.com/acme/web/issues/42"));
}

#[tokio::test]
async fn api_rejection_is_a_hard_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/web/issues"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let platform = GitHubPlatform::new(&config(&server, Some("ghp_test"))).unwrap();
    let mut task = Task::new("bug", "github_create_issue");

    let response = platform.execute(&mut task).await;

    assert!(response.is_hard_failure());
    assert!(response.message().starts_with("Failed to create GitHub issue"));
    assert!(response.message().contains("Not Found"));
    assert_eq!(task.status, TaskStatus::Failed);
    assert!(task.error_message.is_some());
}

#[tokio::test]
async fn probes_hit_root_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("Authorization", "token ghp_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "octo"})))
        .mount(&server)
        .await;

    let platform = GitHubPlatform::new(&config(&server, Some("ghp_test"))).unwrap();
    assert!(platform.test_connection().await.unwrap());
    assert!(platform.authenticate().await.unwrap());
}

#[tokio::test]
async fn unreachable_api_is_an_error_not_a_panic() {
    // Reserve a free port, then close it so nothing is listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let cfg = GitHubConfig {
        api_base_url: format!("http://127.0.0.1:{port}"),
        timeout_secs: 2,
        ..GitHubConfig::default()
    };
    let platform = GitHubPlatform::new(&cfg).unwrap();
    assert!(platform.test_connection().await.is_err());
}
