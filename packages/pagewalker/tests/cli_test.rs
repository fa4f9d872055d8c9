//! Tests for the pagewalker binary.

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pagewalker() -> Command {
    Command::cargo_bin("pagewalker").expect("binary is built")
}

#[test]
fn test_help_lists_commands() {
    pagewalker()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("find"));
}

#[test]
fn test_relative_url_is_rejected() {
    pagewalker()
        .args(["get", "/login"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Location must be absolute"));
}

#[tokio::test]
async fn test_get_prints_yaml_report() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<title>New</title><a href="/next">Next</a>"#,
        ))
        .mount(&mock_server)
        .await;

    let url = format!("{}/old", mock_server.uri());
    let output = tokio::task::spawn_blocking(move || {
        pagewalker()
            .args(["get", &url, "--list", "links", "--format", "yaml"])
            .output()
            .expect("run pagewalker")
    })
    .await
    .expect("blocking task");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("status: 301"), "{stdout}");
    assert!(stdout.contains("title: New"), "{stdout}");
    assert!(stdout.contains("/next"), "{stdout}");
}

#[tokio::test]
async fn test_find_reports_missing_member() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<input name="q">"#))
        .mount(&mock_server)
        .await;

    let url = mock_server.uri();
    let output = tokio::task::spawn_blocking(move || {
        pagewalker()
            .args(["find", &url, "nothing"])
            .output()
            .expect("run pagewalker")
    })
    .await
    .expect("blocking task");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No element with id, name or text 'nothing'"));
}
