use assert_cmd::prelude::*;
use serde_json::Value;
use std::path::Path;
use std::process::Command;

fn capture() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("capture"))
}

#[test]
fn validate_summarises_rules() {
    let config = Path::new("tests/fixtures/capture.yaml");
    assert!(config.exists(), "fixture missing");

    let assert = capture()
        .args(["validate", "--config", config.to_str().unwrap(), "--output", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");

    let patterns = value["patterns"].as_array().unwrap();
    assert_eq!(patterns.len(), 2);
    assert_eq!(patterns[0]["pattern"].as_str(), Some("/api/.*"));
    assert_eq!(patterns[1]["request"]["ignore_payload"].as_bool(), Some(true));
    assert_eq!(patterns[1]["response"]["ignore_payload"].as_bool(), Some(true));
    assert_eq!(value["track_options_requests"].as_bool(), Some(false));
}

#[test]
fn validate_rejects_bad_patterns() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.yaml");
    std::fs::write(&config, "url_configs:\n  \"/api/(\":\n    request: {}\n").unwrap();

    capture()
        .args(["validate", "--config", config.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn validate_rejects_missing_file() {
    capture()
        .args(["validate", "--config", "tests/fixtures/does-not-exist.yaml"])
        .assert()
        .failure();
}

#[test]
fn inspect_prints_sanitized_exchange() {
    let assert = capture()
        .env_remove("PAYLOAD_CAPTURE__ENABLED")
        .args([
            "inspect",
            "--config",
            "tests/fixtures/capture.yaml",
            "--exchange",
            "tests/fixtures/order_exchange.json",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");

    let attributes = &value["attributes"];
    assert_eq!(attributes["id"].as_str(), Some("o-42"));
    assert_eq!(attributes["sku"].as_str(), Some("A,B"));
    assert_eq!(attributes["status"].as_str(), Some("accepted"));
    assert_eq!(attributes["capture.derived.user.id"].as_str(), Some("c-7"));
    assert_eq!(attributes["capture.derived.session_id"].as_str(), Some("sess-1"));
    assert_eq!(
        attributes["capture.derived.url.path.self"].as_str(),
        Some("https://shop.example.com/api/orders")
    );

    let request = &value["request_payload"];
    assert_eq!(request["spanId"].as_str(), Some("53995c3f42cd8ad8"));
    assert!(request["httpPayload"]["headerMap"]["authorization"].is_null());
    let body = request["httpPayload"]["jsonBody"].as_str().unwrap();
    assert!(!body.contains("hunter2"));
    assert!(!body.contains("4111111111111111"));

    let response = &value["response_payload"];
    assert_eq!(response["httpPayload"]["responseCode"].as_u64(), Some(201));
    assert!(response["httpPayload"]["headerMap"]["set-cookie"].is_null());
}

#[test]
fn inspect_respects_disabled_env_switch() {
    let assert = capture()
        .env("PAYLOAD_CAPTURE__ENABLED", "false")
        .args([
            "inspect",
            "--config",
            "tests/fixtures/capture.yaml",
            "--exchange",
            "tests/fixtures/order_exchange.json",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["attributes"], serde_json::json!({}));
    assert!(value.get("request_payload").is_none());
}
