//! Integration tests for the `yalehub` binary.
//!
//! Argument handling and config errors run without a network. The
//! validate and lock flows run against a wiremock server via the hidden
//! `YALEHUB_API_BASE` override.
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command with env isolation so tests never touch real config.
fn yalehub_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("yalehub");
    cmd.env("HOME", "/tmp/yalehub-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/yalehub-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/yalehub-cli-test-nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("YALEHUB_CONFIG")
        .env_remove("YALEHUB_API_BASE");
    cmd
}

fn write_config(dir: &TempDir, block: Value) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    let document = json!({
        "bridge": { "name": "Home" },
        "platforms": [block]
    });
    fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
    path
}

fn validated_block() -> Value {
    json!({
        "platform": "YaleHubConnect",
        "credentials": {
            "email": "me@example.com",
            "password": "pw",
            "isValidated": true,
            "accessToken": "tok-old"
        },
        "options": { "logging": "none" },
        "homeId": 5,
        "entryCode": "1234",
        "accountId": 77
    })
}

fn read_block(path: &Path) -> Value {
    let document: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    document["platforms"][0].clone()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/services/HomeCloudServiceAdmin.svc/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "LoginResult": {
                "AccessToken": { "Token": "tok-123" },
                "LoginType": 1,
                "ResponseStatus": { "Messages": [], "Status": 0 }
            }
        })))
        .mount(server)
        .await;
}

async fn mount_locks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/apinet/Account/GetAdminAccessControlUserForStore"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "EntryCode": "1234",
            "HomeIDs": [5],
            "DoorLocks": [{ "endpointID": 2, "accessControlSlotID": 20 }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/apinet/App/GetUpdatedObjects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "endpoints": [{
                "endpointID": 2,
                "deviceID": 1002,
                "description": "Front",
                "statusName": "Open",
                "doorlockTypeName": "Conexis L1",
                "lowBattery": false,
                "isOnline": true,
                "enabled": true
            }]
        })))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = yalehub_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = String::from_utf8_lossy(&output.stderr);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    yalehub_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("run")
            .and(predicate::str::contains("validate"))
            .and(predicate::str::contains("locks"))
            .and(predicate::str::contains("unlock")),
    );
}

#[test]
fn test_version_flag() {
    yalehub_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("yalehub"));
}

#[test]
fn test_lock_requires_endpoint() {
    yalehub_cmd().arg("lock").assert().failure().code(2);
}

// ── Config errors ───────────────────────────────────────────────────

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    yalehub_cmd()
        .args(["-c", dir.path().join("absent.json").to_str().unwrap(), "locks"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_missing_platform_block() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, json!({ "platform": "Other" }));
    yalehub_cmd()
        .args(["-c", path.to_str().unwrap(), "locks"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("YaleHubConnect"));
}

#[test]
fn test_missing_password_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        json!({ "platform": "YaleHubConnect", "credentials": { "email": "me@example.com" } }),
    );
    yalehub_cmd()
        .args(["-c", path.to_str().unwrap(), "locks"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing Yale Password"));
}

#[test]
fn test_locks_requires_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        json!({
            "platform": "YaleHubConnect",
            "credentials": { "email": "me@example.com", "password": "pw" }
        }),
    );
    yalehub_cmd()
        .args(["-c", path.to_str().unwrap(), "locks"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("yalehub validate"));
}

// ── Against a mock cloud ────────────────────────────────────────────

#[tokio::test]
async fn test_validate_persists_results() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/services/HomeCloudService.svc/GetAccountIDFromEmail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "GetAccountIDFromEmailResult": {
                "AccountID": 77,
                "ResponseStatus": { "Messages": [], "Status": 0 }
            }
        })))
        .mount(&server)
        .await;
    mount_locks(&server).await;

    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        json!({
            "platform": "YaleHubConnect",
            "credentials": { "email": "me@example.com", "password": "pw" },
            "options": { "logging": "none" }
        }),
    );

    yalehub_cmd()
        .env("YALEHUB_API_BASE", server.uri())
        .args(["-c", path.to_str().unwrap(), "validate"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Account 77 validated"));

    let block = read_block(&path);
    assert_eq!(block["homeId"], json!(5));
    assert_eq!(block["accountId"], json!(77));
    assert_eq!(block["entryCode"], json!("1234"));
    assert_eq!(block["credentials"]["isValidated"], json!(true));
    assert_eq!(block["credentials"]["accessToken"], json!("tok-123"));
}

#[tokio::test]
async fn test_locks_json_output() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_locks(&server).await;

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, validated_block());

    let output = yalehub_cmd()
        .env("YALEHUB_API_BASE", server.uri())
        .args(["-c", path.to_str().unwrap(), "-o", "json", "locks"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let locks: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(locks[0]["endpointID"], json!(2));
    assert_eq!(locks[0]["statusName"], json!("Open"));
}

#[tokio::test]
async fn test_lock_sends_command() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_locks(&server).await;
    Mock::given(method("POST"))
        .and(path("/services/HomeCloudCommandService.svc/DoorlockLockUnlock"))
        .and(body_partial_json(json!({
            "endpointID": 2,
            "isLocked": true,
            "entryCode": "1234"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DoorlockLockUnlockResult": {
                "ResponseStatus": { "Messages": [], "Status": 0 },
                "Result": true
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, validated_block());

    yalehub_cmd()
        .env("YALEHUB_API_BASE", server.uri())
        .args(["-c", path.to_str().unwrap(), "lock", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Front Locked"));
}

#[tokio::test]
async fn test_unknown_endpoint_is_not_found() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_locks(&server).await;

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, validated_block());

    yalehub_cmd()
        .env("YALEHUB_API_BASE", server.uri())
        .args(["-c", path.to_str().unwrap(), "unlock", "99"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("yalehub locks"));
}

#[tokio::test]
async fn test_run_stays_up_after_failed_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/HomeCloudServiceAdmin.svc/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "LoginResult": {
                "LoginType": 0,
                "ResponseStatus": { "Messages": ["Invalid credentials"], "Status": 1 }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        json!({
            "platform": "YaleHubConnect",
            "credentials": { "email": "me@example.com", "password": "wrong" },
            "options": { "logging": "none" }
        }),
    );

    let mut child = Command::new(env!("CARGO_BIN_EXE_yalehub"))
        .env("HOME", dir.path())
        .env_remove("RUST_LOG")
        .env_remove("YALEHUB_CONFIG")
        .env("YALEHUB_API_BASE", server.uri())
        .args(["-c", path.to_str().unwrap(), "run", "--cache"])
        .arg(dir.path().join("accessories.json"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut attempts = 0;
    while server.received_requests().await.unwrap().is_empty() && attempts < 100 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        attempts += 1;
    }
    tokio::time::sleep(Duration::from_millis(500)).await;

    let status = child.try_wait().unwrap();
    if status.is_none() {
        child.kill().unwrap();
        child.wait().unwrap();
    }

    assert!(status.is_none(), "run exited after a failed start: {status:?}");
    let block = read_block(&path);
    assert!(block["credentials"].get("isValidated").is_none());
}
