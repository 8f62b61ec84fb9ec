//! End-to-end CLI tests for the einthusan-dl binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::fixtures::{mount_indirect_page, mount_media, unrecognized_page};
use support::socket_guard::start_mock_server_or_skip;

macro_rules! require_mock_server {
    () => {{
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        mock_server
    }};
}

const PAGE: &str = "https://einthusan.tv/movie/watch/9aEx/?lang=tamil";

/// Binary command isolated from any user config file and `RUST_LOG`.
fn binary(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("einthusan-dl").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    binary(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--wget"))
        .stdout(predicate::str::contains("--skip-download"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    binary(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("einthusan-dl"));
}

#[test]
fn test_binary_without_urls_is_usage_error() {
    let home = TempDir::new().unwrap();
    binary(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("URL"));
}

#[test]
fn test_binary_conflicting_backends_abort_before_any_request() {
    let home = TempDir::new().unwrap();
    binary(&home)
        .args(["--wget=/usr/bin/wget", "--curl=/usr/bin/curl", PAGE])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("conflicting transfer backends"))
        .stdout(predicate::str::contains("completed").not());
}

#[test]
fn test_binary_missing_backend_executable_aborts() {
    let home = TempDir::new().unwrap();
    binary(&home)
        .args(["--wget=/definitely/not/here/wget", PAGE])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_binary_invalid_config_file_aborts() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("einthusan-dl");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "jobs = 99\n").unwrap();

    binary(&home)
        .arg(PAGE)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config"));
}

#[tokio::test]
async fn test_binary_unrecognized_page_fails_with_summary() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/browse/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(unrecognized_page()))
        .mount(&mock_server)
        .await;

    let home = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    binary(&home)
        .arg("--path")
        .arg(dest.path())
        .arg(format!("{}/browse/", mock_server.uri()))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("unrecognized_page"))
        .stdout(predicate::str::contains("0 completed, 0 skipped, 1 failed"));
}

#[tokio::test]
async fn test_binary_skip_download_succeeds_without_files() {
    let mock_server = require_mock_server!();
    mount_indirect_page(
        &mock_server,
        "/movie/watch/dry/",
        "77",
        "Dry",
        "http://cdn.example/dry.mp4",
    )
    .await;

    let home = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    binary(&home)
        .arg("--skip-download")
        .arg("--path")
        .arg(dest.path())
        .arg(format!("{}/movie/watch/dry/", mock_server.uri()))
        .assert()
        .success()
        .stdout(predicate::str::contains("0 completed, 1 skipped, 0 failed"));

    assert!(!dest.path().join("Dry").join("Dry.mp4").exists());
}

#[tokio::test]
async fn test_binary_partial_batch_exits_one_and_logs_to_file() {
    let mock_server = require_mock_server!();
    let base = mock_server.uri();
    mount_indirect_page(
        &mock_server,
        "/movie/watch/ok/",
        "1",
        "Ok Movie",
        &format!("{base}/media/ok.mp4"),
    )
    .await;
    mount_media(&mock_server, "/media/ok.mp4", b"movie").await;
    Mock::given(method("GET"))
        .and(path("/movie/watch/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let home = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let log = dest.path().join("run.log");
    binary(&home)
        .arg("--path")
        .arg(dest.path())
        .arg("--log")
        .arg(&log)
        .arg(format!("{base}/movie/watch/ok/"))
        .arg(format!("{base}/movie/watch/gone/"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1 completed, 0 skipped, 1 failed"));

    let stored = dest.path().join("Ok Movie").join("Ok Movie.mp4");
    assert_eq!(std::fs::read(stored).unwrap(), b"movie");
    let log_text = std::fs::read_to_string(&log).unwrap();
    assert!(log_text.contains("item failed"), "log was: {log_text}");
}
