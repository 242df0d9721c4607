//! Integration tests for the `bravia` CLI binary.
//!
//! Argument parsing, help output, completions, and error handling run
//! without a display; the end-to-end cases talk to a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const NO_HOME: &str = "/tmp/bravia-cli-test-nonexistent";

/// Build a [`Command`] for the `bravia` binary with env isolation.
///
/// Clears all `BRAVIA_*` env vars and points config directories at `home`
/// so tests never touch the user's real configuration.
fn bravia_cmd_in(home: &str) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("bravia");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env_remove("BRAVIA_PROFILE")
        .env_remove("BRAVIA_HOST")
        .env_remove("BRAVIA_PSK")
        .env_remove("BRAVIA_PIN_TOKEN")
        .env_remove("BRAVIA_OUTPUT")
        .env_remove("BRAVIA_INSECURE")
        .env_remove("BRAVIA_TIMEOUT")
        .env_remove("BRAVIA_DEFAULT_PROFILE")
        .env_remove("RUST_LOG");
    cmd
}

fn bravia_cmd() -> assert_cmd::Command {
    bravia_cmd_in(NO_HOME)
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a blocking command from inside an async test.
async fn run_blocking(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = bravia_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    bravia_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Bravia")
            .and(predicate::str::contains("call"))
            .and(predicate::str::contains("ircc"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    bravia_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bravia"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    bravia_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    bravia_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = bravia_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_call_without_display() {
    bravia_cmd()
        .args(["call", "system", "getPowerStatus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No display configured"));
}

#[test]
fn test_unknown_profile() {
    bravia_cmd()
        .args(["--profile", "bedroom", "call", "system", "getPowerStatus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bedroom"));
}

#[test]
fn test_invalid_output_format() {
    let output = bravia_cmd()
        .args(["--output", "table", "call", "system", "getPowerStatus"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_config_show_no_config() {
    bravia_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_subcommands_exist() {
    bravia_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("path")),
        );
}

#[test]
fn test_config_init_then_show_redacts() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path().to_str().unwrap().to_owned();

    bravia_cmd_in(&home)
        .args(["config", "init", "--host", "192.168.1.20", "--psk", "0000"])
        .assert()
        .success();

    bravia_cmd_in(&home)
        .args(["-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("192.168.1.20")
                .and(predicate::str::contains("********"))
                .and(predicate::str::contains("\"0000\"").not()),
        );
}

#[test]
fn test_config_default_output_applies_without_flag() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("bravia");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        r#"
default_profile = "living-room"

[defaults]
output = "plain"

[profiles.living-room]
host = "192.168.1.20"
"#,
    )
    .unwrap();
    let home = home.path().to_str().unwrap().to_owned();

    let output = bravia_cmd_in(&home).args(["config", "show"]).output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "living-room");

    bravia_cmd_in(&home)
        .args(["-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_profile\": \"living-room\""));
}

// ── End to end ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_call_reports_turned_off() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sony/system"))
        .and(header("x-auth-psk", "0000"))
        .and(body_string_contains("getPowerStatus"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "error": [40005, "Display Is Turned off"], "id": 1 })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut json_cmd = bravia_cmd();
    json_cmd.args([
        "--host",
        &server.uri(),
        "--psk",
        "0000",
        "-o",
        "json-compact",
        "call",
        "system",
        "getPowerStatus",
    ]);
    let output = run_blocking(json_cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"turnedOff\":true"), "got: {stdout}");

    let mut plain_cmd = bravia_cmd();
    plain_cmd.args([
        "--host",
        &server.uri(),
        "--psk",
        "0000",
        "-o",
        "plain",
        "call",
        "system",
        "getPowerStatus",
    ]);
    let output = run_blocking(plain_cmd).await;
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "turned off");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ircc_sends_soap_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sony/ircc"))
        .and(header("cookie", "auth=tok"))
        .and(body_string_contains("<IRCCCode>AAAAAQAAAAEAAAAVAw==</IRCCCode>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = bravia_cmd();
    cmd.args([
        "--host",
        &server.uri(),
        "--pin-token",
        "tok",
        "-o",
        "plain",
        "ircc",
        "AAAAAQAAAAEAAAAVAw==",
    ]);
    let output = run_blocking(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("sent AAAAAQAAAAEAAAAVAw=="));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_vendor_error_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sony/system"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": [12, "getFoo"], "id": 1 })),
        )
        .mount(&server)
        .await;

    let mut cmd = bravia_cmd();
    cmd.args(["--host", &server.uri(), "call", "system", "getFoo"]);
    let output = run_blocking(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("[12]: getFoo"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pin_token_env_without_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sony/system"))
        .and(header("cookie", "auth=from-env"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": [{ "status": "active" }], "id": 1 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = bravia_cmd();
    cmd.env("BRAVIA_PIN_TOKEN", "from-env").args([
        "--host",
        &server.uri(),
        "-o",
        "plain",
        "call",
        "system",
        "getPowerStatus",
    ]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "{\"status\":\"active\"}"
    );
}
