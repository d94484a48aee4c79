//! Error scenario integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn voiceguard(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("voiceguard").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("VOICEGUARD_SERVER_URL")
        .env_remove("VOICEGUARD_USER_ID")
        .env_remove("RUST_LOG");
    cmd
}

/// Address with nothing listening on it
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[test]
fn missing_user_fails_before_recording() {
    let home = TempDir::new().unwrap();
    voiceguard(&home)
        .args(["--server", &closed_port_url(), "auth"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Please enter User ID first"));
}

#[test]
fn offline_server_blocks_session() {
    let home = TempDir::new().unwrap();
    let url = closed_port_url();
    voiceguard(&home)
        .args(["--server", &url, "-u", "u1", "enroll"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(format!(
            "Cannot connect to backend server at {}",
            url
        )))
        .stderr(predicate::str::contains(
            "Backend server not connected. Please check connection.",
        ));
}

#[test]
fn health_against_closed_port_fails() {
    let home = TempDir::new().unwrap();
    voiceguard(&home)
        .args(["--server", &closed_port_url(), "health"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Disconnected"));
}

#[test]
fn user_from_environment_is_used() {
    let home = TempDir::new().unwrap();
    voiceguard(&home)
        .env("VOICEGUARD_USER_ID", "env-user")
        .args(["--server", &closed_port_url(), "auth"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Backend server not connected"));
}

#[test]
fn invalid_server_url_is_usage_error() {
    let home = TempDir::new().unwrap();
    voiceguard(&home)
        .args(["--server", "localhost:8000", "health"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid server URL"));
}

#[test]
fn config_get_unknown_key() {
    let home = TempDir::new().unwrap();
    voiceguard(&home)
        .args(["config", "get", "unknown_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_set_invalid_mode() {
    let home = TempDir::new().unwrap();
    voiceguard(&home)
        .args(["config", "set", "mode", "verify"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid mode"));
}

#[test]
fn config_set_invalid_visualizer() {
    let home = TempDir::new().unwrap();
    voiceguard(&home)
        .args(["config", "set", "visualizer", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("true"));
}

#[test]
fn config_command_ignores_session_flags() {
    let home = TempDir::new().unwrap();
    voiceguard(&home)
        .args(["--server", "localhost:8000", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}
