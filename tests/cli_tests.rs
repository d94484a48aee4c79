//! CLI integration tests

use std::process::Command;

use tempfile::TempDir;

fn voiceguard_bin(config_home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_voiceguard"));
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("VOICEGUARD_SERVER_URL")
        .env_remove("VOICEGUARD_USER_ID")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    let output = voiceguard_bin(&home)
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--server"));
    assert!(stdout.contains("--user"));
    assert!(stdout.contains("auth"));
    assert!(stdout.contains("enroll"));
    assert!(stdout.contains("health"));
    assert!(stdout.contains("interactive"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    let output = voiceguard_bin(&home)
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("voiceguard"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_path_command() {
    let home = TempDir::new().unwrap();
    let output = voiceguard_bin(&home)
        .args(["config", "path"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("voiceguard"));
    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_set_then_get() {
    let home = TempDir::new().unwrap();
    let set = voiceguard_bin(&home)
        .args(["config", "set", "user_id", "alice"])
        .output()
        .expect("Failed to execute command");
    assert!(set.status.success());

    let get = voiceguard_bin(&home)
        .args(["config", "get", "user_id"])
        .output()
        .expect("Failed to execute command");
    assert!(get.status.success());
    assert_eq!(String::from_utf8_lossy(&get.stdout).trim(), "alice");
}

#[test]
fn config_list_shows_all_keys() {
    let home = TempDir::new().unwrap();
    let output = voiceguard_bin(&home)
        .args(["config", "list"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for key in [
        "server_url",
        "user_id",
        "mode",
        "health_timeout_secs",
        "request_timeout_secs",
        "visualizer",
    ] {
        assert!(stdout.contains(key), "missing {} in {}", key, stdout);
    }
}

#[test]
fn config_init_twice_fails() {
    let home = TempDir::new().unwrap();
    let first = voiceguard_bin(&home)
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(first.status.success());

    let second = voiceguard_bin(&home)
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(!second.status.success());
    assert!(String::from_utf8_lossy(&second.stderr).contains("already exists"));
}
