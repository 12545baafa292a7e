//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with an isolated config directory and no service settings from the environment
fn podcast_gen_bin(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("podcast-gen").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("SPEECH_REGION")
        .env_remove("SPEECH_SUBSCRIPTION_KEY")
        .env_remove("SPEECH_API_VERSION")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    let output = podcast_gen_bin(&home)
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in [
        "create_generation_and_wait_until_terminated",
        "get",
        "list",
        "delete",
        "upload_temp_file",
        "list_temp_files",
        "get_temp_file",
        "delete_temp_file",
        "serve",
        "config",
    ] {
        assert!(stdout.contains(command), "missing {} in help", command);
    }
    assert!(stdout.contains("--region"));
    assert!(stdout.contains("--sub-key"));
    assert!(stdout.contains("--api-version"));
}

#[test]
fn create_help_lists_content_options() {
    let home = TempDir::new().unwrap();
    let output = podcast_gen_bin(&home)
        .args(["create_generation_and_wait_until_terminated", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--locale"));
    assert!(stdout.contains("--content-url"));
    assert!(stdout.contains("--temp-file-id"));
    assert!(stdout.contains("--text-file"));
    assert!(stdout.contains("--base64-file"));
    assert!(stdout.contains("--download"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    let output = podcast_gen_bin(&home)
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("podcast-gen"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_path_command() {
    let home = TempDir::new().unwrap();
    let output = podcast_gen_bin(&home)
        .args(["config", "path"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("podcast-gen"));
    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_set_then_get_masks_key() {
    let home = TempDir::new().unwrap();

    let output = podcast_gen_bin(&home)
        .args(["config", "set", "subscription_key", "abcdefghijklmnop"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let output = podcast_gen_bin(&home)
        .args(["config", "get", "subscription_key"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "abcd...mnop");
}

#[test]
fn config_list_shows_all_keys() {
    let home = TempDir::new().unwrap();
    let output = podcast_gen_bin(&home)
        .args(["config", "list"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("region"));
    assert!(stdout.contains("server.port"));
    assert!(stdout.contains("(not set)"));
}

#[test]
fn config_help() {
    let home = TempDir::new().unwrap();
    podcast_gen_bin(&home)
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("set"))
                .and(predicate::str::contains("get"))
                .and(predicate::str::contains("list"))
                .and(predicate::str::contains("path")),
        );
}

#[test]
fn invalid_host_error() {
    let home = TempDir::new().unwrap();
    let output = podcast_gen_bin(&home)
        .args([
            "create_generation_and_wait_until_terminated",
            "--locale",
            "en-US",
            "--host",
            "ThreeHosts",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("OneHost, TwoHosts"),
        "Expected error listing valid hosts, got: {}",
        stderr
    );
}

#[test]
fn missing_locale_error() {
    let home = TempDir::new().unwrap();
    podcast_gen_bin(&home)
        .args([
            "create_generation_and_wait_until_terminated",
            "--content-url",
            "https://example.com/doc.pdf",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--locale"));
}
