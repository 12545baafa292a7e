//! Error scenario integration tests
//!
//! Every case here fails before any request is made, so the endpoint
//! points at a closed local port.

use std::process::Command;

use tempfile::TempDir;

const UNREACHABLE: &str = "http://127.0.0.1:9";

fn podcast_gen_bin(config_home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_podcast-gen"));
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("SPEECH_REGION")
        .env_remove("SPEECH_SUBSCRIPTION_KEY")
        .env_remove("SPEECH_API_VERSION");
    cmd
}

fn with_credentials(config_home: &TempDir) -> Command {
    let mut cmd = podcast_gen_bin(config_home);
    cmd.env("SPEECH_REGION", UNREACHABLE)
        .env("SPEECH_SUBSCRIPTION_KEY", "test-key");
    cmd
}

#[test]
fn missing_region_error() {
    let home = TempDir::new().unwrap();
    let output = podcast_gen_bin(&home)
        .args(["get", "--id", "abc"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("region") && stderr.contains("SPEECH_REGION"),
        "Expected error about missing region, got: {}",
        stderr
    );
}

#[test]
fn missing_subscription_key_error() {
    let home = TempDir::new().unwrap();
    let output = podcast_gen_bin(&home)
        .args(["--region", "eastus", "list"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("subscription_key"), "got: {}", stderr);
}

#[test]
fn missing_content_source_error() {
    let home = TempDir::new().unwrap();
    let output = with_credentials(&home)
        .args(["create_generation_and_wait_until_terminated", "--locale", "en-US"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("content source"), "got: {}", stderr);
}

#[test]
fn oversized_text_file_error() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("big.txt");
    std::fs::File::create(&path)
        .unwrap()
        .set_len(1024 * 1024 + 1)
        .unwrap();

    let output = with_credentials(&home)
        .args(["create_generation_and_wait_until_terminated", "--locale", "en-US"])
        .arg("--text-file")
        .arg(&path)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("upload_temp_file"), "got: {}", stderr);
}

#[test]
fn unsupported_file_format_error() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("notes.docx");
    std::fs::write(&path, "hello").unwrap();

    let output = with_credentials(&home)
        .args(["create_generation_and_wait_until_terminated", "--locale", "en-US"])
        .arg("--text-file")
        .arg(&path)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(".docx"), "got: {}", stderr);
}

#[test]
fn invalid_locale_error() {
    let home = TempDir::new().unwrap();
    let output = with_credentials(&home)
        .args([
            "create_generation_and_wait_until_terminated",
            "--locale",
            "english please",
            "--content-url",
            "https://example.com/doc.pdf",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn upload_missing_file_error() {
    let home = TempDir::new().unwrap();
    let output = with_credentials(&home)
        .args(["upload_temp_file", "--file"])
        .arg(home.path().join("missing.pdf"))
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.pdf"), "got: {}", stderr);
}

#[test]
fn upload_expiry_out_of_range_error() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("doc.pdf");
    std::fs::write(&path, "%PDF-1.4").unwrap();

    let output = with_credentials(&home)
        .args(["upload_temp_file", "--expires-after-mins", "5000", "--file"])
        .arg(&path)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_poll_interval_error() {
    let home = TempDir::new().unwrap();
    let output = with_credentials(&home)
        .args([
            "create_generation_and_wait_until_terminated",
            "--locale",
            "en-US",
            "--content-url",
            "https://example.com/doc.pdf",
            "--poll-interval",
            "often",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("poll_interval"), "got: {}", stderr);
}

#[test]
fn serve_with_invalid_job_retention_error() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("podcast-gen");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "job_retention = \"24hrs\"\n").unwrap();

    let output = with_credentials(&home)
        .args(["serve", "--port", "9"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("job_retention"), "got: {}", stderr);
}

#[test]
fn unreachable_service_is_runtime_error() {
    let home = TempDir::new().unwrap();
    let output = with_credentials(&home)
        .args(["get", "--id", "abc"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn config_get_unknown_key() {
    let home = TempDir::new().unwrap();
    let output = podcast_gen_bin(&home)
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_duration() {
    let home = TempDir::new().unwrap();
    let output = podcast_gen_bin(&home)
        .args(["config", "set", "poll_interval", "invalid"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid duration"), "got: {}", stderr);
}

#[test]
fn config_init_twice_fails() {
    let home = TempDir::new().unwrap();
    let first = podcast_gen_bin(&home)
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(first.status.success());

    let second = podcast_gen_bin(&home)
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(!second.status.success());
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(stderr.contains("already exists"), "got: {}", stderr);
}
