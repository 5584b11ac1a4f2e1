//! Integration tests for the `versentry` binary.
//!
//! Runs the compiled binary against temporary configuration files and checks
//! the exit status and summary output.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn versentry(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_versentry"))
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("should run versentry binary")
}

fn write_config(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, body).expect("should write config");
    path.display().to_string()
}

fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

#[test]
fn test_sweep_completes_with_exit_zero() {
    // Given: a folder with one non-PE .dll and a config pointing at it
    let temp_dir = TempDir::new().expect("should create temp dir");
    let scan_dir = temp_dir.path().join("bin");
    fs::create_dir(&scan_dir).expect("should create scan dir");
    fs::write(scan_dir.join("plain.dll"), "not a PE image").expect("should write file");

    let config = write_config(
        temp_dir.path(),
        "versentry.toml",
        &format!(
            r#"
[general]
log_level = "warn"
log_dir = ""

[database]
database = "{db}"

[[folders]]
path = "{dir}"
"#,
            db = toml_path(&temp_dir.path().join("inv.db")),
            dir = toml_path(&scan_dir),
        ),
    );

    // When: running a sweep
    let output = versentry(&[&config], temp_dir.path());

    // Then: the run completes and the file is skipped, not fatal
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[1]"), "stdout: {stdout}");
    assert!(stdout.contains("1 skipped"), "stdout: {stdout}");
    assert!(temp_dir.path().join("inv.db").exists());
}

#[test]
fn test_default_config_in_working_directory() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_config(
        temp_dir.path(),
        "versentry.toml",
        r#"
[general]
log_dir = ""

[database]
database = "inv.db"

[[folders]]
path = "missing-folder"
"#,
    );

    let output = versentry(&[], temp_dir.path());

    // Unavailable folders are reported, not fatal
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unavailable"), "stdout: {stdout}");
}

#[test]
fn test_missing_config_aborts() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let output = versentry(&["does-not-exist.toml"], temp_dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configuration error"), "stderr: {stderr}");
}

#[test]
fn test_missing_database_group_aborts() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = write_config(
        temp_dir.path(),
        "versentry.toml",
        r#"
[[folders]]
path = "."
"#,
    );

    let output = versentry(&[&config], temp_dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("database"), "stderr: {stderr}");
}

#[test]
fn test_unopenable_store_aborts() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = write_config(
        temp_dir.path(),
        "versentry.toml",
        &format!(
            r#"
[general]
log_dir = ""

[database]
database = "{db}"

[[folders]]
path = "."
"#,
            db = toml_path(&temp_dir.path().join("no-such-dir").join("inv.db")),
        ),
    );

    let output = versentry(&[&config], temp_dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("inventory store error"), "stderr: {stderr}");
}

#[test]
fn test_log_file_written_to_log_dir() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let log_dir = temp_dir.path().join("logs");
    let config = write_config(
        temp_dir.path(),
        "versentry.toml",
        &format!(
            r#"
[general]
log_level = "info"
log_format = "compact"
log_dir = "{logs}"

[database]
database = "inv.db"

[[folders]]
path = "."
"#,
            logs = toml_path(&log_dir),
        ),
    );

    let output = versentry(&[&config], temp_dir.path());
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let logs: Vec<_> = fs::read_dir(&log_dir)
        .expect("log dir should exist")
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(logs.len(), 1);

    let name = logs[0].file_name().to_string_lossy().into_owned();
    assert!(name.starts_with("versentry-") && name.ends_with(".log"));

    let content = fs::read_to_string(logs[0].path()).expect("should read log");
    assert!(content.contains("scanning path"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Wrote log to"), "stdout: {stdout}");
}

#[test]
fn test_log_file_keeps_progress_when_console_is_quiet() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let log_dir = temp_dir.path().join("logs");
    let config = write_config(
        temp_dir.path(),
        "versentry.toml",
        &format!(
            r#"
[general]
log_level = "warn"
log_dir = "{logs}"

[database]
database = "inv.db"

[[folders]]
path = "."
"#,
            logs = toml_path(&log_dir),
        ),
    );

    let output = versentry(&[&config], temp_dir.path());
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // console follows log_level, the run log keeps info-level progress
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("scanning path"), "stderr: {stderr}");

    let log = fs::read_dir(&log_dir)
        .expect("log dir should exist")
        .filter_map(|e| e.ok())
        .next()
        .expect("one log file");
    let content = fs::read_to_string(log.path()).expect("should read log");
    assert!(content.contains("scanning path"), "log: {content}");
    assert!(content.contains("Files: 0"), "log: {content}");
}
