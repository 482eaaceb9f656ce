//! Smoke tests to verify command wiring

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the caller's config and database.
fn therapy(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("therapy").unwrap();
    cmd.env_remove("DATABASE_URL")
        .env_remove("THERAPY_CONFIG")
        .env_remove("RUST_LOG")
        .env("HOME", home.path())
        .current_dir(home.path());
    cmd
}

// === Help ===

#[test]
fn test_top_level_help_lists_commands() {
    let home = TempDir::new().unwrap();
    therapy(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("labels"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_serve_help() {
    let home = TempDir::new().unwrap();
    therapy(&home)
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--in-memory"))
        .stdout(predicate::str::contains("--cors-permissive"));
}

#[test]
fn test_labels_import_help() {
    let home = TempDir::new().unwrap();
    therapy(&home)
        .args(["labels", "import", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[[label]]"));
}

// === Completions ===

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    therapy(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("therapy"));
}

// === Config ===

#[test]
fn test_config_init_show_and_refuse_overwrite() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("conf").join("config.toml");
    let path_arg = path.to_str().unwrap();

    therapy(&home)
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    assert!(path.exists());

    therapy(&home)
        .args(["--config", path_arg, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[server]"))
        .stdout(predicate::str::contains("127.0.0.1:3030"));

    therapy(&home)
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    therapy(&home)
        .args(["--config", path_arg, "config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_path_defaults_to_home() {
    let home = TempDir::new().unwrap();
    therapy(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".therapy"));
}

#[test]
fn test_config_env_override() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("env-config.toml");
    fs::write(&path, "[server]\nbind = \"0.0.0.0:4000\"\n").unwrap();

    therapy(&home)
        .env("THERAPY_CONFIG", &path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.0.0.0:4000"));
}

// === Labels ===

#[test]
fn test_labels_import_dry_run() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("labels.toml");
    fs::write(
        &file,
        r#"
[[label]]
short_name = "ANX"
report_name = "Anxiety"
stubs = [1, 2]

[[label]]
short_name = "DEP"
report_name = "Depression"
"#,
    )
    .unwrap();

    therapy(&home)
        .args(["labels", "import", "--dry-run"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 labels valid"));
}

#[test]
fn test_labels_import_rejects_invalid_entry() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("labels.toml");
    fs::write(&file, "[[label]]\nshort_name = \"\"\nreport_name = \"Empty\"\n").unwrap();

    therapy(&home)
        .args(["labels", "import", "--dry-run"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid label #1"));
}

// === Database commands ===

#[test]
fn test_migrate_requires_database_url() {
    let home = TempDir::new().unwrap();
    therapy(&home)
        .arg("migrate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}
