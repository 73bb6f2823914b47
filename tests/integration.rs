// Integration tests for the credence CLI.
//
// These tests use assert_cmd to invoke the binary and verify
// exit codes, stdout/stderr output and rendered reports.

#![allow(deprecated)]

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Runs inside `dir` so a stray `credence.toml` never leaks into a test.
fn credence(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("credence").expect("binary should exist");
    cmd.current_dir(dir);
    cmd
}

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir should be created");
    }
    fs::write(path, content).expect("file should write");
}

fn checkout() -> TempDir {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "Cargo.toml", "[package]\nname = \"tool\"\n");
    write(dir.path(), "src/lib.rs", "pub fn run() {}\n");
    dir
}

#[test]
fn cli_version_flag() {
    let dir = TempDir::new().expect("temp dir should be created");
    credence(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("credence"));
}

#[test]
fn cli_help_flag() {
    let dir = TempDir::new().expect("temp dir should be created");
    credence(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sustainability"));
}

#[test]
fn docs_requires_readme() {
    let dir = TempDir::new().expect("temp dir should be created");
    credence(dir.path())
        .arg("docs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn docs_missing_readme_exits_with_code_3() {
    let dir = TempDir::new().expect("temp dir should be created");
    credence(dir.path())
        .args(["docs", "NOPE.md"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("path does not exist"));
}

#[test]
fn docs_rejects_repo_dir_with_snapshot() {
    let dir = TempDir::new().expect("temp dir should be created");
    credence(dir.path())
        .args(["docs", "README.md", "--repo-dir", ".", "--snapshot", "s.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn docs_with_backed_claims_succeeds_as_json() {
    let repo = checkout();
    write(
        repo.path(),
        "README.md",
        "# Tool\n\nBuild it:\n\n```bash\ncargo build --release\n```\n\nThe entry point is `src/lib.rs`.\n",
    );

    let output = credence(repo.path())
        .args(["docs", "README.md", "--repo-dir", ".", "--raw", "70", "-f", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value =
        serde_json::from_slice(&output).expect("stdout should be json");
    assert_eq!(value["consilience_score"], 100.0);
    assert_eq!(value["has_broken_refs"], false);
    assert_eq!(value["consilience"]["command"]["valid"], 1);
    assert!(value.get("links").is_none());
}

#[test]
fn docs_with_broken_reference_exits_with_warning() {
    let repo = checkout();
    write(repo.path(), "README.md", "# Tool\n\nSee `src/missing.rs` for details.\n");

    credence(repo.path())
        .args(["docs", "README.md", "--repo-dir", "."])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("# Documentation Credibility"))
        .stdout(predicate::str::contains("`src/missing.rs` (not_found)"));
}

#[test]
fn docs_with_snapshot_file_uses_prefetched_tree() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "README.md", "Code lives in `src/app.py`.\n");
    write(
        dir.path(),
        "snapshot.json",
        r#"{"tree": [{"path": "src/app.py", "type": "blob"}]}"#,
    );

    credence(dir.path())
        .args(["docs", "README.md", "--snapshot", "snapshot.json", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"has_broken_refs\": false"));
}

#[test]
fn docs_with_missing_config_exits_with_code_3() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "README.md", "# Tool\n");
    credence(dir.path())
        .args(["docs", "README.md", "--config", "absent.toml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn docs_picks_up_config_in_working_directory() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "README.md", "# Tool\n");
    write(dir.path(), "credence.toml", "[consilience]\nweight_raw = 0.9\n");
    credence(dir.path())
        .args(["docs", "README.md", "--skip-consilience"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("weights must sum to 1.0"));
}

#[test]
fn gate_with_recent_activity_is_sustainable() {
    let dir = TempDir::new().expect("temp dir should be created");
    let last = (Utc::now() - Duration::days(5)).to_rfc3339();
    write(
        dir.path(),
        "activity.json",
        &format!(
            r#"{{"commit": {{"last_commit_date": "{last}", "total_commits": 100, "unique_authors": 10}}}}"#
        ),
    );

    credence(dir.path())
        .args(["gate", "--activity", "activity.json", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"gate_level\": \"active\""))
        .stdout(predicate::str::contains("\"is_sustainable\": true"));
}

#[test]
fn gate_with_old_activity_exits_with_warning() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(
        dir.path(),
        "activity.json",
        r#"{"commit": {"last_commit_date": "2001-01-01", "total_commits": 3, "unique_authors": 1}}"#,
    );
    write(dir.path(), "info.json", r#"{"archived": true}"#);

    credence(dir.path())
        .args(["gate", "--activity", "activity.json", "--repo-info", "info.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Level: abandoned"))
        .stdout(predicate::str::contains("Repository is archived"));
}

#[test]
fn gate_defaults_to_current_directory_history() {
    let dir = TempDir::new().expect("temp dir should be created");
    credence(dir.path())
        .arg("gate")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not a git repository"));
}

#[test]
fn gate_rejects_activity_with_explicit_repo_dir() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "activity.json", "{}");
    credence(dir.path())
        .args(["gate", "--activity", "activity.json", "--repo-dir", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn gate_on_non_git_dir_exits_with_code_3() {
    let dir = TempDir::new().expect("temp dir should be created");
    credence(dir.path())
        .args(["gate", "--repo-dir", "."])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not a git repository"));
}

#[test]
fn config_hash_prints_sha256_hex() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "scoring.toml", "[gate]\nmin_commits = 5\n");
    credence(dir.path())
        .args(["config-hash", "scoring.toml"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[0-9a-f]{64}\n$").expect("regex should compile"));
}
