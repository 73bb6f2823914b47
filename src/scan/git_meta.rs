use crate::error::{CredenceError, Result};
use crate::types::snapshot::{ActivityData, ActivityDate, CommitActivity};
use std::collections::HashSet;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Commit activity of a local checkout. Issue and PR aggregates stay empty,
/// so the gate skips those checks.
pub fn activity_from_git(root: &Path) -> Result<ActivityData> {
    if !root.exists() {
        return Err(CredenceError::PathNotFound(root.display().to_string()));
    }
    if !root.join(".git").exists() {
        return Err(CredenceError::NotGitRepo(root.display().to_string()));
    }

    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .arg("log")
        .arg("--format=%ct%x09%ae")
        .output()?;

    if !output.status.success() {
        debug!(
            root = %root.display(),
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "git log failed; reporting empty activity"
        );
        return Ok(ActivityData::default());
    }

    Ok(parse_log(&String::from_utf8_lossy(&output.stdout)))
}

/// Parses `<unix-seconds>\t<author-email>` lines, newest first.
fn parse_log(log: &str) -> ActivityData {
    let mut authors = HashSet::new();
    let mut last_commit = None;
    let mut total_commits = 0u32;

    for line in log.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let (timestamp, email) = line.split_once('\t').unwrap_or((line, ""));
        total_commits += 1;
        if last_commit.is_none() {
            last_commit = timestamp.trim().parse::<i64>().ok();
        }
        let email = email.trim().to_lowercase();
        if !email.is_empty() {
            authors.insert(email);
        }
    }

    ActivityData {
        commit: CommitActivity {
            last_commit_date: last_commit.map(ActivityDate::UnixSeconds),
            total_commits,
            unique_authors: authors.len() as u32,
        },
        ..ActivityData::default()
    }
}
