use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeEntryKind {
    Blob,
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: TreeEntryKind,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: TreeEntryKind::Blob,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: TreeEntryKind::Tree,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEntry {
    pub path: String,
}

impl WorkflowEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootEntryKind {
    File,
    Dir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RootEntryKind,
}

impl RootEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RootEntryKind::File,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RootEntryKind::Dir,
        }
    }
}

/// Already-fetched live state of one repository. `None` means the fetch failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoSnapshot {
    pub tree: Option<Vec<TreeEntry>>,
    pub workflows: Option<Vec<WorkflowEntry>>,
    pub root: Option<Vec<RootEntry>>,
}

/// A commit date as delivered by the fetch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityDate {
    Parsed(DateTime<Utc>),
    UnixSeconds(i64),
    Text(String),
}

impl ActivityDate {
    /// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and date-only values.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Parsed(value) => Some(*value),
            Self::UnixSeconds(secs) => Utc.timestamp_opt(*secs, 0).single(),
            Self::Text(raw) => parse_date_text(raw.trim()),
        }
    }
}

impl From<DateTime<Utc>> for ActivityDate {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Parsed(value)
    }
}

impl From<&str> for ActivityDate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

fn parse_date_text(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(value) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(value.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| value.and_utc())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitActivity {
    pub last_commit_date: Option<ActivityDate>,
    pub total_commits: u32,
    pub unique_authors: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueActivity {
    pub open_issues: u32,
    pub closed_in_window: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrActivity {
    pub merged_in_window: u32,
    pub open_prs: u32,
}

/// Activity aggregate produced by the fetch layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityData {
    pub commit: CommitActivity,
    pub issue: IssueActivity,
    pub pr: PrActivity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoInfo {
    pub archived: bool,
    pub pushed_at: Option<ActivityDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_rfc3339_naive_and_date_only() {
        let rfc = ActivityDate::from("2024-03-05T10:00:00Z").to_utc();
        let naive = ActivityDate::from("2024-03-05T10:00:00").to_utc();
        let date_only = ActivityDate::from("2024-03-05").to_utc();
        assert_eq!(rfc, naive);
        assert_eq!(date_only.map(|value| value.day()), Some(5));
    }

    #[test]
    fn unparseable_text_yields_none() {
        assert!(ActivityDate::from("last tuesday").to_utc().is_none());
        assert!(ActivityDate::from("").to_utc().is_none());
    }

    #[test]
    fn activity_json_accepts_partial_payloads() {
        let activity: ActivityData = serde_json::from_str(
            r#"{"commit": {"last_commit_date": "2024-01-01", "total_commits": 42}}"#,
        )
        .expect("activity should parse");
        assert_eq!(activity.commit.total_commits, 42);
        assert_eq!(activity.commit.unique_authors, 0);
        assert_eq!(activity.issue, IssueActivity::default());
        assert!(activity.commit.last_commit_date.is_some());
    }

    #[test]
    fn snapshot_entries_use_type_field() {
        let snapshot: RepoSnapshot = serde_json::from_str(
            r#"{"tree": [{"path": "src", "type": "tree"}, {"path": "src/lib.rs", "type": "blob"}]}"#,
        )
        .expect("snapshot should parse");
        let tree = snapshot.tree.expect("tree should be present");
        assert_eq!(tree[0], TreeEntry::tree("src"));
        assert!(snapshot.workflows.is_none());
    }
}
