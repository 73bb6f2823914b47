use super::{normalize_reference, RepoSource};
use crate::types::consilience::{CheckDetail, CheckResult, CheckStatus};
use crate::types::snapshot::{TreeEntry, TreeEntryKind};
use std::collections::HashSet;
use tracing::{info, warn};

/// Repository tree as lookup sets: files verbatim, directories with a trailing slash.
#[derive(Debug, Default)]
struct TreeIndex {
    files: HashSet<String>,
    dirs: HashSet<String>,
}

impl TreeIndex {
    fn build(entries: &[TreeEntry]) -> Self {
        let mut index = Self::default();
        for entry in entries {
            let path = entry.path.trim_matches('/');
            if path.is_empty() {
                continue;
            }
            match entry.kind {
                TreeEntryKind::Blob => {
                    index.files.insert(path.to_string());
                }
                TreeEntryKind::Tree => {
                    index.dirs.insert(format!("{path}/"));
                }
            }
        }
        index
    }

    fn has_prefix(&self, dir_key: &str) -> bool {
        self.files
            .iter()
            .chain(self.dirs.iter())
            .any(|path| path.starts_with(dir_key))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PathChecker;

impl PathChecker {
    pub fn check(
        &self,
        owner: &str,
        repo: &str,
        references: &[String],
        source: &dyn RepoSource,
    ) -> CheckResult {
        if references.is_empty() {
            return CheckResult::default();
        }

        let tree = match source.tree(owner, repo) {
            Ok(entries) if !entries.is_empty() => entries,
            Ok(_) => {
                warn!(owner, repo, "repository tree is empty; path references left unchecked");
                return all_unchecked(references, "tree_empty");
            }
            Err(error) => {
                warn!(owner, repo, %error, "repository tree unavailable; path references left unchecked");
                return all_unchecked(references, "tree_unavailable");
            }
        };

        let index = TreeIndex::build(&tree);
        let details = references
            .iter()
            .map(|reference| classify(&index, reference))
            .collect();
        let result = CheckResult::from_details(details);
        info!(
            owner,
            repo,
            valid = result.valid,
            broken = result.broken,
            unchecked = result.unchecked,
            "path consilience checked"
        );
        result
    }
}

fn classify(index: &TreeIndex, reference: &str) -> CheckDetail {
    let normalized = normalize_reference(reference);
    if normalized.is_empty() {
        return CheckDetail::new(reference, CheckStatus::Unchecked, "empty_reference");
    }

    let bare = normalized.trim_end_matches('/');
    if !normalized.ends_with('/') && index.files.contains(bare) {
        return CheckDetail::new(reference, CheckStatus::Valid, "file");
    }
    let dir_key = format!("{bare}/");
    if index.dirs.contains(&dir_key) {
        return CheckDetail::new(reference, CheckStatus::Valid, "directory");
    }
    if is_directory_style(&normalized) && index.has_prefix(&dir_key) {
        return CheckDetail::new(reference, CheckStatus::Valid, "prefix");
    }
    CheckDetail::new(reference, CheckStatus::Broken, "not_found")
}

/// Trailing slash, or a last segment without an extension.
fn is_directory_style(normalized: &str) -> bool {
    if normalized.ends_with('/') {
        return true;
    }
    let last = normalized.rsplit('/').next().unwrap_or(normalized);
    !last.contains('.')
}

fn all_unchecked(references: &[String], reason: &str) -> CheckResult {
    CheckResult::from_details(
        references
            .iter()
            .map(|reference| CheckDetail::new(reference.as_str(), CheckStatus::Unchecked, reason))
            .collect(),
    )
}
