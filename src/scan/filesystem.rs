use crate::consilience::RepoSource;
use crate::error::FetchError;
use crate::types::snapshot::{RootEntry, TreeEntry, WorkflowEntry};
use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

const WORKFLOW_DIR: &str = ".github/workflows";

/// Serves tree, workflow and root listings from a checked-out directory.
/// Owner and repo arguments are ignored: the checkout is the repository.
#[derive(Debug, Clone)]
pub struct LocalRepoSource {
    root: PathBuf,
}

impl LocalRepoSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn ensure_root(&self) -> Result<(), FetchError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(FetchError::Failed(format!(
                "{} is not a directory",
                self.root.display()
            )))
        }
    }

    fn relative(&self, entry: &DirEntry) -> Option<String> {
        let relative = entry.path().strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();
        (!parts.is_empty()).then(|| parts.join("/"))
    }
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == ".git"
}

impl RepoSource for LocalRepoSource {
    fn tree(&self, _owner: &str, _repo: &str) -> Result<Vec<TreeEntry>, FetchError> {
        self.ensure_root()?;
        let mut entries: Vec<TreeEntry> = WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !is_git_dir(entry))
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = self.relative(&entry)?;
                Some(if entry.file_type().is_dir() {
                    TreeEntry::tree(path)
                } else {
                    TreeEntry::blob(path)
                })
            })
            .collect();
        entries.sort_by(|left, right| left.path.cmp(&right.path));
        Ok(entries)
    }

    fn workflows(&self, _owner: &str, _repo: &str) -> Result<Vec<WorkflowEntry>, FetchError> {
        self.ensure_root()?;
        let dir = self.root.join(WORKFLOW_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut workflows: Vec<WorkflowEntry> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.relative(&entry))
            .filter(|path| path.ends_with(".yml") || path.ends_with(".yaml"))
            .map(WorkflowEntry::new)
            .collect();
        workflows.sort_by(|left, right| left.path.cmp(&right.path));
        Ok(workflows)
    }

    fn root_listing(&self, _owner: &str, _repo: &str) -> Result<Vec<RootEntry>, FetchError> {
        self.ensure_root()?;
        let mut listing: Vec<RootEntry> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name() != ".git")
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                if entry.file_type().is_dir() {
                    RootEntry::dir(name)
                } else {
                    RootEntry::file(name)
                }
            })
            .collect();
        listing.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(listing)
    }
}
