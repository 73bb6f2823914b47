//! Cross-validation of README claims against live repository state.
//!
//! Each checker classifies references as valid, broken or unchecked. Missing
//! live data always yields `unchecked`; only data that disproves a claim
//! yields `broken`.

pub mod badge;
pub mod command;
pub mod link;
pub mod path;

use crate::error::FetchError;
use crate::types::snapshot::{RepoSnapshot, RootEntry, TreeEntry, WorkflowEntry};

pub use badge::BadgeChecker;
pub use command::CommandChecker;
pub use link::{HttpProbe, LinkChecker, LinkProbe, ProbeOutcome};
pub use path::PathChecker;

/// External repository-fetch collaborator. Implementations may hit the network;
/// checkers call each method at most once per check.
pub trait RepoSource: Send + Sync {
    fn tree(&self, owner: &str, repo: &str) -> Result<Vec<TreeEntry>, FetchError>;
    fn workflows(&self, owner: &str, repo: &str) -> Result<Vec<WorkflowEntry>, FetchError>;
    fn root_listing(&self, owner: &str, repo: &str) -> Result<Vec<RootEntry>, FetchError>;
}

/// A pre-fetched snapshot serves every owner/repo it was built for.
impl RepoSource for RepoSnapshot {
    fn tree(&self, _owner: &str, _repo: &str) -> Result<Vec<TreeEntry>, FetchError> {
        self.tree.clone().ok_or(FetchError::Unavailable)
    }

    fn workflows(&self, _owner: &str, _repo: &str) -> Result<Vec<WorkflowEntry>, FetchError> {
        self.workflows.clone().ok_or(FetchError::Unavailable)
    }

    fn root_listing(&self, _owner: &str, _repo: &str) -> Result<Vec<RootEntry>, FetchError> {
        self.root.clone().ok_or(FetchError::Unavailable)
    }
}

/// Source used when no collaborator is wired in: nothing can be verified.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSource;

impl RepoSource for NoSource {
    fn tree(&self, _owner: &str, _repo: &str) -> Result<Vec<TreeEntry>, FetchError> {
        Err(FetchError::Unavailable)
    }

    fn workflows(&self, _owner: &str, _repo: &str) -> Result<Vec<WorkflowEntry>, FetchError> {
        Err(FetchError::Unavailable)
    }

    fn root_listing(&self, _owner: &str, _repo: &str) -> Result<Vec<RootEntry>, FetchError> {
        Err(FetchError::Unavailable)
    }
}

/// Strips quoting, backticks and a leading `./` or `/` from a reference.
pub(crate) fn normalize_reference(reference: &str) -> String {
    let trimmed = reference
        .trim()
        .trim_matches(|c| matches!(c, '`' | '"' | '\'' | '<' | '>'))
        .trim();
    let mut value = trimmed;
    while let Some(rest) = value.strip_prefix("./") {
        value = rest;
    }
    value.trim_start_matches('/').to_string()
}
