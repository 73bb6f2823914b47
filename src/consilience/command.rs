use super::RepoSource;
use crate::types::consilience::{CheckDetail, CheckResult, CheckStatus};
use crate::types::snapshot::{RootEntry, RootEntryKind};
use tracing::{info, warn};

/// A root-level file or directory a command category depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: &'static str,
    /// Any one present satisfies the entry point.
    pub candidates: &'static [(&'static str, RootEntryKind)],
}

const SETUP_PY: EntryPoint = EntryPoint {
    name: "setup.py",
    candidates: &[
        ("setup.py", RootEntryKind::File),
        ("pyproject.toml", RootEntryKind::File),
        ("setup.cfg", RootEntryKind::File),
        ("requirements.txt", RootEntryKind::File),
    ],
};
const PACKAGE_JSON: EntryPoint = EntryPoint {
    name: "package.json",
    candidates: &[("package.json", RootEntryKind::File)],
};
const DOCKERFILE: EntryPoint = EntryPoint {
    name: "Dockerfile",
    candidates: &[
        ("Dockerfile", RootEntryKind::File),
        ("docker-compose.yml", RootEntryKind::File),
        ("docker-compose.yaml", RootEntryKind::File),
        ("compose.yaml", RootEntryKind::File),
        ("compose.yml", RootEntryKind::File),
    ],
};
const MAKEFILE: EntryPoint = EntryPoint {
    name: "Makefile",
    candidates: &[("Makefile", RootEntryKind::File), ("GNUmakefile", RootEntryKind::File)],
};
const TESTS_DIR: EntryPoint = EntryPoint {
    name: "tests/",
    candidates: &[("tests", RootEntryKind::Dir), ("test", RootEntryKind::Dir)],
};
const CARGO_TOML: EntryPoint = EntryPoint {
    name: "Cargo.toml",
    candidates: &[("Cargo.toml", RootEntryKind::File)],
};
const GO_MOD: EntryPoint = EntryPoint {
    name: "go.mod",
    candidates: &[("go.mod", RootEntryKind::File)],
};

/// Entry point a README command category implies, if any.
pub fn entrypoint_for(category: &str) -> Option<EntryPoint> {
    match category {
        "pip" => Some(SETUP_PY),
        "npm" | "yarn" => Some(PACKAGE_JSON),
        "docker" => Some(DOCKERFILE),
        "make" => Some(MAKEFILE),
        "pytest" => Some(TESTS_DIR),
        "cargo" => Some(CARGO_TOML),
        "go" => Some(GO_MOD),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandChecker;

impl CommandChecker {
    pub fn check(
        &self,
        owner: &str,
        repo: &str,
        categories: &[String],
        source: &dyn RepoSource,
    ) -> CheckResult {
        let mut expected: Vec<EntryPoint> = Vec::new();
        for entrypoint in categories.iter().filter_map(|category| entrypoint_for(category)) {
            if !expected.contains(&entrypoint) {
                expected.push(entrypoint);
            }
        }
        if expected.is_empty() {
            return CheckResult::default();
        }

        let listing = match source.root_listing(owner, repo) {
            Ok(listing) if !listing.is_empty() => listing,
            Ok(_) => {
                warn!(owner, repo, "root listing is empty; entry points left unchecked");
                return all_unchecked(&expected, "listing_empty");
            }
            Err(error) => {
                warn!(owner, repo, %error, "root listing unavailable; entry points left unchecked");
                return all_unchecked(&expected, "listing_unavailable");
            }
        };

        let details = expected
            .iter()
            .map(|entrypoint| match present_candidate(entrypoint, &listing) {
                Some(found) => CheckDetail::new(entrypoint.name, CheckStatus::Valid, format!("found:{found}")),
                None => CheckDetail::new(entrypoint.name, CheckStatus::Broken, "missing"),
            })
            .collect();
        let result = CheckResult::from_details(details);
        info!(
            owner,
            repo,
            valid = result.valid,
            broken = result.broken,
            unchecked = result.unchecked,
            "command consilience checked"
        );
        result
    }
}

fn present_candidate(entrypoint: &EntryPoint, listing: &[RootEntry]) -> Option<&'static str> {
    entrypoint
        .candidates
        .iter()
        .find(|(name, kind)| {
            listing
                .iter()
                .any(|entry| entry.kind == *kind && entry.name.eq_ignore_ascii_case(name))
        })
        .map(|(name, _)| *name)
}

fn all_unchecked(expected: &[EntryPoint], reason: &str) -> CheckResult {
    CheckResult::from_details(
        expected
            .iter()
            .map(|entrypoint| CheckDetail::new(entrypoint.name, CheckStatus::Unchecked, reason))
            .collect(),
    )
}
