use super::RepoSource;
use crate::error::FetchError;
use crate::types::consilience::{CheckDetail, CheckResult, CheckStatus};
use crate::types::snapshot::WorkflowEntry;
use tracing::{info, warn};

/// A CI status badge resolved to the workflow it reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowBadge {
    pub owner: String,
    pub repo: String,
    /// `None` when the badge names a workflow by title rather than by file.
    pub workflow_file: Option<String>,
}

/// Recognizes GitHub Actions badge URLs and shields.io workflow-status badges.
pub fn parse_badge_url(url: &str) -> Option<WorkflowBadge> {
    let without_scheme = url
        .trim()
        .strip_prefix("https://")
        .or_else(|| url.trim().strip_prefix("http://"))?;
    let without_query = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme);
    let mut segments = without_query.split('/').filter(|segment| !segment.is_empty());
    let host = segments.next()?.to_lowercase();
    let rest: Vec<&str> = segments.collect();

    match host.as_str() {
        "github.com" | "www.github.com" => match rest.as_slice() {
            [owner, repo, "actions", "workflows", file, "badge.svg"] => {
                Some(badge(owner, repo, Some(*file)))
            }
            [owner, repo, "workflows", _name, "badge.svg"] => Some(badge(owner, repo, None)),
            _ => None,
        },
        "img.shields.io" => match rest.as_slice() {
            ["github", "actions", "workflow", "status", owner, repo, file, ..] => {
                Some(badge(owner, repo, Some(*file)))
            }
            ["github", "workflow", "status", owner, repo, ..] => Some(badge(owner, repo, None)),
            _ => None,
        },
        _ => None,
    }
}

fn badge(owner: &str, repo: &str, file: Option<&str>) -> WorkflowBadge {
    WorkflowBadge {
        owner: owner.to_string(),
        repo: repo.to_string(),
        workflow_file: file
            .map(|file| file.trim_end_matches(".svg").to_string())
            .filter(|file| file.ends_with(".yml") || file.ends_with(".yaml")),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BadgeChecker;

impl BadgeChecker {
    pub fn check(
        &self,
        owner: &str,
        repo: &str,
        badge_urls: &[String],
        source: &dyn RepoSource,
    ) -> CheckResult {
        if badge_urls.is_empty() {
            return CheckResult::default();
        }

        // Fetched on first need, at most once.
        let mut workflows: Option<Result<Vec<WorkflowEntry>, FetchError>> = None;
        let mut details = Vec::with_capacity(badge_urls.len());

        for url in badge_urls {
            let Some(parsed) = parse_badge_url(url) else {
                details.push(CheckDetail::new(url.as_str(), CheckStatus::Unchecked, "not_workflow_badge"));
                continue;
            };
            if !parsed.owner.eq_ignore_ascii_case(owner) || !parsed.repo.eq_ignore_ascii_case(repo) {
                details.push(CheckDetail::new(url.as_str(), CheckStatus::Unchecked, "other_repository"));
                continue;
            }

            let fetched = workflows.get_or_insert_with(|| {
                let fetched = source.workflows(owner, repo);
                if let Err(error) = &fetched {
                    warn!(owner, repo, %error, "workflow list unavailable; badges left unchecked");
                }
                fetched
            });
            details.push(classify(url, &parsed, fetched));
        }

        let result = CheckResult::from_details(details);
        info!(
            owner,
            repo,
            valid = result.valid,
            broken = result.broken,
            unchecked = result.unchecked,
            "badge consilience checked"
        );
        result
    }
}

fn classify(
    url: &str,
    parsed: &WorkflowBadge,
    workflows: &Result<Vec<WorkflowEntry>, FetchError>,
) -> CheckDetail {
    let workflows = match workflows {
        Ok(workflows) if !workflows.is_empty() => workflows,
        Ok(_) => return CheckDetail::new(url, CheckStatus::Unchecked, "workflows_empty"),
        Err(_) => return CheckDetail::new(url, CheckStatus::Unchecked, "workflows_unavailable"),
    };

    match &parsed.workflow_file {
        None => CheckDetail::new(url, CheckStatus::Valid, "has_workflows"),
        Some(file) => {
            if workflows.iter().any(|workflow| workflow.file_name() == file.as_str()) {
                CheckDetail::new(url, CheckStatus::Valid, "workflow_found")
            } else {
                CheckDetail::new(url, CheckStatus::Broken, "workflow_missing")
            }
        }
    }
}
