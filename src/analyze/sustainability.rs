use crate::types::config::GateConfig;
use crate::types::scoring::{GateCheckName, GateCheckResult, GateLevel, SustainabilityGateResult};
use crate::types::snapshot::{ActivityData, RepoInfo};
use chrono::{DateTime, Utc};
use tracing::info;

/// Days assumed when no usable commit date is available.
pub const UNKNOWN_DAYS_SINCE_COMMIT: i64 = 999;

const LEVEL_WEIGHT: f64 = 0.7;
const PASS_RATE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct SustainabilityGate {
    config: GateConfig,
}

impl SustainabilityGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, activity: &ActivityData, repo_info: Option<&RepoInfo>) -> SustainabilityGateResult {
        self.check_at(activity, repo_info, Utc::now())
    }

    pub fn check_at(
        &self,
        activity: &ActivityData,
        repo_info: Option<&RepoInfo>,
        now: DateTime<Utc>,
    ) -> SustainabilityGateResult {
        let cfg = &self.config;
        let commit = &activity.commit;
        let mut warnings = Vec::new();

        let last_commit = commit
            .last_commit_date
            .as_ref()
            .and_then(|date| date.to_utc())
            .or_else(|| {
                repo_info
                    .and_then(|info| info.pushed_at.as_ref())
                    .and_then(|date| date.to_utc())
            });
        let days_since_commit = match last_commit {
            Some(date) => (now - date).num_days().max(0),
            None => {
                warnings.push("No usable last-commit date; activity treated as stale".to_string());
                UNKNOWN_DAYS_SINCE_COMMIT
            }
        };
        let authors = commit.unique_authors;

        let mut checks = vec![
            GateCheckResult::evaluated(
                GateCheckName::RecentCommit,
                days_since_commit <= cfg.recent_commit_days,
                days_since_commit as f64,
                cfg.recent_commit_days as f64,
                format!("Last commit {days_since_commit} day(s) ago (limit {})", cfg.recent_commit_days),
            ),
            GateCheckResult::evaluated(
                GateCheckName::MinCommits,
                commit.total_commits >= cfg.min_commits,
                f64::from(commit.total_commits),
                f64::from(cfg.min_commits),
                format!("{} commit(s) (minimum {})", commit.total_commits, cfg.min_commits),
            ),
            GateCheckResult::evaluated(
                GateCheckName::ContributorDiversity,
                authors >= cfg.min_contributors,
                f64::from(authors),
                f64::from(cfg.min_contributors),
                format!("{authors} unique author(s) (minimum {})", cfg.min_contributors),
            ),
        ];

        let issues = &activity.issue;
        let issue_total = u64::from(issues.open_issues) + u64::from(issues.closed_in_window);
        checks.push(if issue_total == 0 {
            GateCheckResult::skipped(
                GateCheckName::IssueResponsiveness,
                cfg.issue_close_ratio,
                "No issue activity to evaluate",
            )
        } else {
            let ratio = f64::from(issues.closed_in_window) / issue_total as f64;
            GateCheckResult::evaluated(
                GateCheckName::IssueResponsiveness,
                ratio >= cfg.issue_close_ratio,
                ratio,
                cfg.issue_close_ratio,
                format!(
                    "{} of {issue_total} issue(s) closed in window",
                    issues.closed_in_window
                ),
            )
        });

        let prs = &activity.pr;
        let pr_total = u64::from(prs.merged_in_window) + u64::from(prs.open_prs);
        checks.push(if pr_total == 0 {
            GateCheckResult::skipped(
                GateCheckName::PrActivity,
                f64::from(cfg.min_merged_prs),
                "No pull request activity to evaluate",
            )
        } else {
            GateCheckResult::evaluated(
                GateCheckName::PrActivity,
                prs.merged_in_window >= cfg.min_merged_prs,
                f64::from(prs.merged_in_window),
                f64::from(cfg.min_merged_prs),
                format!("{} pull request(s) merged in window", prs.merged_in_window),
            )
        });

        let bus_factor_ok = authors >= cfg.bus_factor_warning;
        checks.push(GateCheckResult::evaluated(
            GateCheckName::BusFactor,
            bus_factor_ok,
            f64::from(authors),
            f64::from(cfg.bus_factor_warning),
            format!("{authors} active contributor(s)"),
        ));
        if !bus_factor_ok {
            warnings.push(format!(
                "Bus factor risk: only {authors} contributor(s) sustain the project"
            ));
        }

        for check in checks.iter().filter(|check| !check.passed() && !check.is_skipped()) {
            if check.name.is_required() {
                warnings.push(format!("Required check {} failed: {}", check.name.as_str(), check.message));
            }
        }
        if repo_info.is_some_and(|info| info.archived) {
            warnings.push("Repository is archived".to_string());
        }

        let is_sustainable = checks
            .iter()
            .filter(|check| check.name.is_required())
            .all(GateCheckResult::passed);
        let gate_level = self.level(days_since_commit, authors);
        let sustainability_score = score(gate_level, &checks);

        info!(
            gate_level = gate_level.as_str(),
            days_since_commit,
            is_sustainable,
            sustainability_score,
            "sustainability gate evaluated"
        );

        SustainabilityGateResult {
            is_sustainable,
            gate_level,
            sustainability_score,
            days_since_commit,
            checks,
            warnings,
        }
    }

    /// First matching tier wins: active, maintained, stale, abandoned.
    pub fn level(&self, days_since_commit: i64, unique_authors: u32) -> GateLevel {
        let cfg = &self.config;
        if days_since_commit <= cfg.active_days && unique_authors >= cfg.active_min_authors {
            GateLevel::Active
        } else if days_since_commit <= cfg.maintained_days {
            GateLevel::Maintained
        } else if days_since_commit <= cfg.stale_days {
            GateLevel::Stale
        } else {
            GateLevel::Abandoned
        }
    }
}

fn score(level: GateLevel, checks: &[GateCheckResult]) -> f64 {
    let evaluated = checks.iter().filter(|check| !check.is_skipped()).count();
    let passed = checks.iter().filter(|check| check.passed()).count();
    let pass_ratio = if evaluated == 0 {
        0.0
    } else {
        passed as f64 / evaluated as f64
    };
    (level.base_score() * LEVEL_WEIGHT + pass_ratio * 100.0 * PASS_RATE_WEIGHT)
        .round()
        .clamp(0.0, 100.0)
}
