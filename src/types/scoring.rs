use super::consilience::CheckResult;
use super::signals::{MarketingSignals, TechSignals};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

pub type Score = f64;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsilienceBreakdown {
    pub path: CheckResult,
    pub badge: CheckResult,
    pub command: CheckResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsEffectiveResult {
    pub docs_quality_raw: Score,
    pub tech_score: Score,
    pub marketing_penalty: Score,
    pub consilience_score: Score,
    pub docs_effective: Score,
    pub tech_signals: TechSignals,
    pub marketing_signals: MarketingSignals,
    pub consilience: ConsilienceBreakdown,
    pub is_marketing_heavy: bool,
    pub has_broken_refs: bool,
}

/// Sustainability tier, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateLevel {
    Abandoned,
    Stale,
    Maintained,
    Active,
}

impl GateLevel {
    pub fn base_score(self) -> f64 {
        match self {
            Self::Active => 90.0,
            Self::Maintained => 70.0,
            Self::Stale => 40.0,
            Self::Abandoned => 10.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Maintained => "maintained",
            Self::Stale => "stale",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for GateLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateCheckName {
    RecentCommit,
    MinCommits,
    ContributorDiversity,
    IssueResponsiveness,
    PrActivity,
    BusFactor,
}

impl GateCheckName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RecentCommit => "recent_commit",
            Self::MinCommits => "min_commits",
            Self::ContributorDiversity => "contributor_diversity",
            Self::IssueResponsiveness => "issue_responsiveness",
            Self::PrActivity => "pr_activity",
            Self::BusFactor => "bus_factor",
        }
    }

    /// Only these two decide `is_sustainable`.
    pub fn is_required(self) -> bool {
        matches!(self, Self::RecentCommit | Self::MinCommits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateOutcome {
    Passed,
    Failed,
    /// Not applicable: the activity data carried nothing to judge.
    Skipped,
}

/// Serialized with a derived `passed` flag next to `outcome`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GateCheckResult {
    pub name: GateCheckName,
    pub outcome: GateOutcome,
    pub value: f64,
    pub threshold: f64,
    pub message: String,
}

impl Serialize for GateCheckResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GateCheckResult", 6)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("passed", &self.passed())?;
        state.serialize_field("outcome", &self.outcome)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("threshold", &self.threshold)?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}

impl GateCheckResult {
    pub fn evaluated(
        name: GateCheckName,
        passed: bool,
        value: f64,
        threshold: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name,
            outcome: if passed {
                GateOutcome::Passed
            } else {
                GateOutcome::Failed
            },
            value,
            threshold,
            message: message.into(),
        }
    }

    pub fn skipped(name: GateCheckName, threshold: f64, message: impl Into<String>) -> Self {
        Self {
            name,
            outcome: GateOutcome::Skipped,
            value: 0.0,
            threshold,
            message: message.into(),
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == GateOutcome::Passed
    }

    pub fn is_skipped(&self) -> bool {
        self.outcome == GateOutcome::Skipped
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SustainabilityGateResult {
    pub is_sustainable: bool,
    pub gate_level: GateLevel,
    pub sustainability_score: Score,
    pub days_since_commit: i64,
    pub checks: Vec<GateCheckResult>,
    pub warnings: Vec<String>,
}

impl SustainabilityGateResult {
    pub fn check(&self, name: GateCheckName) -> Option<&GateCheckResult> {
        self.checks.iter().find(|check| check.name == name)
    }
}
