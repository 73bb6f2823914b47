use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Valid,
    Broken,
    Unchecked,
}

/// Classification of one reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDetail {
    pub reference: String,
    pub status: CheckStatus,
    pub reason: String,
}

impl CheckDetail {
    pub fn new(reference: impl Into<String>, status: CheckStatus, reason: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            status,
            reason: reason.into(),
        }
    }
}

/// Outcome of one checker invocation. Counts always agree with `details`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub valid: u32,
    pub broken: u32,
    pub unchecked: u32,
    pub total: u32,
    pub details: Vec<CheckDetail>,
}

impl CheckResult {
    pub fn from_details(details: Vec<CheckDetail>) -> Self {
        let count = |status: CheckStatus| {
            details
                .iter()
                .filter(|detail| detail.status == status)
                .count() as u32
        };
        Self {
            valid: count(CheckStatus::Valid),
            broken: count(CheckStatus::Broken),
            unchecked: count(CheckStatus::Unchecked),
            total: details.len() as u32,
            details,
        }
    }

    /// References that could be verified one way or the other.
    pub fn checked(&self) -> u32 {
        self.valid + self.broken
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub type PathCheckResult = CheckResult;
pub type BadgeCheckResult = CheckResult;
pub type CommandCheckResult = CheckResult;
pub type LinkCheckResult = CheckResult;
