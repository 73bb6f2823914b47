use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Technical evidence harvested from README text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechSignals {
    /// Fenced-block count per declared language (`unknown` when untagged).
    pub code_blocks: BTreeMap<String, u32>,
    /// Command-block count per command-language tag or command-pattern name.
    pub command_blocks: BTreeMap<String, u32>,
    pub command_block_count: u32,
    /// Distinct path-like references in first-seen order, at most 50.
    pub path_refs: Vec<String>,
    pub platform_flags: BTreeMap<String, bool>,
    pub tech_signal_count: u32,
    pub token_count: usize,
    /// Signals per 1,000 tokens.
    pub tech_density: f64,
}

impl TechSignals {
    pub fn total_code_blocks(&self) -> u32 {
        self.code_blocks.values().sum()
    }

    pub fn platform_flags_true(&self) -> u32 {
        self.platform_flags.values().filter(|flag| **flag).count() as u32
    }

    /// Command categories observed in the README, for the command checker.
    pub fn command_categories(&self) -> Vec<String> {
        self.command_blocks.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeCounts {
    pub tech: u32,
    pub promo: u32,
    pub total: u32,
}

/// Promotional evidence harvested from README text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketingSignals {
    pub marketing_keywords: BTreeMap<String, u32>,
    pub marketing_keyword_total: u32,
    pub marketing_density: f64,
    pub unlinked_feature_bullets: u32,
    pub total_bullets: u32,
    pub badge_counts: BadgeCounts,
    pub badge_urls: Vec<String>,
    pub promo_badge_ratio: f64,
    /// Overlap with boilerplate README structure, clamped to [0, 1].
    pub template_similarity: f64,
    pub marketing_signal_count: f64,
}
