use crate::error::CredenceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub tech: TechConfig,
    pub marketing: MarketingConfig,
    pub consilience: ConsilienceConfig,
    pub links: LinkConfig,
    pub gate: GateConfig,
    pub patterns: PatternConfig,
}

/// One step of a tiered score: a count at or above `min` earns `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub min: f64,
    pub points: f64,
}

impl Tier {
    pub const fn new(min: f64, points: f64) -> Self {
        Self { min, points }
    }
}

/// Highest `points` among tiers reached by `value`, or zero.
pub fn tier_points(tiers: &[Tier], value: f64) -> f64 {
    tiers
        .iter()
        .filter(|tier| value >= tier.min)
        .map(|tier| tier.points)
        .fold(0.0, f64::max)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechConfig {
    pub code_block_tiers: Vec<Tier>,
    pub code_block_cap: f64,
    pub command_block_tiers: Vec<Tier>,
    pub command_block_cap: f64,
    pub path_ref_tiers: Vec<Tier>,
    pub path_ref_cap: f64,
    pub platform_flag_points: f64,
    pub platform_flag_cap: f64,
    pub density_tiers: Vec<Tier>,
    pub density_cap: f64,
    pub total_cap: f64,
}

impl Default for TechConfig {
    fn default() -> Self {
        Self {
            code_block_tiers: vec![Tier::new(1.0, 12.0), Tier::new(3.0, 22.0), Tier::new(5.0, 30.0)],
            code_block_cap: 30.0,
            command_block_tiers: vec![
                Tier::new(1.0, 10.0),
                Tier::new(2.0, 18.0),
                Tier::new(3.0, 25.0),
            ],
            command_block_cap: 25.0,
            path_ref_tiers: vec![Tier::new(1.0, 5.0), Tier::new(3.0, 10.0), Tier::new(5.0, 15.0)],
            path_ref_cap: 15.0,
            platform_flag_points: 10.0,
            platform_flag_cap: 15.0,
            density_tiers: vec![Tier::new(5.0, 5.0), Tier::new(15.0, 10.0), Tier::new(30.0, 15.0)],
            density_cap: 15.0,
            total_cap: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketingConfig {
    /// Keywords per 1,000 tokens tolerated before the density penalty starts.
    pub density_threshold: f64,
    pub density_penalty_per_unit: f64,
    pub density_penalty_cap: f64,
    pub bullet_allowance: u32,
    pub bullet_penalty_per: f64,
    pub bullet_penalty_cap: f64,
    pub promo_badge_allowance: u32,
    pub promo_badge_penalty_per: f64,
    pub badge_penalty_cap: f64,
    pub template_threshold: f64,
    pub template_penalty: f64,
    pub penalty_cap: f64,
    /// Density above which a README is flagged as marketing-heavy.
    pub heavy_density_threshold: f64,
}

impl Default for MarketingConfig {
    fn default() -> Self {
        Self {
            density_threshold: 5.0,
            density_penalty_per_unit: 1.0,
            density_penalty_cap: 10.0,
            bullet_allowance: 2,
            bullet_penalty_per: 1.0,
            bullet_penalty_cap: 10.0,
            promo_badge_allowance: 2,
            promo_badge_penalty_per: 2.0,
            badge_penalty_cap: 10.0,
            template_threshold: 0.5,
            template_penalty: 10.0,
            penalty_cap: 30.0,
            heavy_density_threshold: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsilienceConfig {
    pub weight_raw: f64,
    pub weight_tech: f64,
    pub weight_consilience: f64,
    pub floor: f64,
}

impl Default for ConsilienceConfig {
    fn default() -> Self {
        Self {
            weight_raw: 0.3,
            weight_tech: 0.4,
            weight_consilience: 0.3,
            floor: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub timeout_ms: u64,
    pub max_checks: usize,
    pub concurrency: usize,
    pub cache_capacity: usize,
    pub user_agent: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            max_checks: 20,
            concurrency: 5,
            cache_capacity: 256,
            user_agent: format!("credence/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub active_days: i64,
    pub maintained_days: i64,
    pub stale_days: i64,
    pub active_min_authors: u32,
    pub recent_commit_days: i64,
    pub min_commits: u32,
    pub min_contributors: u32,
    pub bus_factor_warning: u32,
    pub issue_close_ratio: f64,
    pub min_merged_prs: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            active_days: 90,
            maintained_days: 180,
            stale_days: 365,
            active_min_authors: 2,
            recent_commit_days: 180,
            min_commits: 10,
            min_contributors: 1,
            bus_factor_warning: 2,
            issue_close_ratio: 0.2,
            min_merged_prs: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Fence language tags treated as command blocks.
    pub command_languages: Vec<String>,
    /// Named regexes matched inside every fenced block.
    pub command_patterns: BTreeMap<String, String>,
    /// Regex prefixes for path references (word-boundary anchored).
    pub path_prefixes: Vec<String>,
    pub platform_markers: BTreeMap<String, Vec<String>>,
    /// Marketing keywords keyed by language family.
    pub marketing_keywords: BTreeMap<String, Vec<String>>,
    pub template_phrases: Vec<String>,
    pub placeholders: Vec<String>,
    pub action_verbs: Vec<String>,
    pub tech_badge_keywords: Vec<String>,
    pub promo_badge_keywords: Vec<String>,
    pub skip_link_hosts: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Default for PatternConfig {
    fn default() -> Self {
        let command_patterns = [
            ("pip", r"\bpip3?\s+install\b"),
            ("npm", r"\bnpm\s+(?:install|i|ci|run|start|test)\b"),
            ("yarn", r"\byarn(?:\s+(?:install|add|run|start|test|build))?\b"),
            ("docker", r"\bdocker(?:-compose|\s+(?:build|run|compose|pull))\b"),
            ("make", r"(?m)^\s*\$?\s*make\b"),
            ("pytest", r"\bpytest\b"),
            ("cargo", r"\bcargo\s+(?:build|run|install|test)\b"),
            ("go", r"\bgo\s+(?:build|run|install|get|test)\b"),
        ]
        .into_iter()
        .map(|(name, pattern)| (name.to_string(), pattern.to_string()))
        .collect();

        let platform_markers = [
            ("pyproject", &["pyproject.toml"][..]),
            ("requirements", &["requirements.txt"][..]),
            ("setup_py", &["setup.py"][..]),
            ("package_json", &["package.json"][..]),
            ("dockerfile", &["dockerfile"][..]),
            ("docker_compose", &["docker-compose", "compose.yaml", "compose.yml"][..]),
            ("makefile", &["makefile"][..]),
            ("cargo", &["cargo.toml"][..]),
            ("go_mod", &["go.mod"][..]),
            ("ci", &[".github/workflows", "github actions"][..]),
        ]
        .into_iter()
        .map(|(name, markers)| (name.to_string(), strings(markers)))
        .collect();

        let marketing_keywords = [
            (
                "en",
                &[
                    "revolutionary",
                    "blazing fast",
                    "blazingly fast",
                    "lightning fast",
                    "cutting-edge",
                    "world-class",
                    "best-in-class",
                    "industry-leading",
                    "game-changing",
                    "game changer",
                    "next-generation",
                    "state-of-the-art",
                    "seamless",
                    "effortless",
                    "enterprise-grade",
                    "unleash",
                    "supercharge",
                    "ultimate",
                    "powerful",
                    "amazing",
                ][..],
            ),
            (
                "ko",
                &["혁신적인", "획기적인", "최고의", "강력한", "완벽한", "차세대", "놀라운"][..],
            ),
        ]
        .into_iter()
        .map(|(family, keywords)| (family.to_string(), strings(keywords)))
        .collect();

        Self {
            command_languages: strings(&[
                "bash",
                "sh",
                "shell",
                "zsh",
                "console",
                "shell-session",
                "powershell",
                "ps1",
                "cmd",
                "bat",
            ]),
            command_patterns,
            path_prefixes: strings(&[
                "src/",
                "lib/",
                "docs?/",
                "tests?/",
                "examples?/",
                "scripts?/",
                "config/",
                "bin/",
                "cmd/",
                "pkg/",
                "app/",
                r"\.github/",
            ]),
            platform_markers,
            marketing_keywords,
            template_phrases: strings(&[
                "getting started",
                "prerequisites",
                "installation",
                "usage",
                "features",
                "roadmap",
                "contributing",
                "license",
                "acknowledgments",
                "table of contents",
                "about the project",
                "built with",
                "contact",
                "show your support",
                "screenshots",
                "authors",
                "faq",
                "demo",
            ]),
            placeholders: strings(&["[project name]", "lorem ipsum", "<!--", "your_username"]),
            action_verbs: strings(&["install", "run", "build", "test", "use", "see", "check", "read"]),
            tech_badge_keywords: strings(&[
                "build",
                "ci.yml",
                "test",
                "coverage",
                "codecov",
                "coveralls",
                "workflow",
                "actions",
                "passing",
                "travis",
                "circleci",
                "pypi",
                "npm",
                "crates",
                "docs.rs",
                "version",
                "release",
                "license",
                "python",
                "rust",
                "dependencies",
                "go report",
            ]),
            promo_badge_keywords: strings(&[
                "stars",
                "downloads",
                "twitter",
                "follow",
                "discord",
                "slack",
                "chat",
                "sponsor",
                "donate",
                "patreon",
                "ko-fi",
                "awesome",
                "made with",
                "love",
                "product hunt",
                "producthunt",
                "hacker news",
                "reddit",
                "trending",
                "visitors",
                "views",
                "telegram",
                "linkedin",
            ]),
            skip_link_hosts: strings(&[
                "localhost",
                "127.0.0.1",
                "0.0.0.0",
                "[::1]",
                "example.com",
                "example.org",
                "example.net",
                "yourdomain.com",
                "your-domain.com",
            ]),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), CredenceError> {
        let consilience = &self.consilience;
        let weights = [
            ("consilience.weight_raw", consilience.weight_raw),
            ("consilience.weight_tech", consilience.weight_tech),
            ("consilience.weight_consilience", consilience.weight_consilience),
        ];
        for (key, weight) in weights {
            if !(0.0..=1.0).contains(&weight) {
                return Err(CredenceError::ConfigParse(format!(
                    "{key} must be between 0.0 and 1.0"
                )));
            }
        }
        let weight_sum: f64 = weights.iter().map(|(_, weight)| weight).sum();
        if (weight_sum - 1.0).abs() > 0.001 {
            return Err(CredenceError::ConfigParse(format!(
                "consilience weights must sum to 1.0 (found {weight_sum:.3})"
            )));
        }
        if !(0.0..=100.0).contains(&consilience.floor) {
            return Err(CredenceError::ConfigParse(
                "consilience.floor must be between 0 and 100".to_string(),
            ));
        }

        let tech = &self.tech;
        for (key, tiers) in [
            ("tech.code_block_tiers", &tech.code_block_tiers),
            ("tech.command_block_tiers", &tech.command_block_tiers),
            ("tech.path_ref_tiers", &tech.path_ref_tiers),
            ("tech.density_tiers", &tech.density_tiers),
        ] {
            if tiers.iter().any(|tier| tier.min < 0.0 || tier.points < 0.0) {
                return Err(CredenceError::ConfigParse(format!(
                    "{key} entries must be non-negative"
                )));
            }
        }

        let marketing = &self.marketing;
        let caps = [
            ("tech.code_block_cap", tech.code_block_cap),
            ("tech.command_block_cap", tech.command_block_cap),
            ("tech.path_ref_cap", tech.path_ref_cap),
            ("tech.platform_flag_cap", tech.platform_flag_cap),
            ("tech.density_cap", tech.density_cap),
            ("tech.total_cap", tech.total_cap),
            ("marketing.density_penalty_cap", marketing.density_penalty_cap),
            ("marketing.bullet_penalty_cap", marketing.bullet_penalty_cap),
            ("marketing.badge_penalty_cap", marketing.badge_penalty_cap),
            ("marketing.template_penalty", marketing.template_penalty),
            ("marketing.penalty_cap", marketing.penalty_cap),
        ];
        if let Some((key, _)) = caps.iter().find(|(_, value)| *value < 0.0) {
            return Err(CredenceError::ConfigParse(format!(
                "{key} must be non-negative"
            )));
        }
        if tech.total_cap > 100.0 {
            return Err(CredenceError::ConfigParse(
                "tech.total_cap cannot exceed 100".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&marketing.template_threshold) {
            return Err(CredenceError::ConfigParse(
                "marketing.template_threshold must be between 0.0 and 1.0".to_string(),
            ));
        }

        let gate = &self.gate;
        if !(0 < gate.active_days
            && gate.active_days < gate.maintained_days
            && gate.maintained_days < gate.stale_days)
        {
            return Err(CredenceError::ConfigParse(format!(
                "gate day thresholds must satisfy 0 < active ({}) < maintained ({}) < stale ({})",
                gate.active_days, gate.maintained_days, gate.stale_days
            )));
        }
        if gate.recent_commit_days <= 0 {
            return Err(CredenceError::ConfigParse(
                "gate.recent_commit_days must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&gate.issue_close_ratio) {
            return Err(CredenceError::ConfigParse(
                "gate.issue_close_ratio must be between 0.0 and 1.0".to_string(),
            ));
        }

        let links = &self.links;
        if links.concurrency == 0 {
            return Err(CredenceError::ConfigParse(
                "links.concurrency must be greater than 0".to_string(),
            ));
        }
        if links.timeout_ms == 0 {
            return Err(CredenceError::ConfigParse(
                "links.timeout_ms must be greater than 0".to_string(),
            ));
        }
        if links.cache_capacity == 0 {
            return Err(CredenceError::ConfigParse(
                "links.cache_capacity must be greater than 0".to_string(),
            ));
        }

        for (name, pattern) in &self.patterns.command_patterns {
            regex::Regex::new(pattern)
                .map_err(|e| CredenceError::InvalidPattern(format!("commands.{name}: {e}")))?;
        }
        for prefix in &self.patterns.path_prefixes {
            regex::Regex::new(prefix)
                .map_err(|e| CredenceError::InvalidPattern(format!("path_prefixes: {e}")))?;
        }

        Ok(())
    }
}
