use crate::config::ConfigSnapshot;
use crate::consilience::{BadgeChecker, CommandChecker, LinkChecker, NoSource, PathChecker, RepoSource};
use crate::scan::links::extract_links;
use crate::scan::markdown;
use crate::scan::marketing::MarketingExtractor;
use crate::scan::tech::TechExtractor;
use crate::types::config::{tier_points, MarketingConfig, TechConfig};
use crate::types::consilience::{CheckResult, LinkCheckResult};
use crate::types::scoring::{ConsilienceBreakdown, DocsEffectiveResult, Score};
use crate::types::signals::{MarketingSignals, TechSignals};
use std::sync::Arc;
use tracing::{debug, info};

/// Blends raw documentation quality, technical evidence and consilience into
/// one bounded score, net of the marketing penalty.
pub struct DocsEffectiveComposer {
    snapshot: Arc<ConfigSnapshot>,
    source: Arc<dyn RepoSource>,
    tech: TechExtractor,
    marketing: MarketingExtractor,
}

impl DocsEffectiveComposer {
    /// Composer with no live collaborator: every reference ends up unchecked.
    pub fn new(snapshot: Arc<ConfigSnapshot>) -> Self {
        let patterns = Arc::clone(&snapshot.patterns);
        Self {
            tech: TechExtractor::new(Arc::clone(&patterns)),
            marketing: MarketingExtractor::new(patterns),
            source: Arc::new(NoSource),
            snapshot,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn RepoSource>) -> Self {
        self.source = source;
        self
    }

    pub fn compute(
        &self,
        owner: &str,
        repo: &str,
        readme: Option<&str>,
        docs_quality_raw: Score,
        skip_consilience: bool,
    ) -> DocsEffectiveResult {
        let config = &self.snapshot.config;
        let text = readme.unwrap_or_default();
        let (tech_signals, marketing_signals) = if text.trim().is_empty() {
            (TechSignals::default(), MarketingSignals::default())
        } else {
            let doc = markdown::parse(text);
            let tech = self.tech.extract_parsed(text, &doc);
            let marketing = self.marketing.extract_parsed(text, &doc, tech.token_count);
            (tech, marketing)
        };

        let tech = tech_score(&tech_signals, &config.tech);
        let penalty = marketing_penalty(&marketing_signals, &config.marketing);

        let consilience = if skip_consilience {
            debug!(owner, repo, "consilience skipped");
            ConsilienceBreakdown::default()
        } else {
            self.run_checkers(owner, repo, &tech_signals, &marketing_signals)
        };
        let consilience_score = if skip_consilience {
            100.0
        } else {
            consilience_score(&consilience, config.consilience.floor)
        };

        let raw = sanitize(docs_quality_raw);
        let weights = &config.consilience;
        let blended = raw * weights.weight_raw
            + tech * weights.weight_tech
            + consilience_score * weights.weight_consilience
            - penalty;
        let docs_effective = sanitize(blended.round());

        let has_broken_refs = [&consilience.path, &consilience.badge, &consilience.command]
            .iter()
            .any(|result| result.broken > 0);
        let is_marketing_heavy =
            marketing_signals.marketing_density > config.marketing.heavy_density_threshold;

        info!(
            owner,
            repo,
            docs_effective,
            tech_score = tech,
            marketing_penalty = penalty,
            consilience_score,
            "docs effectiveness computed"
        );

        DocsEffectiveResult {
            docs_quality_raw: raw,
            tech_score: tech,
            marketing_penalty: penalty,
            consilience_score,
            docs_effective,
            tech_signals,
            marketing_signals,
            consilience,
            is_marketing_heavy,
            has_broken_refs,
        }
    }

    /// `compute` plus a reachability check of the README's external links.
    /// The link result is reported alongside and never moves `docs_effective`.
    pub async fn compute_with_links(
        &self,
        owner: &str,
        repo: &str,
        readme: Option<&str>,
        docs_quality_raw: Score,
        skip_consilience: bool,
        links: &LinkChecker,
    ) -> (DocsEffectiveResult, LinkCheckResult) {
        let result = self.compute(owner, repo, readme, docs_quality_raw, skip_consilience);
        let text = readme.unwrap_or_default();
        if skip_consilience || text.trim().is_empty() {
            return (result, CheckResult::default());
        }
        let urls = extract_links(text, &self.snapshot.patterns);
        let link_result = links.check(owner, repo, &urls).await;
        (result, link_result)
    }

    fn run_checkers(
        &self,
        owner: &str,
        repo: &str,
        tech: &TechSignals,
        marketing: &MarketingSignals,
    ) -> ConsilienceBreakdown {
        let source = self.source.as_ref();
        ConsilienceBreakdown {
            path: PathChecker.check(owner, repo, &tech.path_refs, source),
            badge: BadgeChecker.check(owner, repo, &marketing.badge_urls, source),
            command: CommandChecker.check(owner, repo, &tech.command_categories(), source),
        }
    }
}

/// Five independently capped tiers, total capped.
pub fn tech_score(signals: &TechSignals, config: &TechConfig) -> Score {
    let code = tier_points(&config.code_block_tiers, f64::from(signals.total_code_blocks()))
        .min(config.code_block_cap);
    let commands = tier_points(&config.command_block_tiers, f64::from(signals.command_block_count))
        .min(config.command_block_cap);
    let paths = tier_points(&config.path_ref_tiers, signals.path_refs.len() as f64)
        .min(config.path_ref_cap);
    let platforms = (f64::from(signals.platform_flags_true()) * config.platform_flag_points)
        .min(config.platform_flag_cap);
    let density = tier_points(&config.density_tiers, signals.tech_density).min(config.density_cap);

    (code + commands + paths + platforms + density)
        .min(config.total_cap)
        .clamp(0.0, 100.0)
}

/// Four independently capped sub-penalties, total capped.
pub fn marketing_penalty(signals: &MarketingSignals, config: &MarketingConfig) -> Score {
    let density = ((signals.marketing_density - config.density_threshold).max(0.0)
        * config.density_penalty_per_unit)
        .min(config.density_penalty_cap);
    let bullets = (f64::from(signals.unlinked_feature_bullets.saturating_sub(config.bullet_allowance))
        * config.bullet_penalty_per)
        .min(config.bullet_penalty_cap);
    let badges = (f64::from(signals.badge_counts.promo.saturating_sub(config.promo_badge_allowance))
        * config.promo_badge_penalty_per)
        .min(config.badge_penalty_cap);
    let template = if signals.template_similarity >= config.template_threshold {
        config.template_penalty
    } else {
        0.0
    };

    (density + bullets + badges + template)
        .min(config.penalty_cap)
        .max(0.0)
}

/// `round(100 × valid / checked)`, 100 when nothing was checkable, never below `floor`.
pub fn consilience_score(breakdown: &ConsilienceBreakdown, floor: f64) -> Score {
    let results = [&breakdown.path, &breakdown.badge, &breakdown.command];
    let valid: u32 = results.iter().map(|result| result.valid).sum();
    let checked: u32 = results.iter().map(|result| result.checked()).sum();
    let score = if checked == 0 {
        100.0
    } else {
        (100.0 * f64::from(valid) / f64::from(checked)).round()
    };
    score.max(floor).clamp(0.0, 100.0)
}

/// Clamp to [0, 100]; NaN collapses to 0.
fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
