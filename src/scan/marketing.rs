use super::markdown::{self, MarkdownDoc};
use super::patterns::{count_occurrences, PatternSet};
use crate::types::signals::{BadgeCounts, MarketingSignals};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const PLACEHOLDER_BONUS: f64 = 0.1;
const BADGE_URL_MARKERS: [&str; 8] = [
    "shields.io",
    "badge",
    "badgen.net",
    "/workflows/",
    "codecov.io",
    "coveralls.io",
    "travis-ci",
    "circleci.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    Tech,
    Promo,
    Unclassified,
}

#[derive(Debug, Clone)]
pub struct MarketingExtractor {
    patterns: Arc<PatternSet>,
}

impl MarketingExtractor {
    pub fn new(patterns: Arc<PatternSet>) -> Self {
        Self { patterns }
    }

    /// `token_count == 0` means "not supplied": tokens are counted here.
    pub fn extract(&self, readme: Option<&str>, token_count: usize) -> MarketingSignals {
        let text = readme.unwrap_or_default();
        if text.trim().is_empty() {
            return MarketingSignals::default();
        }
        let doc = markdown::parse(text);
        self.extract_parsed(text, &doc, token_count)
    }

    pub(crate) fn extract_parsed(
        &self,
        text: &str,
        doc: &MarkdownDoc,
        token_count: usize,
    ) -> MarketingSignals {
        let tokens = if token_count == 0 {
            markdown::token_count(text)
        } else {
            token_count
        };
        let lowered = text.to_lowercase();

        let marketing_keywords: BTreeMap<String, u32> = self
            .patterns
            .marketing_keywords
            .iter()
            .map(|(family, keywords)| {
                let hits = keywords
                    .iter()
                    .map(|keyword| count_occurrences(&lowered, keyword))
                    .sum();
                (family.clone(), hits)
            })
            .collect();
        let marketing_keyword_total: u32 = marketing_keywords.values().sum();
        let marketing_density = markdown::per_thousand(f64::from(marketing_keyword_total), tokens);

        let (unlinked_feature_bullets, total_bullets) = self.bullet_counts(&doc.prose);
        let (badge_counts, badge_urls) = self.badges(&doc.prose);
        let classified = badge_counts.tech + badge_counts.promo;
        let promo_badge_ratio = if classified == 0 {
            0.0
        } else {
            f64::from(badge_counts.promo) / f64::from(classified)
        };
        let template_similarity = self.template_similarity(&lowered);

        let marketing_signal_count = 2.0 * f64::from(marketing_keyword_total)
            + f64::from(unlinked_feature_bullets)
            + 3.0 * f64::from(badge_counts.promo)
            + 10.0 * template_similarity;

        debug!(
            keywords = marketing_keyword_total,
            unlinked_bullets = unlinked_feature_bullets,
            promo_badges = badge_counts.promo,
            template_similarity,
            "extracted marketing signals"
        );

        MarketingSignals {
            marketing_keywords,
            marketing_keyword_total,
            marketing_density,
            unlinked_feature_bullets,
            total_bullets,
            badge_counts,
            badge_urls,
            promo_badge_ratio,
            template_similarity,
            marketing_signal_count,
        }
    }

    fn bullet_counts(&self, prose: &str) -> (u32, u32) {
        let mut unlinked = 0;
        let mut total = 0;
        for line in prose.lines() {
            let Some(content) = bullet_content(line) else {
                continue;
            };
            total += 1;
            if !self.references_code(content) && !self.starts_with_action(content) {
                unlinked += 1;
            }
        }
        (unlinked, total)
    }

    fn references_code(&self, content: &str) -> bool {
        !markdown::inline_code_spans(content).is_empty()
            || content.contains("```")
            || self.patterns.markdown_link.is_match(content)
            || self.patterns.bare_url.is_match(content)
    }

    fn starts_with_action(&self, content: &str) -> bool {
        let first_word = content
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .split(|c: char| !c.is_alphanumeric())
            .next()
            .unwrap_or_default()
            .to_lowercase();
        !first_word.is_empty()
            && self
                .patterns
                .action_verbs
                .iter()
                .any(|verb| is_verb_form(&first_word, verb))
    }

    fn badges(&self, prose: &str) -> (BadgeCounts, Vec<String>) {
        let mut counts = BadgeCounts::default();
        let mut urls = Vec::new();
        for caps in self.patterns.image_link.captures_iter(prose) {
            let (Some(whole), Some(url)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let alt = caps.get(1).map_or("", |m| m.as_str());
            let link_wrapped = prose[..whole.start()].ends_with('[');
            let lowered_url = url.as_str().to_lowercase();
            let badge_like = BADGE_URL_MARKERS
                .iter()
                .any(|marker| lowered_url.contains(marker));
            if !link_wrapped && !badge_like {
                continue;
            }

            counts.total += 1;
            match self.classify_badge(alt, url.as_str()) {
                BadgeKind::Tech => counts.tech += 1,
                BadgeKind::Promo => counts.promo += 1,
                BadgeKind::Unclassified => {}
            }
            urls.push(url.as_str().to_string());
        }
        (counts, urls)
    }

    /// Promotional keywords win over technical ones.
    pub fn classify_badge(&self, alt: &str, url: &str) -> BadgeKind {
        let combined = format!("{alt} {url}").to_lowercase();
        if self
            .patterns
            .promo_badge_keywords
            .iter()
            .any(|keyword| combined.contains(keyword.as_str()))
        {
            BadgeKind::Promo
        } else if self
            .patterns
            .tech_badge_keywords
            .iter()
            .any(|keyword| combined.contains(keyword.as_str()))
        {
            BadgeKind::Tech
        } else {
            BadgeKind::Unclassified
        }
    }

    fn template_similarity(&self, lowered: &str) -> f64 {
        let phrases = &self.patterns.template_phrases;
        let base = if phrases.is_empty() {
            0.0
        } else {
            let present = phrases
                .iter()
                .filter(|phrase| lowered.contains(phrase.as_str()))
                .count();
            present as f64 / phrases.len() as f64
        };
        let placeholders = self
            .patterns
            .placeholders
            .iter()
            .filter(|placeholder| lowered.contains(placeholder.as_str()))
            .count();
        (base + PLACEHOLDER_BONUS * placeholders as f64).clamp(0.0, 1.0)
    }
}

/// `word` is `verb` or one of its regular inflections (`runs`, `running`,
/// `used`, `checking`). Words that merely begin with the verb do not count.
fn is_verb_form(word: &str, verb: &str) -> bool {
    if verb.is_empty() {
        return false;
    }
    if word == verb {
        return true;
    }
    if let Some(rest) = word.strip_prefix(verb) {
        if matches!(rest, "s" | "es" | "ing" | "ed") {
            return true;
        }
        if rest == "d" && verb.ends_with('e') && !verb.ends_with("ee") {
            return true;
        }
        let mut chars = rest.chars();
        let doubled = verb.chars().last().is_some_and(|last| chars.next() == Some(last));
        if doubled && matches!(chars.as_str(), "ing" | "ed") {
            return true;
        }
    }
    verb.strip_suffix('e')
        .filter(|stem| !stem.ends_with('e'))
        .is_some_and(|stem| word.strip_prefix(stem) == Some("ing"))
}

fn bullet_content(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();
    let marker = chars.next()?;
    if !matches!(marker, '-' | '*' | '+') {
        return None;
    }
    let rest = chars.as_str();
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let content = rest.trim();
    // Thematic breaks such as `- - -` or `* * *`.
    if content.is_empty() || content.chars().all(|c| matches!(c, '-' | '*' | '_' | ' ')) {
        return None;
    }
    Some(content)
}
