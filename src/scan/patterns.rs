use crate::error::{CredenceError, Result};
use crate::types::config::PatternConfig;
use regex::Regex;
use std::collections::HashSet;

const PATH_TAIL: &str = r"[\w.\-/]*";
const IMAGE_LINK: &str = r"!\[([^\]]*)\]\(\s*<?([^)\s>]+)>?(?:\s+[^)]*)?\)";
const MARKDOWN_LINK: &str = r"\[([^\]]*)\]\(\s*<?([^)\s>]+)>?(?:\s+[^)]*)?\)";
const BARE_URL: &str = r#"https?://[^\s<>()\[\]"'`]+"#;

/// Every regex and keyword list the extractors need, compiled once per
/// configuration snapshot.
#[derive(Debug, Clone)]
pub struct PatternSet {
    pub command_languages: HashSet<String>,
    pub command_patterns: Vec<(String, Regex)>,
    pub path_prefix: Option<Regex>,
    pub platform_markers: Vec<(String, Vec<String>)>,
    pub marketing_keywords: Vec<(String, Vec<String>)>,
    pub template_phrases: Vec<String>,
    pub placeholders: Vec<String>,
    pub action_verbs: Vec<String>,
    pub tech_badge_keywords: Vec<String>,
    pub promo_badge_keywords: Vec<String>,
    pub skip_link_hosts: Vec<String>,
    pub image_link: Regex,
    pub markdown_link: Regex,
    pub bare_url: Regex,
}

impl PatternSet {
    pub fn compile(config: &PatternConfig) -> Result<Self> {
        let command_patterns = config
            .command_patterns
            .iter()
            .map(|(name, pattern)| Ok((name.clone(), compile_regex(&format!("commands.{name}"), pattern)?)))
            .collect::<Result<Vec<_>>>()?;

        let path_prefix = if config.path_prefixes.is_empty() {
            None
        } else {
            // The leading group stands in for a word boundary that also
            // rejects prefixes embedded in URLs or longer paths.
            let alternation = config.path_prefixes.join("|");
            let pattern = format!(r"(?:^|[^\w./\-])((?:{alternation}){PATH_TAIL})");
            Some(compile_regex("path_prefixes", &pattern)?)
        };

        Ok(Self {
            command_languages: lowercase(&config.command_languages).into_iter().collect(),
            command_patterns,
            path_prefix,
            platform_markers: config
                .platform_markers
                .iter()
                .map(|(name, markers)| (name.clone(), lowercase(markers)))
                .collect(),
            marketing_keywords: config
                .marketing_keywords
                .iter()
                .map(|(family, keywords)| (family.clone(), lowercase(keywords)))
                .collect(),
            template_phrases: lowercase(&config.template_phrases),
            placeholders: lowercase(&config.placeholders),
            action_verbs: lowercase(&config.action_verbs),
            tech_badge_keywords: lowercase(&config.tech_badge_keywords),
            promo_badge_keywords: lowercase(&config.promo_badge_keywords),
            skip_link_hosts: lowercase(&config.skip_link_hosts),
            image_link: compile_regex("image_link", IMAGE_LINK)?,
            markdown_link: compile_regex("markdown_link", MARKDOWN_LINK)?,
            bare_url: compile_regex("bare_url", BARE_URL)?,
        })
    }
}

fn compile_regex(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| CredenceError::InvalidPattern(format!("{name}: {e}")))
}

fn lowercase(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Non-overlapping occurrences of `needle` in an already-lowercased haystack.
pub fn count_occurrences(haystack: &str, needle: &str) -> u32 {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patterns_compile() {
        let patterns = PatternSet::compile(&PatternConfig::default()).expect("defaults should compile");
        assert!(patterns.command_languages.contains("bash"));
        assert!(patterns.path_prefix.is_some());
        assert!(patterns
            .command_patterns
            .iter()
            .any(|(name, _)| name == "pip"));
    }

    #[test]
    fn invalid_command_pattern_is_reported_by_name() {
        let mut config = PatternConfig::default();
        config
            .command_patterns
            .insert("broken".to_string(), "pip (install".to_string());
        let err = PatternSet::compile(&config).expect_err("invalid regex should fail");
        assert!(matches!(err, CredenceError::InvalidPattern(ref msg) if msg.contains("commands.broken")));
    }

    #[test]
    fn path_prefix_skips_urls() {
        let patterns = PatternSet::compile(&PatternConfig::default()).expect("defaults should compile");
        let regex = patterns.path_prefix.expect("path regex");
        let found: Vec<&str> = regex
            .captures_iter("see src/lib.rs and https://host.io/src/x")
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["src/lib.rs"]);
    }

    #[test]
    fn count_occurrences_is_non_overlapping() {
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
        assert_eq!(count_occurrences("seamless and seamless", "seamless"), 2);
        assert_eq!(count_occurrences("text", ""), 0);
    }
}
