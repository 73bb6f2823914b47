use super::markdown::{self, MarkdownDoc};
use super::patterns::PatternSet;
use crate::types::signals::TechSignals;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

pub const MAX_PATH_REFS: usize = 50;

#[derive(Debug, Clone)]
pub struct TechExtractor {
    patterns: Arc<PatternSet>,
}

impl TechExtractor {
    pub fn new(patterns: Arc<PatternSet>) -> Self {
        Self { patterns }
    }

    /// Never fails: `None` or blank text yields zeroed signals.
    pub fn extract(&self, readme: Option<&str>) -> TechSignals {
        let text = readme.unwrap_or_default();
        if text.trim().is_empty() {
            return TechSignals::default();
        }
        let doc = markdown::parse(text);
        self.extract_parsed(text, &doc)
    }

    pub(crate) fn extract_parsed(&self, text: &str, doc: &MarkdownDoc) -> TechSignals {
        let token_count = markdown::token_count(text);

        let mut code_blocks = BTreeMap::<String, u32>::new();
        let mut command_blocks = BTreeMap::<String, u32>::new();
        for block in &doc.blocks {
            *code_blocks.entry(block.language.clone()).or_default() += 1;
            if self.patterns.command_languages.contains(&block.language) {
                *command_blocks.entry(block.language.clone()).or_default() += 1;
            }
            for (name, pattern) in &self.patterns.command_patterns {
                if pattern.is_match(&block.content) {
                    *command_blocks.entry(name.clone()).or_default() += 1;
                }
            }
        }
        let command_block_count = command_blocks.values().sum();

        let path_refs = self.path_refs(text, &doc.prose);

        let lowered = text.to_lowercase();
        let platform_flags: BTreeMap<String, bool> = self
            .patterns
            .platform_markers
            .iter()
            .map(|(name, markers)| {
                let present = markers.iter().any(|marker| lowered.contains(marker.as_str()));
                (name.clone(), present)
            })
            .collect();

        let total_blocks: u32 = code_blocks.values().sum();
        let flags_true = platform_flags.values().filter(|flag| **flag).count() as u32;
        let tech_signal_count =
            total_blocks + 2 * command_block_count + path_refs.len() as u32 + 3 * flags_true;
        let tech_density = markdown::per_thousand(f64::from(tech_signal_count), token_count);

        debug!(
            blocks = total_blocks,
            command_blocks = command_block_count,
            path_refs = path_refs.len(),
            platform_flags = flags_true,
            tokens = token_count,
            "extracted tech signals"
        );

        TechSignals {
            code_blocks,
            command_blocks,
            command_block_count,
            path_refs,
            platform_flags,
            tech_signal_count,
            token_count,
            tech_density,
        }
    }

    fn path_refs(&self, text: &str, prose: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut refs = Vec::new();
        let mut push = |candidate: &str| {
            let cleaned = candidate.trim_end_matches(['.', ',', ';', ':', ')']);
            if cleaned.is_empty() || refs.len() >= MAX_PATH_REFS {
                return;
            }
            if seen.insert(cleaned.to_string()) {
                refs.push(cleaned.to_string());
            }
        };

        if let Some(prefix) = &self.patterns.path_prefix {
            for caps in prefix.captures_iter(text) {
                if let Some(found) = caps.get(1) {
                    push(found.as_str());
                }
            }
        }
        for span in markdown::inline_code_spans(prose) {
            let span = span.trim();
            if looks_like_path(span) {
                push(span);
            }
        }
        refs
    }
}

/// Leading `./`, a slash, or a file extension, with no whitespace and no URL scheme.
pub fn looks_like_path(span: &str) -> bool {
    if span.is_empty() || span.chars().any(char::is_whitespace) {
        return false;
    }
    if span.contains("://") || span.starts_with('-') || span.starts_with('@') {
        return false;
    }
    if span.starts_with("./") || span.contains('/') {
        return true;
    }
    match span.rsplit_once('.') {
        Some((stem, extension)) => {
            !stem.is_empty()
                && (1..=8).contains(&extension.len())
                && extension.chars().all(|c| c.is_ascii_alphanumeric())
                && extension.chars().any(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::PatternConfig;

    fn extractor() -> TechExtractor {
        let patterns = PatternSet::compile(&PatternConfig::default()).expect("defaults should compile");
        TechExtractor::new(Arc::new(patterns))
    }

    #[test]
    fn empty_and_missing_readme_yield_zeroed_signals() {
        let extractor = extractor();
        assert_eq!(extractor.extract(None), TechSignals::default());
        let blank = extractor.extract(Some("   \n\t"));
        assert_eq!(blank.tech_signal_count, 0);
        assert_eq!(blank.tech_density, 0.0);
        assert!(blank.platform_flags.is_empty());
    }

    #[test]
    fn counts_blocks_by_language_and_command_category() {
        let readme = "\
# Demo

```python
import demo
```

```bash
pip install demo
```

```
docker run demo/image
```
";
        let signals = extractor().extract(Some(readme));
        assert_eq!(signals.code_blocks.get("python"), Some(&1));
        assert_eq!(signals.code_blocks.get("bash"), Some(&1));
        assert_eq!(signals.code_blocks.get("unknown"), Some(&1));
        assert_eq!(signals.command_blocks.get("bash"), Some(&1));
        assert_eq!(signals.command_blocks.get("pip"), Some(&1));
        assert_eq!(signals.command_blocks.get("docker"), Some(&1));
        assert_eq!(signals.command_block_count, 3);
    }

    #[test]
    fn harvests_prefix_and_inline_paths_without_duplicates() {
        let readme = "Code lives in src/engine/ and `src/engine/`.\n\
                      Edit `config.yaml` or `./run.sh`, not `make build`.\n\
                      Version `1.0` is not a path.";
        let signals = extractor().extract(Some(readme));
        assert_eq!(
            signals.path_refs,
            vec!["src/engine/", "config.yaml", "./run.sh"]
        );
    }

    #[test]
    fn path_refs_are_capped() {
        let readme = (0..80)
            .map(|i| format!("`dir{i}/file.rs`"))
            .collect::<Vec<_>>()
            .join("\n");
        let signals = extractor().extract(Some(&readme));
        assert_eq!(signals.path_refs.len(), MAX_PATH_REFS);
        assert_eq!(signals.path_refs[0], "dir0/file.rs");
    }

    #[test]
    fn platform_flags_match_case_insensitively() {
        let signals = extractor().extract(Some("Build with the DOCKERFILE and Cargo.toml."));
        assert_eq!(signals.platform_flags.get("dockerfile"), Some(&true));
        assert_eq!(signals.platform_flags.get("cargo"), Some(&true));
        assert_eq!(signals.platform_flags.get("go_mod"), Some(&false));
    }

    #[test]
    fn weighted_count_and_density_follow_formula() {
        let readme = "```bash\nmake\n```\nSee `docs/guide.md` and go.mod";
        let signals = extractor().extract(Some(readme));
        // 1 block + 2 * (bash + make) + 1 path + 3 * go_mod
        assert_eq!(signals.command_block_count, 2);
        assert_eq!(signals.tech_signal_count, 1 + 4 + 1 + 3);
        let expected = f64::from(signals.tech_signal_count) / (signals.token_count as f64 / 1000.0);
        assert!((signals.tech_density - expected).abs() < 1e-9);
    }

    #[test]
    fn extraction_is_idempotent() {
        let extractor = extractor();
        let readme = "```sh\nnpm install\n```\n`lib/index.js`";
        assert_eq!(extractor.extract(Some(readme)), extractor.extract(Some(readme)));
    }

    #[test]
    fn looks_like_path_rules() {
        assert!(looks_like_path("./configure"));
        assert!(looks_like_path("a/b"));
        assert!(looks_like_path("setup.py"));
        assert!(!looks_like_path("https://x.io/a"));
        assert!(!looks_like_path("make build"));
        assert!(!looks_like_path("1.0"));
        assert!(!looks_like_path("--flag"));
        assert!(!looks_like_path(".env"));
    }
}
