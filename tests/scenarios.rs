// Library-level scenarios for the docs composer and the sustainability gate.

use chrono::{DateTime, Duration, TimeZone, Utc};
use credence::consilience::{NoSource, PathChecker};
use credence::scan::{MarketingExtractor, TechExtractor};
use credence::types::config::GateConfig;
use credence::types::consilience::CheckStatus;
use credence::types::scoring::GateLevel;
use credence::types::snapshot::{ActivityData, ActivityDate, CommitActivity, RepoSnapshot, TreeEntry};
use credence::{ConfigSnapshot, DocsEffectiveComposer, SustainabilityGate};
use std::sync::Arc;

const SCENARIO_A: &str = r#"# fastcsv

Parse CSV files from Python. The build is configured in `pyproject.toml`.

```bash
pip install fastcsv
```

```bash
python -m fastcsv data.csv
```

```bash
python -m fastcsv --stats data.csv
```

```python
import fastcsv
rows = fastcsv.read("data.csv")
```

```python
for row in rows:
    print(row)
```

```python
writer = fastcsv.Writer("out.csv")
```

```python
writer.write(["a", "b"])
```

```python
writer.close()
```
"#;

const SCENARIO_B: &str = r#"# [Project Name]

![stars](https://img.shields.io/github/stars/acme/tool)
![downloads](https://img.shields.io/pypi/dm/tool)
![twitter](https://img.shields.io/twitter/follow/acme)
![discord](https://img.shields.io/discord/123?label=chat)
![sponsor](https://img.shields.io/badge/sponsor-acme-pink)
![awesome](https://img.shields.io/badge/awesome-list-purple)
![made with love](https://img.shields.io/badge/made%20with-love-red)
![visitors](https://img.shields.io/badge/visitors-1k-blue)
![build](https://img.shields.io/badge/build-passing-green)
![license](https://img.shields.io/badge/license-MIT-blue)

## Table of Contents
## About The Project
## Built With
## Getting Started
## Prerequisites
## Installation
## Usage
## Features

- Fast
- Reliable
- Modern
- Scalable
- Secure
- Elegant API
- Zero config
- Cross platform
- Tiny footprint
- Friendly community
- Great docs
- Plugin system

## Roadmap
## Contributing
## License
## Contact
## Acknowledgments
"#;

fn snapshot() -> Arc<ConfigSnapshot> {
    Arc::new(ConfigSnapshot::defaults().expect("default configuration should be valid"))
}

fn composer() -> DocsEffectiveComposer {
    DocsEffectiveComposer::new(snapshot())
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0)
        .single()
        .expect("fixed timestamp should be valid")
}

fn activity(days_ago: i64, commits: u32, authors: u32) -> ActivityData {
    ActivityData {
        commit: CommitActivity {
            last_commit_date: Some(ActivityDate::from(now() - Duration::days(days_ago))),
            total_commits: commits,
            unique_authors: authors,
        },
        ..ActivityData::default()
    }
}

#[test]
fn scenario_a_technical_readme_scores_high_without_penalty() {
    let result = composer().compute("acme", "fastcsv", Some(SCENARIO_A), 60.0, true);
    assert_eq!(result.tech_signals.total_code_blocks(), 8);
    assert!(result.tech_signals.platform_flags["pyproject"]);
    assert!(result.tech_score >= 80.0, "tech score was {}", result.tech_score);
    assert_eq!(result.marketing_penalty, 0.0);
    assert!(!result.is_marketing_heavy);
}

#[test]
fn scenario_b_promotional_readme_hits_penalty_cap() {
    let result = composer().compute("acme", "tool", Some(SCENARIO_B), 60.0, true);
    let marketing = &result.marketing_signals;
    assert_eq!(marketing.badge_counts.promo, 8);
    assert_eq!(marketing.badge_counts.tech, 2);
    assert_eq!(marketing.unlinked_feature_bullets, 12);
    assert!(marketing.template_similarity >= 0.7);
    assert_eq!(result.marketing_penalty, 30.0);
}

#[test]
fn scenario_c_recent_diverse_activity_is_active() {
    let gate = SustainabilityGate::new(GateConfig::default());
    let result = gate.check_at(&activity(5, 100, 10), None, now());
    assert_eq!(result.gate_level, GateLevel::Active);
    assert!(result.is_sustainable);
    assert!(result.sustainability_score >= 85.0);
}

#[test]
fn scenario_d_old_activity_is_abandoned() {
    let gate = SustainabilityGate::new(GateConfig::default());
    let result = gate.check_at(&activity(400, 100, 10), None, now());
    assert_eq!(result.gate_level, GateLevel::Abandoned);
    assert!(!result.is_sustainable);
}

#[test]
fn scenario_e_nothing_checkable_keeps_full_consilience() {
    let readme = "# Tool\n\nSee `src/main.rs` and `docs/guide.md`.\n\n```bash\nmake install\n```\n";
    let unreachable = composer().compute("o", "r", Some(readme), 60.0, false);
    assert!(unreachable.consilience.path.total > 0);
    assert_eq!(unreachable.consilience.path.checked(), 0);
    assert_eq!(unreachable.consilience_score, 100.0);

    let no_claims = composer().compute("o", "r", Some("# Tool\n\nA small utility.\n"), 60.0, false);
    assert_eq!(no_claims.consilience_score, 100.0);
    assert!(!no_claims.has_broken_refs);
}

#[test]
fn scores_stay_within_bounds_for_varied_inputs() {
    let config = snapshot();
    let floor = config.config.consilience.floor;
    let cap = config.config.marketing.penalty_cap;
    let broken_tree = RepoSnapshot {
        tree: Some(vec![TreeEntry::blob("README.md")]),
        ..RepoSnapshot::default()
    };
    let composer = DocsEffectiveComposer::new(Arc::clone(&config)).with_source(Arc::new(broken_tree));

    for readme in [None, Some(""), Some(SCENARIO_A), Some(SCENARIO_B), Some("`src/a.rs` `src/b.rs` `lib/c.rs`")] {
        for raw in [-1_000.0, 0.0, 55.5, 100.0, 1_000.0] {
            let result = composer.compute("o", "r", readme, raw, false);
            assert!((0.0..=100.0).contains(&result.docs_effective));
            assert!((0.0..=100.0).contains(&result.tech_score));
            assert!((0.0..=cap).contains(&result.marketing_penalty));
            assert!((floor..=100.0).contains(&result.consilience_score));
            for check in [&result.consilience.path, &result.consilience.badge, &result.consilience.command] {
                assert_eq!(check.valid + check.broken + check.unchecked, check.total);
            }
        }
    }
}

#[test]
fn repeated_computation_is_identical() {
    let composer = composer();
    let first = composer.compute("o", "r", Some(SCENARIO_B), 42.0, false);
    let second = composer.compute("o", "r", Some(SCENARIO_B), 42.0, false);
    assert_eq!(first, second);
}

#[test]
fn empty_readme_yields_zeroed_signals() {
    let patterns = Arc::clone(&snapshot().patterns);
    let tech = TechExtractor::new(Arc::clone(&patterns)).extract(None);
    let marketing = MarketingExtractor::new(patterns).extract(Some(""), 0);
    assert_eq!(tech.tech_signal_count, 0);
    assert_eq!(tech.tech_density, 0.0);
    assert!(tech.path_refs.is_empty());
    assert_eq!(marketing.marketing_keyword_total, 0);
    assert_eq!(marketing.badge_counts.total, 0);
}

#[test]
fn unreachable_tree_leaves_every_path_unchecked() {
    let references = vec!["src/main.rs".to_string(), "docs/".to_string()];
    let result = PathChecker.check("o", "r", &references, &NoSource);
    assert_eq!(result.valid, 0);
    assert_eq!(result.broken, 0);
    assert!(result
        .details
        .iter()
        .all(|detail| detail.status == CheckStatus::Unchecked));
}
