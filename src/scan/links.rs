use super::markdown;
use super::patterns::PatternSet;
use std::collections::HashSet;

/// External `http(s)` links in README prose, first-seen order, images excluded.
pub fn extract_links(readme: &str, patterns: &PatternSet) -> Vec<String> {
    let doc = markdown::parse(readme);
    let prose = doc.prose.as_str();

    let images: HashSet<&str> = patterns
        .image_link
        .captures_iter(prose)
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str())
        .collect();

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut push = |candidate: &str| {
        let url = candidate.trim_end_matches(['.', ',', ';', ':', '!', '?']);
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return;
        }
        if images.contains(url) {
            return;
        }
        if seen.insert(url.to_string()) {
            links.push(url.to_string());
        }
    };

    for caps in patterns.markdown_link.captures_iter(prose) {
        if let Some(target) = caps.get(2) {
            push(target.as_str());
        }
    }
    for found in patterns.bare_url.find_iter(prose) {
        push(found.as_str());
    }
    links
}
