#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// Lowercased first word of the info string, `unknown` when absent.
    pub language: String,
    pub content: String,
}

/// README split into closed fenced blocks and the prose around them.
#[derive(Debug, Clone, Default)]
pub struct MarkdownDoc {
    pub blocks: Vec<FencedBlock>,
    pub prose: String,
}

struct OpenFence {
    marker: char,
    width: usize,
    language: String,
    opening_line: String,
    lines: Vec<String>,
}

pub fn parse(text: &str) -> MarkdownDoc {
    let mut doc = MarkdownDoc::default();
    let mut open: Option<OpenFence> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        match open.as_mut() {
            Some(fence) => {
                if is_closing_fence(trimmed, fence.marker, fence.width) {
                    if let Some(fence) = open.take() {
                        doc.blocks.push(FencedBlock {
                            language: fence.language,
                            content: fence.lines.join("\n"),
                        });
                    }
                } else {
                    fence.lines.push(line.to_string());
                }
            }
            None => match opening_fence(trimmed) {
                Some((marker, width, language)) => {
                    open = Some(OpenFence {
                        marker,
                        width,
                        language,
                        opening_line: line.to_string(),
                        lines: Vec::new(),
                    });
                }
                None => {
                    doc.prose.push_str(line);
                    doc.prose.push('\n');
                }
            },
        }
    }

    // An unterminated fence is not a block; its lines stay prose.
    if let Some(fence) = open {
        doc.prose.push_str(&fence.opening_line);
        doc.prose.push('\n');
        for line in fence.lines {
            doc.prose.push_str(&line);
            doc.prose.push('\n');
        }
    }

    doc
}

fn opening_fence(trimmed: &str) -> Option<(char, usize, String)> {
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let width = trimmed.chars().take_while(|c| *c == marker).count();
    if width < 3 {
        return None;
    }
    let info = trimmed[width..].trim();
    if marker == '`' && info.contains('`') {
        return None;
    }
    let language = info
        .split_whitespace()
        .next()
        .map(|word| word.trim_matches(|c| c == '{' || c == '}' || c == '.'))
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "unknown".to_string());
    Some((marker, width, language))
}

fn is_closing_fence(trimmed: &str, marker: char, width: usize) -> bool {
    let run = trimmed.chars().take_while(|c| *c == marker).count();
    run >= width && trimmed[run * marker.len_utf8()..].trim().is_empty()
}

/// Contents of single-backtick spans; spans never cross a line.
pub fn inline_code_spans(prose: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    for line in prose.lines() {
        let segments: Vec<&str> = line.split('`').collect();
        for index in (1..segments.len().saturating_sub(1)).step_by(2) {
            if !segments[index].is_empty() {
                spans.push(segments[index]);
            }
        }
    }
    spans
}

pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Signals per 1,000 tokens; zero when there are no tokens.
pub fn per_thousand(count: f64, tokens: usize) -> f64 {
    if tokens == 0 {
        0.0
    } else {
        count / (tokens as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_separates_blocks_from_prose() {
        let doc = parse("# Title\n```Python\nprint(1)\n```\ntext `a/b`\n~~~\nraw\n~~~\n");
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].language, "python");
        assert_eq!(doc.blocks[0].content, "print(1)");
        assert_eq!(doc.blocks[1].language, "unknown");
        assert!(doc.prose.contains("text `a/b`"));
        assert!(!doc.prose.contains("print(1)"));
    }

    #[test]
    fn unterminated_fence_stays_prose() {
        let doc = parse("intro\n```bash\nmake install\n");
        assert!(doc.blocks.is_empty());
        assert!(doc.prose.contains("make install"));
    }

    #[test]
    fn longer_fence_needs_matching_close() {
        let doc = parse("````md\n```rust\nfn main() {}\n```\n````\n");
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].language, "md");
        assert!(doc.blocks[0].content.contains("```rust"));
    }

    #[test]
    fn inline_spans_ignore_unterminated_backticks() {
        let spans = inline_code_spans("run `make` then `./bin/app`\ndangling `oops\n");
        assert_eq!(spans, vec!["make", "./bin/app"]);
    }

    #[test]
    fn per_thousand_is_zero_without_tokens() {
        assert_eq!(per_thousand(12.0, 0), 0.0);
        assert_eq!(per_thousand(3.0, 500), 6.0);
    }
}
