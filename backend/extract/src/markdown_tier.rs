//! Heading-based fallback for replies written as markdown sections.

use bugscope_core::{AnalysisResult, FieldAliases, HeadingLabels};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};

use crate::json_tier::holds_analysis_object;
use crate::tier::{ParseTier, TierMiss};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    CorrectedCode,
    Explanation,
    Optimizations,
    Fixes,
    Bugs,
}

pub struct MarkdownTier {
    /// Classification order; the first section with a matching label wins.
    labels: Vec<(Section, Vec<String>)>,
    fields: FieldAliases,
}

impl MarkdownTier {
    pub fn new(headings: HeadingLabels, fields: FieldAliases) -> Self {
        let lower = |labels: Vec<String>| -> Vec<String> {
            labels.into_iter().map(|l| l.to_lowercase()).collect()
        };
        Self {
            labels: vec![
                (Section::CorrectedCode, lower(headings.corrected_code)),
                (Section::Explanation, lower(headings.explanation)),
                (Section::Optimizations, lower(headings.optimizations)),
                (Section::Fixes, lower(headings.fixes)),
                (Section::Bugs, lower(headings.bugs)),
            ],
            fields,
        }
    }

    fn classify(&self, heading: &str) -> Option<Section> {
        let heading = heading.to_lowercase();
        self.labels
            .iter()
            .find(|(_, labels)| labels.iter().any(|l| heading.contains(l.as_str())))
            .map(|(section, _)| *section)
    }
}

impl ParseTier for MarkdownTier {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn try_parse(&self, raw: &str) -> Result<AnalysisResult, TierMiss> {
        if holds_analysis_object(raw, &self.fields) {
            return Err(TierMiss::new("reply is a JSON object, not markdown sections"));
        }
        let segments = split_sections(raw);
        if segments.is_empty() {
            return Err(TierMiss::new("no markdown headings"));
        }

        let mut result = AnalysisResult::default();
        let mut recognized = 0usize;

        for (heading, body) in &segments {
            let Some(section) = self.classify(heading) else {
                continue;
            };
            recognized += 1;
            match section {
                Section::CorrectedCode => {
                    if result.corrected_code.is_empty() {
                        result.corrected_code =
                            first_fenced_block(body).unwrap_or_else(|| body.trim().to_string());
                    }
                }
                Section::Explanation => result.explanation.extend(list_items(body)),
                Section::Optimizations => result.optimizations.extend(list_items(body)),
                Section::Fixes => result.fixes.extend(list_items(body)),
                Section::Bugs => result.bugs.extend(list_items(body)),
            }
        }

        if recognized == 0 {
            let seen: Vec<&str> = segments.iter().map(|(h, _)| h.as_str()).collect();
            return Err(TierMiss::new(format!(
                "no recognized headings (saw: {})",
                seen.join(", ")
            )));
        }
        if result.is_blank() {
            return Err(TierMiss::new("recognized headings have no content"));
        }
        Ok(result)
    }
}

/// Split text into `(heading, body)` pairs on `#` lines outside code fences.
/// Text before the first heading is discarded.
fn split_sections(raw: &str) -> Vec<(String, String)> {
    let mut sections: Vec<(String, String)> = Vec::new();
    let mut in_fence = false;

    for line in raw.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
        } else if !in_fence && trimmed.starts_with('#') {
            let heading = trimmed.trim_start_matches('#').trim().to_string();
            sections.push((heading, String::new()));
            continue;
        }
        if let Some((_, body)) = sections.last_mut() {
            body.push_str(line);
            body.push('\n');
        }
    }
    sections
}

/// Contents of the first fenced code block, without its trailing newline.
pub fn first_fenced_block(text: &str) -> Option<String> {
    let mut inside = false;
    let mut code = String::new();

    for event in Parser::new(text) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => inside = true,
            Event::End(Tag::CodeBlock(CodeBlockKind::Fenced(_))) if inside => {
                return Some(code.trim_end_matches(['\n', '\r']).to_string());
            }
            Event::Text(text) if inside => code.push_str(&text),
            _ => {}
        }
    }
    None
}

fn list_items(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("```"))
        .filter(|line| !line.chars().all(|c| is_marker(c) || c.is_whitespace()))
        .map(|line| strip_bullet(line).to_string())
        .collect()
}

fn is_marker(c: char) -> bool {
    matches!(c, '-' | '*' | '•')
}

/// Remove one leading bullet marker and the space after it. `**bold**` is text, not a bullet.
fn strip_bullet(line: &str) -> &str {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(marker), Some(next)) if is_marker(marker) && next.is_whitespace() => {
            line[marker.len_utf8()..].trim_start()
        }
        _ => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier() -> MarkdownTier {
        MarkdownTier::new(HeadingLabels::default(), FieldAliases::default())
    }

    #[test]
    fn heading_reply_maps_to_fields() {
        let raw = "### CORRECTED CODE\n```python\nprint(1)\n```\n### ERROR EXPLANATION\n- none\n### OPTIMIZATION RECOMMENDATIONS\n- none";
        let result = tier().try_parse(raw).unwrap();
        assert_eq!(
            result,
            AnalysisResult {
                corrected_code: "print(1)".into(),
                bugs: vec![],
                fixes: vec![],
                optimizations: vec!["none".into()],
                explanation: vec!["none".into()],
                error: None,
            }
        );
    }

    #[test]
    fn bullets_keep_order_and_lose_markers() {
        let raw = "## Bugs Found\n- first\n* second\n• third\n\n  -   fourth  \n## Fixes\n1. numbered stays";
        let result = tier().try_parse(raw).unwrap();
        assert_eq!(result.bugs, vec!["first", "second", "third", "fourth"]);
        assert_eq!(result.fixes, vec!["1. numbered stays"]);
    }

    #[test]
    fn hash_comments_inside_code_are_not_headings() {
        let raw = "### Corrected Code\n```python\n# helper\ndef f():\n    pass\n```\n### Explanation\n- ok";
        let result = tier().try_parse(raw).unwrap();
        assert_eq!(result.corrected_code, "# helper\ndef f():\n    pass");
        assert_eq!(result.explanation, vec!["ok"]);
    }

    #[test]
    fn unknown_headings_miss() {
        let miss = tier().try_parse("# Summary\nall good").unwrap_err();
        assert!(miss.reason.contains("Summary"));
        assert!(tier().try_parse("plain prose").is_err());
    }

    #[test]
    fn fence_lines_are_skipped_in_lists() {
        let raw = "### Optimization\n```\n- cache results\n```";
        let result = tier().try_parse(raw).unwrap();
        assert_eq!(result.optimizations, vec!["cache results"]);
    }

    #[test]
    fn bold_items_keep_their_emphasis() {
        let raw = "### Bugs\n- **Line 3:** missing colon\n**Line 7:** unused import\n---";
        let result = tier().try_parse(raw).unwrap();
        assert_eq!(
            result.bugs,
            vec!["**Line 3:** missing colon", "**Line 7:** unused import"]
        );
    }

    #[test]
    fn empty_sections_miss() {
        let miss = tier().try_parse("### CORRECTED CODE\n").unwrap_err();
        assert!(miss.reason.contains("no content"), "{}", miss.reason);
        assert!(tier().try_parse("### Bugs\n-\n*\n### Fixes\n").is_err());
    }

    #[test]
    fn json_with_hash_comments_is_not_markdown() {
        let raw = "{\n \"corrected_code\": \"def f(xs):\n    # fix: guard empty input\n    return xs[0] if xs else None\",\n \"bugs\": [\"crash on empty list\"],\n \"fixes\": [\"guard\"],\n \"optimizations\": []\n}";
        let miss = tier().try_parse(raw).unwrap_err();
        assert!(miss.reason.contains("JSON"), "{}", miss.reason);
    }
}
