//! Parser for code-generation replies.

use bugscope_core::GeneratedCode;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::markdown_tier::first_fenced_block;

static DOC_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*[-*]\s*(Overview|Feature|Extension):\s*(.+?)\s*$").unwrap());

/// Split a generation reply into its code block and documentation bullets.
///
/// Each `- Overview:`, `- Feature:` or `- Extension:` bullet is filed under its
/// label with the label text removed, so `- Feature: JWT auth` is stored as
/// `JWT auth` in `features`. A reply without a fenced block yields empty code.
pub fn parse_generated(reply: &str) -> GeneratedCode {
    let mut generated = GeneratedCode {
        code: first_fenced_block(reply).unwrap_or_default(),
        ..GeneratedCode::default()
    };

    for caps in DOC_LINE_RE.captures_iter(reply) {
        let text = caps[2].to_string();
        match &caps[1] {
            "Overview" => generated.overview.push(text),
            "Feature" => generated.features.push(text),
            _ => generated.extensions.push(text),
        }
    }
    generated
}
