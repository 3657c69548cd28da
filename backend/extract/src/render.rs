use bugscope_core::AnalysisResult;

/// Render a result as markdown: the code block followed by one section per list.
///
/// Empty lists are omitted. A failed result renders as its error message.
pub fn render_markdown(result: &AnalysisResult, language: &str) -> String {
    if let Some(error) = &result.error {
        return format!("**Analysis failed:** {error}\n");
    }

    let mut out = String::new();
    if !result.corrected_code.is_empty() {
        let tag = if language == "auto" { "" } else { language };
        out.push_str(&format!(
            "### Corrected Code\n```{tag}\n{}\n```\n\n",
            result.corrected_code
        ));
    }

    for (title, items) in [
        ("Bugs", &result.bugs),
        ("Fixes", &result.fixes),
        ("Optimizations", &result.optimizations),
        ("Explanation", &result.explanation),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("### {title}\n"));
        for item in items {
            out.push_str(&format!("- {item}\n"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Extractor;

    #[test]
    fn rendered_markdown_extracts_back() {
        let result = AnalysisResult {
            corrected_code: "print(1)".into(),
            bugs: vec!["typo".into()],
            fixes: vec!["fixed typo".into()],
            optimizations: vec![],
            explanation: vec!["was broken".into()],
            error: None,
        };
        let rendered = render_markdown(&result, "python");
        assert!(rendered.contains("```python\nprint(1)\n```"));
        assert!(!rendered.contains("### Optimizations"));
        assert_eq!(Extractor::default().extract(&rendered), result);
    }

    #[test]
    fn failed_result_renders_error() {
        let rendered = render_markdown(&AnalysisResult::failed("gemini timed out"), "auto");
        assert_eq!(rendered, "**Analysis failed:** gemini timed out\n");
    }
}
