//! Prompt construction for analysis and generation requests.

use bugscope_core::{AnalysisMode, AnalysisRequest, GenerationRequest, ReplyFormat};

pub const ANALYSIS_SYSTEM_PROMPT: &str =
    "You are an expert software engineer who reviews code for defects and explains them clearly.";

pub const GENERATION_SYSTEM_PROMPT: &str = "You are an expert software developer.";

/// Extra reviewer instructions per mode.
const MODE_INSTRUCTIONS: [(AnalysisMode, &str); 3] = [
    (
        AnalysisMode::FullAudit,
        "Perform a complete review: correctness bugs, unhandled edge cases, performance problems, \
         readability issues and security weaknesses.",
    ),
    (
        AnalysisMode::QuickFix,
        "Focus only on bugs that stop the code from running or make it produce wrong results. \
         Keep the corrected code as close to the original as possible.",
    ),
    (
        AnalysisMode::SecurityReview,
        "Focus on security: injection, unsafe deserialization, hard-coded secrets, missing input \
         validation and unsafe use of system resources.",
    ),
];

pub fn mode_instructions(mode: AnalysisMode) -> &'static str {
    MODE_INSTRUCTIONS
        .iter()
        .find(|(m, _)| *m == mode)
        .map(|(_, text)| *text)
        .unwrap_or_default()
}

const JSON_FORMAT: &str = r#"Respond with a single JSON object with exactly these keys:
- "bugs": list of strings, one per bug found
- "fixes": list of strings, one per fix applied
- "corrected_code": string containing the complete corrected code
- "optimizations": list of strings with optimization recommendations
- "explanation": list of strings explaining the errors and the changes

Rules:
- Output only valid JSON, nothing before or after it.
- Do not wrap the JSON in markdown code fences.
- Escape double quotes, backslashes and newlines inside string values.
- Use an empty list when a section has nothing to report."#;

const HEADINGS_FORMAT: &str = "Structure your reply with exactly these sections, in this order:

### CORRECTED CODE
The complete corrected code in a single fenced code block.

### ERROR EXPLANATION
One bullet point per error found and how it was fixed.

### OPTIMIZATION RECOMMENDATIONS
One bullet point per recommendation.";

/// A backtick fence long enough not to collide with fences inside `code`.
fn fence_for(code: &str) -> String {
    let longest = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Build the user prompt for an analysis request.
pub fn build_analysis_prompt(request: &AnalysisRequest, format: ReplyFormat) -> String {
    let language = request.language_label();
    let fence = fence_for(&request.source_text);
    let language_line = if language == "auto" {
        "Detect the programming language of the code below.".to_string()
    } else {
        format!("The code below is written in {language}.")
    };
    let format_text = match format {
        ReplyFormat::Json => JSON_FORMAT,
        ReplyFormat::Headings => HEADINGS_FORMAT,
    };

    format!(
        "Analyze the following code for errors.\n{language_line}\n{}\n\n{fence}{language}\n{}\n{fence}\n\n{format_text}\n",
        mode_instructions(request.mode),
        request.source_text,
    )
}

/// Build the user prompt for a code-generation request.
pub fn build_generation_prompt(request: &GenerationRequest) -> String {
    let language = request.language.trim();
    let template = request
        .template
        .display_name()
        .map(|name| format!(" using the {name} template structure"))
        .unwrap_or_default();
    let refinement = request
        .refinement
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| format!("\nPrevious code feedback: {r}\n"))
        .unwrap_or_default();

    format!(
        "Generate {language} code{template} that:\n{}\n\n\
         Requirements:\n\
         1. Production-quality code\n\
         2. Follow {language} best practices\n\
         3. Include error handling\n\
         4. Add relevant comments\n\
         5. Support easy extension\n\
         {refinement}\n\
         Format the response with:\n\
         - A markdown code block with syntax highlighting\n\
         - Overview bullet points, each starting with \"- Overview: \"\n\
         - Key features, each starting with \"- Feature: \"\n\
         - Extension ideas, each starting with \"- Extension: \"\n",
        request.description.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugscope_core::CodeTemplate;

    #[test]
    fn analysis_prompt_embeds_tagged_code() {
        let request = AnalysisRequest::new("print(1", AnalysisMode::QuickFix).with_language("python");
        let prompt = build_analysis_prompt(&request, ReplyFormat::Json);
        assert!(prompt.contains("```python\nprint(1\n```"));
        assert!(prompt.contains("\"corrected_code\""));
        assert!(prompt.contains("\"optimizations\""));
        assert!(prompt.contains("Do not wrap the JSON"));
        assert!(prompt.contains(mode_instructions(AnalysisMode::QuickFix)));
    }

    #[test]
    fn headings_prompt_names_sections() {
        let request = AnalysisRequest::new("x", AnalysisMode::FullAudit);
        let prompt = build_analysis_prompt(&request, ReplyFormat::Headings);
        assert!(prompt.contains("```auto\nx\n```"));
        for heading in ["### CORRECTED CODE", "### ERROR EXPLANATION", "### OPTIMIZATION RECOMMENDATIONS"] {
            assert!(prompt.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn every_mode_has_instructions() {
        for mode in AnalysisMode::ALL {
            assert!(!mode_instructions(mode).is_empty());
        }
    }

    #[test]
    fn code_with_fences_gets_longer_fence() {
        let request = AnalysisRequest::new("s = \"```\"", AnalysisMode::FullAudit);
        let prompt = build_analysis_prompt(&request, ReplyFormat::Json);
        assert!(prompt.contains("````auto\ns = \"```\"\n````"));
    }

    #[test]
    fn generation_prompt_includes_template_and_refinement() {
        let request = GenerationRequest {
            description: "REST API for users".into(),
            language: "Python".into(),
            template: CodeTemplate::WebApi,
            refinement: Some("add rate limiting".into()),
        };
        let prompt = build_generation_prompt(&request);
        assert!(prompt.starts_with("Generate Python code using the Web API template structure that:"));
        assert!(prompt.contains("2. Follow Python best practices"));
        assert!(prompt.contains("Previous code feedback: add rate limiting"));
        assert!(prompt.contains("- Feature: "));
    }

    #[test]
    fn custom_template_adds_nothing() {
        let request = GenerationRequest {
            description: "a cli".into(),
            language: "Go".into(),
            template: CodeTemplate::Custom,
            refinement: None,
        };
        let prompt = build_generation_prompt(&request);
        assert!(prompt.starts_with("Generate Go code that:"));
        assert!(!prompt.contains("feedback"));
    }
}
