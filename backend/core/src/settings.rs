//! Tunable values shared between the config schema and the crates that consume them.
//!
//! The exact field names, headings and limits never settled across deployments,
//! so all of them are data rather than code.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 1024 * 1024;
pub const DEFAULT_MAX_CODE_CHARS: usize = 15_000;
pub const DEFAULT_EXCERPT_CHARS: usize = 300;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Size, type and length limits applied to uploads and pasted code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadLimits {
    pub max_image_bytes: usize,
    pub max_source_bytes: usize,
    pub max_code_chars: usize,
    /// Source file extensions, lowercase, without the dot.
    pub allowed_extensions: Vec<String>,
    /// Image MIME types.
    pub allowed_image_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            max_code_chars: DEFAULT_MAX_CODE_CHARS,
            allowed_extensions: strings(&[
                "py", "js", "jsx", "ts", "tsx", "java", "c", "h", "cpp", "hpp", "cc", "cs", "go",
                "rb", "rs", "php", "swift", "kt", "scala", "sql", "sh",
            ]),
            allowed_image_types: strings(&["image/png", "image/jpeg"]),
        }
    }
}

/// How the model is asked to lay out its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplyFormat {
    #[default]
    Json,
    Headings,
}

/// One safety-category threshold sent with every generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

impl SafetySetting {
    pub fn new(category: impl Into<String>, threshold: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            threshold: threshold.into(),
        }
    }

    /// Thresholds that let code discussing exploits through while still
    /// blocking clearly harmful output.
    pub fn defaults() -> Vec<SafetySetting> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|c| SafetySetting::new(c, "BLOCK_ONLY_HIGH"))
        .collect()
    }
}

/// Accepted JSON key spellings for each analysis field, first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldAliases {
    pub corrected_code: Vec<String>,
    pub bugs: Vec<String>,
    pub fixes: Vec<String>,
    pub optimizations: Vec<String>,
    pub explanation: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            corrected_code: strings(&["corrected_code", "correctedCode", "fixed_code"]),
            bugs: strings(&["bugs", "issues"]),
            fixes: strings(&["fixes"]),
            optimizations: strings(&["optimizations", "analysis_findings"]),
            explanation: strings(&["explanation", "explanations"]),
        }
    }
}

/// Lowercase substrings identifying each markdown section heading.
///
/// Headings are classified in field order: corrected code, explanation,
/// optimizations, fixes, bugs. "ERROR EXPLANATION" therefore lands in
/// `explanation`, not `bugs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadingLabels {
    pub corrected_code: Vec<String>,
    pub explanation: Vec<String>,
    pub optimizations: Vec<String>,
    pub fixes: Vec<String>,
    pub bugs: Vec<String>,
}

impl Default for HeadingLabels {
    fn default() -> Self {
        Self {
            corrected_code: strings(&["corrected code", "fixed code", "corrected"]),
            explanation: strings(&["explanation", "analysis"]),
            optimizations: strings(&["optimization", "recommendation"]),
            fixes: strings(&["fix", "solution"]),
            bugs: strings(&["error", "bug", "issue"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionSettings {
    /// Maximum characters of raw reply quoted in extraction errors.
    pub excerpt_chars: usize,
    pub fields: FieldAliases,
    pub headings: HeadingLabels,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            fields: FieldAliases::default(),
            headings: HeadingLabels::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_deserialize_partially() {
        let limits: UploadLimits =
            serde_json::from_str(r#"{"maxCodeChars": 5000}"#).unwrap();
        assert_eq!(limits.max_code_chars, 5_000);
        assert_eq!(limits.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
        assert!(limits.allowed_extensions.contains(&"py".to_string()));
    }

    #[test]
    fn reply_format_is_snake_case() {
        let f: ReplyFormat = serde_json::from_str("\"headings\"").unwrap();
        assert_eq!(f, ReplyFormat::Headings);
    }
}
