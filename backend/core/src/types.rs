use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// What kind of review the model is asked to perform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    FullAudit,
    QuickFix,
    SecurityReview,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 3] = [Self::FullAudit, Self::QuickFix, Self::SecurityReview];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullAudit => "full-audit",
            Self::QuickFix => "quick-fix",
            Self::SecurityReview => "security-review",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "full-audit" | "full" | "audit" => Ok(Self::FullAudit),
            "quick-fix" | "quick" | "fix" => Ok(Self::QuickFix),
            "security-review" | "security" => Ok(Self::SecurityReview),
            other => Err(format!(
                "unknown analysis mode '{other}' (expected full-audit, quick-fix or security-review)"
            )),
        }
    }
}

/// One user action asking for a review of some code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub source_text: String,
    /// Language label such as "python"; `None` lets the model detect it.
    #[serde(default)]
    pub declared_language: Option<String>,
    #[serde(default)]
    pub mode: AnalysisMode,
}

impl AnalysisRequest {
    pub fn new(source_text: impl Into<String>, mode: AnalysisMode) -> Self {
        Self {
            source_text: source_text.into(),
            declared_language: None,
            mode,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        if !language.trim().is_empty() {
            self.declared_language = Some(language);
        }
        self
    }

    /// Label used to tag the fenced code block in prompts.
    pub fn language_label(&self) -> &str {
        self.declared_language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("auto")
    }
}

/// Opaque text returned by the generative service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawModelReply {
    pub text: String,
}

impl RawModelReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// The structured record extracted from a model reply.
///
/// Either `error` is `None` and the analysis fields hold the extraction, or
/// `error` is set and every analysis field is empty. Use [`AnalysisResult::failed`]
/// to build the error form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisResult {
    pub corrected_code: String,
    pub bugs: Vec<String>,
    pub fixes: Vec<String>,
    pub optimizations: Vec<String>,
    pub explanation: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// True when nothing at all was extracted.
    pub fn is_blank(&self) -> bool {
        self.corrected_code.is_empty()
            && self.bugs.is_empty()
            && self.fixes.is_empty()
            && self.optimizations.is_empty()
            && self.explanation.is_empty()
    }
}

/// Bytes received from an upload, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadArtifact {
    pub bytes: Bytes,
    /// Lowercased extension without the leading dot, empty if the name had none.
    pub declared_extension: String,
    pub size: usize,
}

impl UploadArtifact {
    pub fn new(file_name: &str, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let declared_extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        Self {
            size: bytes.len(),
            bytes,
            declared_extension,
        }
    }
}

/// Where an upload came from, which decides the rules applied to it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputContext {
    Image,
    SourceFile,
}

/// Detected kind of a validated input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Image,
    SourceCode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputContent {
    Text(String),
    Image { bytes: Bytes, mime: &'static str },
}

/// Input that passed every validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    pub kind: InputKind,
    pub content: InputContent,
    pub extension: String,
    /// Language inferred from the file extension, if any.
    pub language: Option<String>,
}

/// Project skeleton the code generator is asked to follow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CodeTemplate {
    #[default]
    Custom,
    WebApi,
    CliTool,
    DataPipeline,
    MlModel,
    GuiApplication,
    Microservice,
}

impl CodeTemplate {
    /// Human name used inside prompts; `None` for a custom request.
    pub fn display_name(&self) -> Option<&'static str> {
        match self {
            Self::Custom => None,
            Self::WebApi => Some("Web API"),
            Self::CliTool => Some("CLI Tool"),
            Self::DataPipeline => Some("Data Pipeline"),
            Self::MlModel => Some("ML Model"),
            Self::GuiApplication => Some("GUI Application"),
            Self::Microservice => Some("Microservice"),
        }
    }
}

impl FromStr for CodeTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "custom" | "" => Ok(Self::Custom),
            "webapi" | "api" => Ok(Self::WebApi),
            "clitool" | "cli" => Ok(Self::CliTool),
            "datapipeline" | "pipeline" => Ok(Self::DataPipeline),
            "mlmodel" | "ml" => Ok(Self::MlModel),
            "guiapplication" | "gui" => Ok(Self::GuiApplication),
            "microservice" => Ok(Self::Microservice),
            _ => Err(format!("unknown template '{s}'")),
        }
    }
}

/// Ask the model to write new code from a description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationRequest {
    pub description: String,
    pub language: String,
    #[serde(default)]
    pub template: CodeTemplate,
    /// Feedback on a previous generation, appended to the prompt.
    #[serde(default)]
    pub refinement: Option<String>,
}

/// Sections parsed from a code-generation reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedCode {
    pub code: String,
    pub overview: Vec<String>,
    pub features: Vec<String>,
    pub extensions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_loose_spellings() {
        assert_eq!("Quick_Fix".parse::<AnalysisMode>().unwrap(), AnalysisMode::QuickFix);
        assert_eq!("security".parse::<AnalysisMode>().unwrap(), AnalysisMode::SecurityReview);
        assert!("deep".parse::<AnalysisMode>().is_err());
    }

    #[test]
    fn language_label_defaults_to_auto() {
        let req = AnalysisRequest::new("x = 1", AnalysisMode::FullAudit);
        assert_eq!(req.language_label(), "auto");
        let req = req.with_language("python");
        assert_eq!(req.language_label(), "python");
    }

    #[test]
    fn failed_result_has_no_fields() {
        let result = AnalysisResult::failed("boom");
        assert!(result.is_error());
        assert!(result.is_blank());
    }

    #[test]
    fn artifact_lowercases_extension() {
        let artifact = UploadArtifact::new("Main.PY", b"print(1)".to_vec());
        assert_eq!(artifact.declared_extension, "py");
        assert_eq!(artifact.size, 8);

        let artifact = UploadArtifact::new("Makefile", Vec::new());
        assert_eq!(artifact.declared_extension, "");
    }

    #[test]
    fn template_parses_display_names() {
        assert_eq!("Web API".parse::<CodeTemplate>().unwrap(), CodeTemplate::WebApi);
        assert_eq!("ML Model".parse::<CodeTemplate>().unwrap(), CodeTemplate::MlModel);
        assert_eq!(CodeTemplate::Custom.display_name(), None);
    }
}
