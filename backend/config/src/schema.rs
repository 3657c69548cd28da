//! bugscope runtime configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every section is optional in the
//! file; missing sections fall back to their `Default`, and provider-dependent
//! values are filled in by [`crate::defaults::apply_all_defaults`].

use std::fmt;
use std::str::FromStr;

use bugscope_core::{ExtractionSettings, ReplyFormat, RetryPolicy, SafetySetting, UploadLimits};
use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_BIND_ADDRESS, DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_LOG_LEVEL, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_OCR_TIMEOUT_SECS, DEFAULT_PORT, DEFAULT_TEMPERATURE,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for bugscope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugscopeConfig {
    /// Text-generation service
    #[serde(default)]
    pub llm: LlmConfig,

    /// Hosted OCR service used for screenshots of code
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Upload size, type and length limits
    #[serde(default)]
    pub limits: UploadLimits,

    /// Reply parsing: accepted key spellings and section headings
    #[serde(default)]
    pub extraction: ExtractionSettings,

    /// HTTP API
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// LLM
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenRouter,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
        }
    }

    /// Whether calls to this provider need an API key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    pub provider: ProviderKind,

    /// Model id; defaults per provider when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Usually `${GEMINI_API_KEY}` or `${OPENROUTER_API_KEY}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    pub max_output_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,

    /// Ask for a JSON object or for `###` headed sections
    pub reply_format: ReplyFormat,

    /// Safety thresholds sent with each Gemini call
    pub safety: Vec<SafetySetting>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            api_key: None,
            base_url: None,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            reply_format: ReplyFormat::default(),
            safety: SafetySetting::defaults(),
        }
    }
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OcrConfig {
    /// When false, image uploads are rejected instead of sent to OCR
    pub enabled: bool,

    /// Usually `${GOOGLE_VISION_API_KEY}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Per-attempt timeout
    pub timeout_secs: u64,

    pub language_hints: Vec<String>,

    pub retry: RetryPolicy,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            endpoint: None,
            timeout_secs: DEFAULT_OCR_TIMEOUT_SECS,
            language_hints: vec!["en".to_string()],
            retry: RetryPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,

    /// Directory for rolling NDJSON logs; console only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// Emit console logs as JSON
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            dir: None,
            json: false,
        }
    }
}
