//! Config defaults: applies provider-dependent default values to parsed config.

use crate::schema::{BugscopeConfig, ProviderKind};

pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-2.0-flash-001";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: BugscopeConfig) -> BugscopeConfig {
    let config = apply_llm_defaults(config);
    apply_ocr_defaults(config)
}

/// Fill model and base URL for the selected provider.
fn apply_llm_defaults(mut config: BugscopeConfig) -> BugscopeConfig {
    let (model, base_url) = match config.llm.provider {
        ProviderKind::Gemini => (DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_BASE_URL),
        ProviderKind::OpenRouter => (DEFAULT_OPENROUTER_MODEL, DEFAULT_OPENROUTER_BASE_URL),
        ProviderKind::Ollama => (DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_BASE_URL),
    };
    if config.llm.model.as_deref().map(str::trim).unwrap_or("").is_empty() {
        config.llm.model = Some(model.to_string());
    }
    if config.llm.base_url.as_deref().map(str::trim).unwrap_or("").is_empty() {
        config.llm.base_url = Some(base_url.to_string());
    }
    config
}

fn apply_ocr_defaults(mut config: BugscopeConfig) -> BugscopeConfig {
    if config.ocr.endpoint.is_none() {
        config.ocr.endpoint = Some(DEFAULT_VISION_ENDPOINT.to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_gemini_model_and_url() {
        let cfg = apply_all_defaults(BugscopeConfig::default());
        assert_eq!(cfg.llm.model.as_deref(), Some(DEFAULT_GEMINI_MODEL));
        assert_eq!(cfg.llm.base_url.as_deref(), Some(DEFAULT_GEMINI_BASE_URL));
        assert_eq!(cfg.ocr.endpoint.as_deref(), Some(DEFAULT_VISION_ENDPOINT));
    }

    #[test]
    fn defaults_follow_provider() {
        let mut cfg = BugscopeConfig::default();
        cfg.llm.provider = ProviderKind::Ollama;
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.llm.model.as_deref(), Some(DEFAULT_OLLAMA_MODEL));
        assert_eq!(cfg.llm.base_url.as_deref(), Some(DEFAULT_OLLAMA_BASE_URL));
    }

    #[test]
    fn does_not_override_user_model() {
        let mut cfg = BugscopeConfig::default();
        cfg.llm.model = Some("gemini-1.5-pro".to_string());
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.llm.model.as_deref(), Some("gemini-1.5-pro"));
    }
}
