//! `bugscope-providers`: text-generation backends behind [`LlmProvider`].

pub mod providers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bugscope_config::{LlmConfig, ProviderKind};
use bugscope_core::LlmProvider;
use tracing::info;

pub use providers::gemini::GeminiProvider;
pub use providers::mock::MockProvider;
pub use providers::ollama::OllamaProvider;
pub use providers::openrouter::OpenRouterProvider;

/// Build the provider selected in config.
///
/// Expects defaults to have been applied, so `base_url` is set.
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let api_key = || {
        config
            .api_key
            .clone()
            .with_context(|| format!("llm.apiKey is required for provider '{}'", config.provider))
    };

    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderKind::Gemini => {
            let mut p = GeminiProvider::new(api_key()?, timeout)?.with_safety(config.safety.clone());
            if let Some(url) = &config.base_url {
                p = p.with_base_url(url.clone());
            }
            Arc::new(p)
        }
        ProviderKind::OpenRouter => {
            let mut p = OpenRouterProvider::new(api_key()?, timeout)?;
            if let Some(url) = &config.base_url {
                p = p.with_base_url(url.clone());
            }
            Arc::new(p)
        }
        ProviderKind::Ollama => {
            let mut p = OllamaProvider::new(timeout)?;
            if let Some(url) = &config.base_url {
                p = p.with_base_url(url.clone());
            }
            Arc::new(p)
        }
    };

    info!(provider = %config.provider, model = ?config.model, "LLM provider ready");
    Ok(provider)
}
