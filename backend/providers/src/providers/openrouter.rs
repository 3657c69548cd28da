use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use bugscope_core::{LlmProvider, LlmRequest, LlmResponse, TransportError};

use super::http::{build_client, classify, decode_error, ensure_success};

const SERVICE: &str = "openrouter";

/// OpenRouter.ai LLM provider.
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.into(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

fn parse_chat_response(chat: ChatResponse) -> Result<(String, u64), TransportError> {
    let tokens = chat.usage.and_then(|u| u.total_tokens).unwrap_or(0);
    let choice = chat.choices.into_iter().next().ok_or(TransportError::EmptyResponse {
        service: SERVICE.to_string(),
    })?;

    match choice.message.content.filter(|c| !c.trim().is_empty()) {
        Some(content) => Ok((content, tokens)),
        None if choice.finish_reason.as_deref() == Some("content_filter") => {
            Err(TransportError::SafetyBlocked {
                service: SERVICE.to_string(),
                reason: "content_filter".to_string(),
            })
        }
        None => Err(TransportError::EmptyResponse {
            service: SERVICE.to_string(),
        }),
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, TransportError> {
        let start = Instant::now();

        let mut messages = Vec::new();
        if !request.system_prompt.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(request.system_prompt.clone()),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: Some(request.user_prompt.clone()),
        });

        let body = ChatRequest {
            model: request.model.clone(),
            messages,
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
        };

        debug!(model = %request.model, "Sending request to OpenRouter");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify(SERVICE, e))?;

        let response = ensure_success(SERVICE, response).await?;
        let chat: ChatResponse = response.json().await.map_err(|e| decode_error(SERVICE, e))?;
        let (content, tokens_used) = parse_chat_response(chat)?;

        Ok(LlmResponse {
            content,
            provider: SERVICE.to_string(),
            model: request.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<(String, u64), TransportError> {
        parse_chat_response(serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn reads_first_choice_and_usage() {
        let (text, tokens) = parse(
            r#"{"choices":[{"message":{"role":"assistant","content":"ok"},"finish_reason":"stop"}],"usage":{"total_tokens":7}}"#,
        )
        .unwrap();
        assert_eq!(text, "ok");
        assert_eq!(tokens, 7);
    }

    #[test]
    fn filtered_choice_is_safety_block() {
        let err = parse(r#"{"choices":[{"message":{"role":"assistant","content":null},"finish_reason":"content_filter"}]}"#)
            .unwrap_err();
        assert!(matches!(err, TransportError::SafetyBlocked { .. }));
    }

    #[test]
    fn no_choices_is_empty() {
        assert!(matches!(parse(r#"{"choices":[]}"#), Err(TransportError::EmptyResponse { .. })));
    }
}
