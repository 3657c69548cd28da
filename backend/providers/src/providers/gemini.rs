use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use bugscope_core::{LlmProvider, LlmRequest, LlmResponse, SafetySetting, TransportError};

use super::http::{build_client, classify, decode_error, ensure_success};

const SERVICE: &str = "gemini";

/// Google Gemini `generateContent` provider.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    safety: Vec<SafetySetting>,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            safety: SafetySetting::defaults(),
            timeout,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_safety(mut self, safety: Vec<SafetySetting>) -> Self {
        self.safety = safety;
        self
    }
}

/// Build the `generateContent` request body.
pub fn build_request_body(request: &LlmRequest, safety: &[SafetySetting]) -> Value {
    let mut body = json!({
        "contents": [{ "role": "user", "parts": [{ "text": request.user_prompt }] }],
        "safetySettings": safety
            .iter()
            .map(|s| json!({ "category": s.category, "threshold": s.threshold }))
            .collect::<Vec<_>>(),
        "generationConfig": {
            "maxOutputTokens": request.max_tokens,
            "temperature": request.temperature,
        }
    });
    if !request.system_prompt.is_empty() {
        body["systemInstruction"] = json!({ "parts": [{ "text": request.system_prompt }] });
    }
    body
}

/// Extract the generated text, or say why there is none.
pub fn parse_generate_response(json: &Value) -> Result<(String, u64), TransportError> {
    if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
        return Err(TransportError::SafetyBlocked {
            service: SERVICE.to_string(),
            reason: reason.to_string(),
        });
    }

    let candidate = &json["candidates"][0];
    if candidate.is_null() {
        return Err(TransportError::EmptyResponse {
            service: SERVICE.to_string(),
        });
    }

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        if candidate["finishReason"].as_str() == Some("SAFETY") {
            return Err(TransportError::SafetyBlocked {
                service: SERVICE.to_string(),
                reason: "SAFETY".to_string(),
            });
        }
        return Err(TransportError::EmptyResponse {
            service: SERVICE.to_string(),
        });
    }

    let tokens = json["usageMetadata"]["totalTokenCount"].as_u64().unwrap_or(0);
    Ok((text, tokens))
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, TransportError> {
        let start = Instant::now();
        let body = build_request_body(request, &self.safety);

        debug!(model = %request.model, "Sending request to Gemini");

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, request.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| match classify(SERVICE, e) {
                TransportError::Timeout { service, .. } => TransportError::Timeout {
                    service,
                    after: self.timeout,
                },
                other => other,
            })?;

        let response = ensure_success(SERVICE, response).await?;
        let json: Value = response.json().await.map_err(|e| decode_error(SERVICE, e))?;

        let (content, tokens_used) = parse_generate_response(&json).inspect_err(|e| {
            warn!(model = %request.model, error = %e, "Gemini returned no usable text");
        })?;

        Ok(LlmResponse {
            content,
            provider: SERVICE.to_string(),
            model: request.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
