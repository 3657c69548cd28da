use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use bugscope_core::{LlmProvider, LlmRequest, LlmResponse, TransportError};

use super::http::{build_client, classify, decode_error, ensure_success};

const SERVICE: &str = "ollama";

/// Local model server speaking the `/api/chat` protocol. No credential.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: "http://localhost:11434".to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<Turn>,
    stream: bool,
    options: SamplingOptions,
}

#[derive(Serialize)]
struct SamplingOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize, Deserialize)]
struct Turn {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ChatReply {
    message: Option<Turn>,
    done_reason: Option<String>,
    eval_count: Option<u64>,
    prompt_eval_count: Option<u64>,
}

/// Model names may carry a registry prefix such as `library/`; the server wants the bare tag.
fn local_model_name(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model)
}

fn chat_turns(request: &LlmRequest) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(2);
    if !request.system_prompt.is_empty() {
        turns.push(Turn {
            role: "system".to_string(),
            content: request.system_prompt.clone(),
        });
    }
    turns.push(Turn {
        role: "user".to_string(),
        content: request.user_prompt.clone(),
    });
    turns
}

fn parse_chat_reply(reply: ChatReply) -> Result<(String, u64), TransportError> {
    let tokens = reply.eval_count.unwrap_or(0) + reply.prompt_eval_count.unwrap_or(0);
    match reply.message.map(|m| m.content).filter(|c| !c.trim().is_empty()) {
        Some(content) => Ok((content, tokens)),
        None => {
            debug!(done_reason = ?reply.done_reason, "Empty chat reply");
            Err(TransportError::EmptyResponse {
                service: SERVICE.to_string(),
            })
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, TransportError> {
        let start = Instant::now();
        let model = local_model_name(&request.model);

        let body = ChatBody {
            model,
            messages: chat_turns(request),
            stream: false,
            options: SamplingOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        debug!(model = %model, base_url = %self.base_url, "Sending chat request");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| classify(SERVICE, e))?;

        let response = ensure_success(SERVICE, response).await?;
        let reply: ChatReply = response.json().await.map_err(|e| decode_error(SERVICE, e))?;
        let (content, tokens_used) = parse_chat_reply(reply)?;

        Ok(LlmResponse {
            content,
            provider: SERVICE.to_string(),
            model: model.to_string(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
