use std::sync::Mutex;

use async_trait::async_trait;
use bugscope_core::{LlmProvider, LlmRequest, LlmResponse, TransportError};

/// A mock LLM provider that returns canned responses and records prompts.
pub struct MockProvider {
    name: String,
    fixed_response: Result<String, TransportError>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed_response: Ok("Mock response".to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Ok(response.into());
        self
    }

    pub fn with_error(mut self, error: TransportError) -> Self {
        self.fixed_response = Err(error);
        self
    }

    /// User prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, req: &LlmRequest) -> Result<LlmResponse, TransportError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(req.user_prompt.clone());
        }
        let content = self.fixed_response.clone()?;
        Ok(LlmResponse {
            content,
            provider: self.name.clone(),
            model: req.model.clone(),
            tokens_used: 0,
            latency_ms: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> LlmRequest {
        LlmRequest {
            model: "mock-model".to_string(),
            system_prompt: String::new(),
            user_prompt: prompt.to_string(),
            max_tokens: 64,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn records_prompts_and_echoes_model() {
        let provider = MockProvider::new("mock").with_response("{}");
        let reply = provider.complete(&request("first")).await.unwrap();
        provider.complete(&request("second")).await.unwrap();

        assert_eq!(reply.content, "{}");
        assert_eq!(reply.model, "mock-model");
        assert_eq!(provider.prompts(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn scripted_error_is_returned() {
        let provider = MockProvider::new("mock").with_error(TransportError::EmptyResponse {
            service: "mock".to_string(),
        });
        let err = provider.complete(&request("x")).await.unwrap_err();
        assert!(matches!(err, TransportError::EmptyResponse { .. }));
        assert_eq!(provider.prompts().len(), 1);
    }
}
