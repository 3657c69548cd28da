//! Analysis orchestration: validate, OCR, prompt, complete, extract.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use bugscope_config::BugscopeConfig;
use bugscope_core::{
    AnalysisMode, AnalysisRequest, AnalysisResult, BugscopeError, GeneratedCode,
    GenerationRequest, InputContent, InputContext, LlmProvider, LlmRequest, LlmResponse,
    ReplyFormat, UploadArtifact, UploadLimits, ValidationError,
};
use bugscope_extract::{parse_generated, Extractor};
use bugscope_intake::{
    extension_for_language, image_mime_for_extension, validate_pasted_text, validate_upload,
};
use bugscope_ocr::OcrAdapter;
use bugscope_providers::build_provider;
use logging::{AnalysisEvent, EventLogger};

use crate::prompt::{
    build_analysis_prompt, build_generation_prompt, ANALYSIS_SYSTEM_PROMPT,
    GENERATION_SYSTEM_PROMPT,
};

/// Fixed parameters of every generation call.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub reply_format: ReplyFormat,
}

/// What the last interaction produced.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionResult {
    Analysis {
        mode: AnalysisMode,
        language: String,
        result: AnalysisResult,
    },
    Generation {
        language: String,
        file_name: String,
        generated: GeneratedCode,
    },
}

/// The only state kept between interactions.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LastInteraction {
    pub request_id: Uuid,
    pub at: DateTime<Utc>,
    pub result: InteractionResult,
}

/// Code generation output plus a suggested download name.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationOutcome {
    pub file_name: String,
    #[serde(flatten)]
    pub generated: GeneratedCode,
}

pub struct Assistant {
    provider: Arc<dyn LlmProvider>,
    ocr: Option<OcrAdapter>,
    extractor: Extractor,
    limits: UploadLimits,
    params: GenerationParams,
    last: RwLock<Option<LastInteraction>>,
}

impl Assistant {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        ocr: Option<OcrAdapter>,
        extractor: Extractor,
        limits: UploadLimits,
        params: GenerationParams,
    ) -> Self {
        Self {
            provider,
            ocr,
            extractor,
            limits,
            params,
            last: RwLock::new(None),
        }
    }

    /// Wire provider, OCR and extractor from a prepared config.
    pub fn from_config(config: &BugscopeConfig) -> Result<Self> {
        let provider = build_provider(&config.llm)?;
        let ocr = OcrAdapter::from_config(&config.ocr)?;
        let params = GenerationParams {
            model: config.llm.model.clone().unwrap_or_default(),
            max_tokens: config.llm.max_output_tokens,
            temperature: config.llm.temperature,
            reply_format: config.llm.reply_format,
        };
        Ok(Self::new(
            provider,
            ocr,
            Extractor::new(config.extraction.clone()),
            config.limits.clone(),
            params,
        ))
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub fn ocr_enabled(&self) -> bool {
        self.ocr.is_some()
    }

    /// Analyze pasted code.
    pub async fn analyze_text(
        &self,
        code: &str,
        language: Option<&str>,
        mode: AnalysisMode,
    ) -> AnalysisResult {
        let request_id = Uuid::new_v4();
        let text = match validate_pasted_text(code, &self.limits) {
            Ok(text) => text,
            Err(e) => return self.reject(request_id, mode, language, e).await,
        };
        let mut request = AnalysisRequest::new(text, mode);
        if let Some(language) = language {
            request = request.with_language(language);
        }
        self.run_analysis(request_id, request).await
    }

    /// Analyze an uploaded source file or code screenshot.
    ///
    /// The context is chosen from the extension: known image types go through
    /// OCR, everything else is treated as a source file.
    pub async fn analyze_upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        language: Option<&str>,
        mode: AnalysisMode,
    ) -> AnalysisResult {
        let request_id = Uuid::new_v4();
        let artifact = UploadArtifact::new(file_name, bytes);
        let context = if image_mime_for_extension(&artifact.declared_extension).is_some() {
            InputContext::Image
        } else {
            InputContext::SourceFile
        };

        let input = match validate_upload(&artifact, context, &self.limits) {
            Ok(input) => input,
            Err(e) => return self.reject(request_id, mode, language, e).await,
        };

        let text = match input.content {
            InputContent::Text(text) => text,
            InputContent::Image { bytes, .. } => {
                let Some(ocr) = &self.ocr else {
                    let message = "image uploads need OCR, which is disabled in the configuration";
                    return self
                        .finish_failed(request_id, mode, language.unwrap_or("auto"), message)
                        .await;
                };
                let text = match ocr.extract_text(&bytes).await {
                    Ok(text) => text,
                    Err(e) => {
                        return self
                            .upstream_failed(request_id, mode, language, BugscopeError::from(e))
                            .await
                    }
                };
                EventLogger::log_event(
                    request_id,
                    AnalysisEvent::OcrCompleted {
                        chars: text.chars().count(),
                    },
                );
                if let Err(e) = validate_pasted_text(&text, &self.limits) {
                    return self.reject(request_id, mode, language, e).await;
                }
                text
            }
        };

        let language = language
            .map(str::to_string)
            .or(input.language);
        let mut request = AnalysisRequest::new(text, mode);
        if let Some(language) = language {
            request = request.with_language(language);
        }
        self.run_analysis(request_id, request).await
    }

    /// Run one prompt/complete/extract cycle for an accepted request.
    async fn run_analysis(&self, request_id: Uuid, request: AnalysisRequest) -> AnalysisResult {
        let language = request.language_label().to_string();
        EventLogger::log_event(
            request_id,
            AnalysisEvent::RequestAccepted {
                mode: request.mode.to_string(),
                language: language.clone(),
                chars: request.source_text.chars().count(),
            },
        );

        let llm_request = LlmRequest {
            model: self.params.model.clone(),
            system_prompt: ANALYSIS_SYSTEM_PROMPT.to_string(),
            user_prompt: build_analysis_prompt(&request, self.params.reply_format),
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
        };

        let reply = match self.complete(request_id, &llm_request).await {
            Ok(reply) => reply,
            Err(e) => {
                return self
                    .upstream_failed(request_id, request.mode, Some(&language), e)
                    .await
            }
        };

        let result = match self.extractor.try_extract(&reply.content) {
            Ok(result) => {
                EventLogger::log_event(
                    request_id,
                    AnalysisEvent::AnalysisCompleted {
                        bugs: result.bugs.len(),
                        fixes: result.fixes.len(),
                        optimizations: result.optimizations.len(),
                    },
                );
                result
            }
            Err(e) => {
                EventLogger::log_event(
                    request_id,
                    AnalysisEvent::ExtractionFailed {
                        error_msg: e.to_string(),
                    },
                );
                AnalysisResult::failed(BugscopeError::from(e).to_string())
            }
        };

        self.remember(request_id, InteractionResult::Analysis {
            mode: request.mode,
            language,
            result: result.clone(),
        })
        .await;
        result
    }

    /// Generate new code from a description.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome, BugscopeError> {
        let request_id = Uuid::new_v4();
        if request.description.trim().is_empty() {
            return Err(ValidationError::Empty.into());
        }

        let llm_request = LlmRequest {
            model: self.params.model.clone(),
            system_prompt: GENERATION_SYSTEM_PROMPT.to_string(),
            user_prompt: build_generation_prompt(&request),
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
        };
        let reply = self.complete(request_id, &llm_request).await.inspect_err(|e| {
            EventLogger::log_event(
                request_id,
                AnalysisEvent::UpstreamFailed {
                    error_msg: e.to_string(),
                },
            );
        })?;

        let generated = parse_generated(&reply.content);
        let language = request.language.trim().to_string();
        let file_name = format!(
            "generated_{}.{}",
            language.to_lowercase().replace(|c: char| !c.is_ascii_alphanumeric(), ""),
            extension_for_language(&language)
        );

        EventLogger::log_event(
            request_id,
            AnalysisEvent::CodeGenerated {
                language: language.clone(),
                code_chars: generated.code.chars().count(),
            },
        );
        self.remember(request_id, InteractionResult::Generation {
            language,
            file_name: file_name.clone(),
            generated: generated.clone(),
        })
        .await;

        Ok(GenerationOutcome {
            file_name,
            generated,
        })
    }

    pub async fn last_interaction(&self) -> Option<LastInteraction> {
        self.last.read().await.clone()
    }

    async fn complete(&self, request_id: Uuid, request: &LlmRequest) -> Result<LlmResponse, BugscopeError> {
        let response = self.provider.complete(request).await?;
        EventLogger::log_event(
            request_id,
            AnalysisEvent::ReplyReceived {
                provider: response.provider.clone(),
                model: response.model.clone(),
                tokens_used: response.tokens_used,
                latency_ms: response.latency_ms,
            },
        );
        Ok(response)
    }

    async fn remember(&self, request_id: Uuid, result: InteractionResult) {
        *self.last.write().await = Some(LastInteraction {
            request_id,
            at: Utc::now(),
            result,
        });
    }

    async fn reject(
        &self,
        request_id: Uuid,
        mode: AnalysisMode,
        language: Option<&str>,
        error: ValidationError,
    ) -> AnalysisResult {
        info!(%request_id, reason = %error, "Input rejected");
        EventLogger::log_event(
            request_id,
            AnalysisEvent::InputRejected {
                reason: error.to_string(),
            },
        );
        let message = BugscopeError::from(error).to_string();
        self.finish_failed(request_id, mode, language.unwrap_or("auto"), &message)
            .await
    }

    async fn upstream_failed(
        &self,
        request_id: Uuid,
        mode: AnalysisMode,
        language: Option<&str>,
        error: BugscopeError,
    ) -> AnalysisResult {
        warn!(%request_id, error = %error, "Upstream call failed");
        EventLogger::log_event(
            request_id,
            AnalysisEvent::UpstreamFailed {
                error_msg: error.to_string(),
            },
        );
        self.finish_failed(request_id, mode, language.unwrap_or("auto"), &error.to_string())
            .await
    }

    async fn finish_failed(
        &self,
        request_id: Uuid,
        mode: AnalysisMode,
        language: &str,
        message: &str,
    ) -> AnalysisResult {
        let result = AnalysisResult::failed(message);
        self.remember(request_id, InteractionResult::Analysis {
            mode,
            language: language.to_string(),
            result: result.clone(),
        })
        .await;
        result
    }
}
