//! OCR adapter: timeout, retry and text cleanup around a single-shot engine.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bugscope_config::OcrConfig;
use bugscope_core::{retry, OcrEngine, RetryPolicy, TransportError};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::vision::GoogleVisionEngine;

static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

pub struct OcrAdapter {
    engine: Arc<dyn OcrEngine>,
    timeout: Duration,
    retry: RetryPolicy,
    language_hints: Vec<String>,
}

impl OcrAdapter {
    pub fn new(
        engine: Arc<dyn OcrEngine>,
        timeout: Duration,
        retry: RetryPolicy,
        language_hints: Vec<String>,
    ) -> Self {
        Self {
            engine,
            timeout,
            retry,
            language_hints,
        }
    }

    /// Build a Google Vision backed adapter. Returns `None` when OCR is disabled.
    pub fn from_config(config: &OcrConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let api_key = config
            .api_key
            .clone()
            .context("ocr.apiKey is required when OCR is enabled")?;
        let endpoint = config
            .endpoint
            .clone()
            .context("ocr.endpoint was not resolved")?;
        let engine = Arc::new(GoogleVisionEngine::new(api_key, endpoint));
        Ok(Some(Self::new(
            engine,
            Duration::from_secs(config.timeout_secs),
            config.retry.clone(),
            config.language_hints.clone(),
        )))
    }

    /// Detect the code in `image` and normalize its blank lines.
    pub async fn extract_text(&self, image: &[u8]) -> Result<String, TransportError> {
        let service = self.engine.name().to_string();
        let text = retry(
            &self.retry,
            "ocr.detect_text",
            TransportError::is_retryable,
            |_attempt| {
                let service = service.clone();
                async move {
                    match tokio::time::timeout(
                        self.timeout,
                        self.engine.detect_text(image, &self.language_hints),
                    )
                    .await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => Err(TransportError::Timeout {
                            service,
                            after: self.timeout,
                        }),
                    }
                }
            },
        )
        .await?;

        let cleaned = collapse_blank_lines(&text);
        info!(engine = %service, chars = cleaned.chars().count(), "[OCR] Text extracted");
        Ok(cleaned)
    }
}

/// Collapse runs of three or more newlines to exactly two, then trim.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN_RE.replace_all(text, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Replays a scripted sequence of outcomes, one per call.
    struct ScriptedEngine {
        outcomes: Mutex<Vec<Result<String, TransportError>>>,
        calls: AtomicU32,
        delay: Option<Duration>,
    }

    impl ScriptedEngine {
        fn new(mut outcomes: Vec<Result<String, TransportError>>) -> Arc<Self> {
            outcomes.reverse();
            Arc::new(Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicU32::new(0),
                delay: None,
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OcrEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn detect_text(&self, _image: &[u8], _hints: &[String]) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(TransportError::EmptyResponse { service: "scripted".into() }))
        }
    }

    fn instant_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay_ms: 1,
            backoff_factor: 1.0,
            max_delay_ms: 1,
            jitter: false,
        }
    }

    fn adapter(engine: Arc<ScriptedEngine>, attempts: u32) -> OcrAdapter {
        OcrAdapter::new(engine, Duration::from_secs(5), instant_retry(attempts), vec!["en".into()])
    }

    fn network() -> TransportError {
        TransportError::Network {
            service: "scripted".into(),
            message: "connection reset".into(),
        }
    }

    #[test]
    fn collapses_long_blank_runs() {
        assert_eq!(collapse_blank_lines("\n a\n\n\n\nb\n\nc \n\n\n"), "a\n\nb\n\nc");
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let engine = ScriptedEngine::new(vec![
            Err(network()),
            Err(TransportError::Http { service: "scripted".into(), status: 503, body: String::new() }),
            Ok("x = 1\n\n\n\ny = 2\n".into()),
        ]);
        let text = adapter(engine.clone(), 3).extract_text(b"img").await.unwrap();
        assert_eq!(text, "x = 1\n\ny = 2");
        assert_eq!(engine.calls(), 3);
    }

    #[tokio::test]
    async fn stops_after_configured_attempts() {
        let engine = ScriptedEngine::new(vec![Err(network()), Err(network()), Err(network()), Ok("late".into())]);
        let err = adapter(engine.clone(), 3).extract_text(b"img").await.unwrap_err();
        assert_eq!(err, network());
        assert_eq!(engine.calls(), 3);
    }

    #[tokio::test]
    async fn does_not_retry_service_errors() {
        let engine = ScriptedEngine::new(vec![
            Err(TransportError::Service { service: "scripted".into(), message: "bad image".into() }),
            Ok("never".into()),
        ]);
        let err = adapter(engine.clone(), 3).extract_text(b"img").await.unwrap_err();
        assert!(matches!(err, TransportError::Service { .. }));
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn does_not_retry_no_text() {
        let engine = ScriptedEngine::new(vec![Err(TransportError::NoText { service: "scripted".into() })]);
        let err = adapter(engine.clone(), 3).extract_text(b"img").await.unwrap_err();
        assert!(matches!(err, TransportError::NoText { .. }));
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn slow_attempts_time_out_and_retry() {
        let engine = Arc::new(ScriptedEngine {
            outcomes: Mutex::new(vec![Ok("b".into()), Ok("a".into())]),
            calls: AtomicU32::new(0),
            delay: Some(Duration::from_millis(200)),
        });
        let ocr = OcrAdapter::new(engine.clone(), Duration::from_millis(20), instant_retry(2), vec![]);
        let err = ocr.extract_text(b"img").await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
        assert_eq!(engine.calls(), 2);
    }

    #[test]
    fn disabled_config_builds_nothing() {
        let config = OcrConfig {
            enabled: false,
            ..OcrConfig::default()
        };
        assert!(OcrAdapter::from_config(&config).unwrap().is_none());
    }
}
