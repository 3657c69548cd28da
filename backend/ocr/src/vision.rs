/// Google Cloud Vision text detection.
///
/// One call to `images:annotate` per `detect_text`; the adapter owns timeouts
/// and retries.
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use bugscope_core::{OcrEngine, TransportError};
use serde_json::Value;
use tracing::debug;

pub const SERVICE: &str = "google-vision";

pub struct GoogleVisionEngine {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GoogleVisionEngine {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for GoogleVisionEngine {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn detect_text(
        &self,
        image: &[u8],
        language_hints: &[String],
    ) -> Result<String, TransportError> {
        let body = build_annotate_request(image, language_hints);
        debug!(bytes = image.len(), "[Vision] Sending TEXT_DETECTION request");

        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Http {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }

        let json: Value = resp.json().await.map_err(|e| TransportError::Decode {
            service: SERVICE.to_string(),
            message: e.to_string(),
        })?;
        parse_annotate_response(&json)
    }
}

pub fn build_annotate_request(image: &[u8], language_hints: &[String]) -> Value {
    serde_json::json!({
        "requests": [{
            "image": { "content": STANDARD.encode(image) },
            "features": [{ "type": "TEXT_DETECTION" }],
            "imageContext": { "languageHints": language_hints }
        }]
    })
}

/// Pull the primary text block out of an `images:annotate` response.
pub fn parse_annotate_response(json: &Value) -> Result<String, TransportError> {
    let first = &json["responses"][0];

    if let Some(message) = first["error"]["message"].as_str() {
        return Err(TransportError::Service {
            service: SERVICE.to_string(),
            message: message.to_string(),
        });
    }

    let primary = first["textAnnotations"][0]["description"]
        .as_str()
        .or_else(|| first["fullTextAnnotation"]["text"].as_str())
        .filter(|t| !t.trim().is_empty());

    match primary {
        Some(text) => Ok(text.to_string()),
        None => Err(TransportError::NoText {
            service: SERVICE.to_string(),
        }),
    }
}

pub(crate) fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    if let Some(status) = e.status() {
        return TransportError::Http {
            service: SERVICE.to_string(),
            status: status.as_u16(),
            body: e.to_string(),
        };
    }
    if e.is_decode() {
        return TransportError::Decode {
            service: SERVICE.to_string(),
            message: e.to_string(),
        };
    }
    // Connect, timeout and body errors are all worth another attempt.
    TransportError::Network {
        service: SERVICE.to_string(),
        message: e.without_url().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_carries_base64_and_hints() {
        let body = build_annotate_request(b"abc", &["en".to_string()]);
        let req = &body["requests"][0];
        assert_eq!(req["image"]["content"], "YWJj");
        assert_eq!(req["features"][0]["type"], "TEXT_DETECTION");
        assert_eq!(req["imageContext"]["languageHints"][0], "en");
    }

    #[test]
    fn takes_first_annotation() {
        let resp = json!({ "responses": [{ "textAnnotations": [
            { "description": "print(1)\n" },
            { "description": "print(1)" }
        ]}]});
        assert_eq!(parse_annotate_response(&resp).unwrap(), "print(1)\n");
    }

    #[test]
    fn falls_back_to_full_text() {
        let resp = json!({ "responses": [{ "fullTextAnnotation": { "text": "x = 1" } }] });
        assert_eq!(parse_annotate_response(&resp).unwrap(), "x = 1");
    }

    #[test]
    fn service_error_message_is_surfaced() {
        let resp = json!({ "responses": [{ "error": { "code": 3, "message": "Bad image data." } }] });
        let err = parse_annotate_response(&resp).unwrap_err();
        assert_eq!(
            err,
            TransportError::Service {
                service: SERVICE.into(),
                message: "Bad image data.".into()
            }
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn no_detections_is_no_text() {
        let resp = json!({ "responses": [{}] });
        assert!(matches!(
            parse_annotate_response(&resp),
            Err(TransportError::NoText { .. })
        ));
    }
}
