use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the bugscope runtime.
#[derive(Debug, Error)]
pub enum BugscopeError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Input rejected before any network call was made.
///
/// Every variant names the limit it violated so the message can be shown to the
/// user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("file is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("file extension '{extension}' is not allowed (allowed: {allowed})")]
    DisallowedExtension { extension: String, allowed: String },

    #[error("image type '{mime}' is not allowed (allowed: {allowed})")]
    DisallowedImageType { mime: String, allowed: String },

    #[error("file is not valid UTF-8 text (invalid byte at offset {offset})")]
    NotUtf8 { offset: usize },

    #[error("code is {chars} characters long, exceeding the {limit} character limit")]
    TooLong { chars: usize, limit: usize },

    #[error("no code provided")]
    Empty,
}

/// An outbound call to the text-generation or OCR service failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{service} timed out after {}s", after.as_secs())]
    Timeout { service: String, after: Duration },

    #[error("{service} request failed: {message}")]
    Network { service: String, message: String },

    #[error("{service} returned HTTP {status}: {body}")]
    Http {
        service: String,
        status: u16,
        body: String,
    },

    #[error("{service} reported an error: {message}")]
    Service { service: String, message: String },

    #[error("{service} blocked the response: {reason}")]
    SafetyBlocked { service: String, reason: String },

    #[error("{service} returned an empty response")]
    EmptyResponse { service: String },

    #[error("{service} detected no text in the image")]
    NoText { service: String },

    #[error("{service} response could not be decoded: {message}")]
    Decode { service: String, message: String },
}

impl TransportError {
    /// Whether another attempt of the same call could plausibly succeed.
    ///
    /// Timeouts, connection failures, throttling and server-side errors are
    /// transient; anything the service answered deliberately is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Service { .. }
            | Self::SafetyBlocked { .. }
            | Self::EmptyResponse { .. }
            | Self::NoText { .. }
            | Self::Decode { .. } => false,
        }
    }

    pub fn service(&self) -> &str {
        match self {
            Self::Timeout { service, .. }
            | Self::Network { service, .. }
            | Self::Http { service, .. }
            | Self::Service { service, .. }
            | Self::SafetyBlocked { service, .. }
            | Self::EmptyResponse { service }
            | Self::NoText { service }
            | Self::Decode { service, .. } => service,
        }
    }
}

/// The upstream reply could not be shaped into an `AnalysisResult`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not extract analysis ({stages}); reply excerpt: {excerpt:?}")]
pub struct ExtractionError {
    /// Miss reason of every tier that was attempted, in order.
    pub stages: String,
    /// Bounded prefix of the raw reply.
    pub excerpt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_limit() {
        let err = ValidationError::TooLarge {
            size: 6_000_000,
            limit: 5_242_880,
        };
        assert!(err.to_string().contains("5242880 byte limit"));

        let err = ValidationError::TooLong {
            chars: 20_000,
            limit: 15_000,
        };
        assert!(err.to_string().contains("15000 character limit"));
    }

    #[test]
    fn retryable_classification() {
        let timeout = TransportError::Timeout {
            service: "vision".into(),
            after: Duration::from_secs(30),
        };
        assert!(timeout.is_retryable());

        let throttled = TransportError::Http {
            service: "vision".into(),
            status: 429,
            body: String::new(),
        };
        assert!(throttled.is_retryable());

        let bad_request = TransportError::Http {
            service: "vision".into(),
            status: 400,
            body: String::new(),
        };
        assert!(!bad_request.is_retryable());

        let no_text = TransportError::NoText {
            service: "vision".into(),
        };
        assert!(!no_text.is_retryable());
        assert_eq!(no_text.service(), "vision");
    }
}
