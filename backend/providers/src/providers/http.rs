//! Shared HTTP plumbing for providers.

use std::time::Duration;

use anyhow::{Context, Result};
use bugscope_core::TransportError;
use reqwest::{Client, Response};

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Map a reqwest failure onto the transport taxonomy.
pub fn classify(service: &str, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        return TransportError::Timeout {
            service: service.to_string(),
            // reqwest does not report the configured limit back
            after: Duration::ZERO,
        };
    }
    if let Some(status) = e.status() {
        return TransportError::Http {
            service: service.to_string(),
            status: status.as_u16(),
            body: e.to_string(),
        };
    }
    if e.is_decode() {
        return TransportError::Decode {
            service: service.to_string(),
            message: e.to_string(),
        };
    }
    TransportError::Network {
        service: service.to_string(),
        message: e.without_url().to_string(),
    }
}

/// Turn a non-2xx response into `TransportError::Http`.
pub async fn ensure_success(service: &str, response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Http {
        service: service.to_string(),
        status: status.as_u16(),
        body,
    })
}

pub fn decode_error(service: &str, e: impl std::fmt::Display) -> TransportError {
    TransportError::Decode {
        service: service.to_string(),
        message: e.to_string(),
    }
}
