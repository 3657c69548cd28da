//! Analysis Event Logger
//!
//! Typed events for each stage of an analysis, emitted on the `analysis_events`
//! tracing target so the rolling NDJSON file carries one line per event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisEvent {
    RequestAccepted {
        mode: String,
        language: String,
        chars: usize,
    },
    InputRejected {
        reason: String,
    },
    OcrCompleted {
        chars: usize,
    },
    ReplyReceived {
        provider: String,
        model: String,
        tokens_used: u64,
        latency_ms: u64,
    },
    ExtractionFailed {
        error_msg: String,
    },
    AnalysisCompleted {
        bugs: usize,
        fixes: usize,
        optimizations: usize,
    },
    CodeGenerated {
        language: String,
        code_chars: usize,
    },
    UpstreamFailed {
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: AnalysisEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact free-text fields, then hand the event to the tracing system as JSON.
    pub fn log_event(request_id: Uuid, event: AnalysisEvent) -> EventLogEntry {
        let event = match event {
            AnalysisEvent::InputRejected { reason } => AnalysisEvent::InputRejected {
                reason: redact_sensitive_data(&reason),
            },
            AnalysisEvent::ExtractionFailed { error_msg } => AnalysisEvent::ExtractionFailed {
                error_msg: redact_sensitive_data(&error_msg),
            },
            AnalysisEvent::UpstreamFailed { error_msg } => AnalysisEvent::UpstreamFailed {
                error_msg: redact_sensitive_data(&error_msg),
            },
            other => other,
        };

        let entry = EventLogEntry {
            request_id,
            timestamp: Utc::now(),
            event,
        };

        let payload = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "analysis_events", request_id = %request_id, event = %payload, "Analysis event");
        entry
    }
}
