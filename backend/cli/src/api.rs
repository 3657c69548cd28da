use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use bugscope_assistant::Assistant;
use bugscope_core::{AnalysisMode, AnalysisResult, BugscopeError, CodeTemplate, GenerationRequest};

/// Shared application state for API handlers.
pub struct AppState {
    pub assistant: Arc<Assistant>,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let limits = state.assistant.limits();
    // Leave headroom for JSON escaping of pasted code.
    let body_limit = limits
        .max_image_bytes
        .max(limits.max_source_bytes)
        .max(limits.max_code_chars * 4)
        + 64 * 1024;

    Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/upload", post(upload))
        .route("/api/generate", post(generate))
        .route("/api/last", get(last))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "bugscope",
        "version": env!("CARGO_PKG_VERSION"),
        "ocr": state.assistant.ocr_enabled(),
    }))
}

fn parse_mode(mode: Option<&str>) -> Result<AnalysisMode, Response> {
    match mode {
        None => Ok(AnalysisMode::default()),
        Some(m) => m
            .parse()
            .map_err(|e: String| (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))).into_response()),
    }
}

/// Analysis failures are part of the result, so these always answer 200.
fn result_response(result: AnalysisResult) -> Response {
    Json(result).into_response()
}

#[derive(Deserialize)]
struct AnalyzeBody {
    code: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    mode: Option<String>,
}

async fn analyze(State(state): State<Arc<AppState>>, Json(body): Json<AnalyzeBody>) -> Response {
    let mode = match parse_mode(body.mode.as_deref()) {
        Ok(mode) => mode,
        Err(resp) => return resp,
    };
    let result = state
        .assistant
        .analyze_text(&body.code, body.language.as_deref(), mode)
        .await;
    result_response(result)
}

#[derive(Deserialize)]
struct UploadQuery {
    filename: String,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

/// Raw file body; the file name decides whether it is code or a screenshot.
async fn upload(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Response {
    let mode = match parse_mode(query.mode.as_deref()) {
        Ok(mode) => mode,
        Err(resp) => return resp,
    };
    let result = state
        .assistant
        .analyze_upload(&query.filename, body.to_vec(), query.language.as_deref(), mode)
        .await;
    result_response(result)
}

#[derive(Deserialize)]
struct GenerateBody {
    description: String,
    language: String,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    refinement: Option<String>,
}

async fn generate(State(state): State<Arc<AppState>>, Json(body): Json<GenerateBody>) -> Response {
    let template = match body.template.as_deref().map(str::parse::<CodeTemplate>) {
        None => CodeTemplate::default(),
        Some(Ok(t)) => t,
        Some(Err(e)) => return (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))).into_response(),
    };
    let request = GenerationRequest {
        description: body.description,
        language: body.language,
        template,
        refinement: body.refinement,
    };

    match state.assistant.generate(request).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => {
            let status = match e {
                BugscopeError::Validation(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            tracing::warn!(error = %e, "Generation failed");
            (status, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn last(State(state): State<Arc<AppState>>) -> Response {
    match state.assistant.last_interaction().await {
        Some(interaction) => Json(interaction).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
