//! HTTP surface for DocuIntel AI.
//!
//! One router per backend; the active backend is chosen by configuration at startup.
//!
//! Pipeline backend:
//! - `GET /` – Status message.
//! - `POST /summarize` – `{ "text" }` → `{ "summary" }`.
//! - `POST /classify` – `{ "text" }` → `{ "classification", "confidence" }`. Labels scoring
//!   below the confidence threshold are reported as `"Unclassified Document"`.
//!
//! Gemini backend:
//! - `GET /` – Status message.
//! - `POST /process-document` – `{ "text" }` → `{ "summary", "classification" }`.
//!
//! Both backends serve `GET /commands`, a machine-readable catalog of their routes. Blank text
//! is rejected with `400` and `{ "detail": "..." }` on every `POST` route; model failures never
//! surface as errors and are reported through placeholder values instead.

use crate::{
    config::{Backend, Config},
    gemini::GeminiError,
    processing::{
        Classification, DocumentInsight, LocalProcessingApi, LocalProcessingService,
        RemoteProcessingApi, RemoteProcessingService, ValidationError, validate_document,
    },
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the router for whichever backend `config` selects.
pub fn create_app(config: &Config) -> Result<Router, GeminiError> {
    let router = match config.backend {
        Backend::Pipeline => pipeline_router(Arc::new(LocalProcessingService::from_config(config))),
        Backend::Gemini => gemini_router(Arc::new(RemoteProcessingService::from_config(config)?)),
    };
    Ok(router)
}

/// Router exposing the local pipeline backend.
pub fn pipeline_router<S>(service: Arc<S>) -> Router
where
    S: LocalProcessingApi + 'static,
{
    Router::new()
        .route("/", get(pipeline_status))
        .route("/summarize", post(summarize::<S>))
        .route("/classify", post(classify::<S>))
        .route("/commands", get(pipeline_commands))
        .with_state(service)
}

/// Router exposing the Gemini backend.
pub fn gemini_router<S>(service: Arc<S>) -> Router
where
    S: RemoteProcessingApi + 'static,
{
    Router::new()
        .route("/", get(gemini_status))
        .route("/process-document", post(process_document::<S>))
        .route("/commands", get(gemini_commands))
        .with_state(service)
}

/// Request body shared by every document route.
#[derive(Deserialize)]
struct TextRequest {
    /// Document text to analyse.
    text: String,
}

#[derive(Serialize)]
struct StatusResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
}

async fn pipeline_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "DocuIntel AI service is running (local pipelines).",
    })
}

async fn gemini_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "DocuIntel AI service is running (Gemini).",
    })
}

/// Summarize a document with the local summarization pipeline.
async fn summarize<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<TextRequest>,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: LocalProcessingApi,
{
    let text = validate_document(&request.text)?;
    let summary = service.summarize(text).await;
    tracing::info!(
        chars = text.chars().count(),
        summary_chars = summary.chars().count(),
        "Summarize request completed"
    );
    Ok(Json(SummarizeResponse { summary }))
}

/// Classify a document against the fixed candidate labels.
async fn classify<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<TextRequest>,
) -> Result<Json<Classification>, AppError>
where
    S: LocalProcessingApi,
{
    let text = validate_document(&request.text)?;
    let result = service.classify(text).await;
    tracing::info!(
        chars = text.chars().count(),
        classification = %result.classification,
        confidence = result.confidence,
        "Classify request completed"
    );
    Ok(Json(result))
}

/// Summarize and classify a document with the generative model.
async fn process_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<TextRequest>,
) -> Result<Json<DocumentInsight>, AppError>
where
    S: RemoteProcessingApi,
{
    let text = validate_document(&request.text)?;
    let insight = service.process_document(text).await;
    tracing::info!(
        chars = text.chars().count(),
        classification = %insight.classification,
        "Process-document request completed"
    );
    Ok(Json(insight))
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct CommandsResponse {
    backend: Backend,
    commands: Vec<CommandDescriptor>,
}

fn status_command() -> CommandDescriptor {
    CommandDescriptor {
        name: "status",
        method: "GET",
        path: "/",
        description: "Report that the service is running.",
        request_example: None,
    }
}

async fn pipeline_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        backend: Backend::Pipeline,
        commands: vec![
            status_command(),
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Produce an abstractive summary. Response returns { \"summary\": string }.",
                request_example: Some(json!({ "text": "Document contents" })),
            },
            CommandDescriptor {
                name: "classify",
                method: "POST",
                path: "/classify",
                description: "Zero-shot classify into a fixed label set. Response returns { \"classification\": string, \"confidence\": number }.",
                request_example: Some(json!({ "text": "Document contents" })),
            },
        ],
    })
}

async fn gemini_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        backend: Backend::Gemini,
        commands: vec![
            status_command(),
            CommandDescriptor {
                name: "process_document",
                method: "POST",
                path: "/process-document",
                description: "Summarize and classify in one call. Response returns { \"summary\": string, \"classification\": string }.",
                request_example: Some(json!({ "text": "Document contents" })),
            },
        ],
    })
}

struct AppError(ValidationError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self.0, "Rejected request");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": self.0.to_string() })),
        )
            .into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(inner: ValidationError) -> Self {
        Self(inner)
    }
}
