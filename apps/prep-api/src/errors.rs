use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` (canonical `{ok: false, error}` envelope) so Axum
/// handlers can return `Result<T, AppError>`. The legacy route renders the
/// same errors as `{error}` via `into_legacy_response`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Message is returned to the client verbatim.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Template unreadable: {0}")]
    Template(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The model answered but its output was unusable. Message is client-facing.
    #[error("Model output error: {0}")]
    ModelOutput(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Configuration(_)
            | AppError::Template(_)
            | AppError::Llm(_)
            | AppError::ModelOutput(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `error` string of the canonical envelope.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Configuration(msg)
            | AppError::ModelOutput(msg) => msg.clone(),
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::Template(_) => "Locked template file not found or unreadable".to_string(),
            AppError::Llm(e) => upstream_message(e),
        }
    }

    /// The `error` string of the legacy envelope. Template failures carry
    /// their cause.
    pub fn legacy_message(&self) -> String {
        match self {
            AppError::Template(detail) => format!("Internal server error: {detail}"),
            other => other.client_message(),
        }
    }

    /// Renders `{ "error": "..." }`.
    pub fn into_legacy_response(self) -> Response {
        self.log();
        (self.status(), Json(json!({ "error": self.legacy_message() }))).into_response()
    }

    fn log(&self) {
        match self {
            AppError::Validation(_) | AppError::MethodNotAllowed => {}
            other => tracing::error!("{other}"),
        }
    }
}

fn upstream_message(err: &LlmError) -> String {
    match err {
        LlmError::Api { message, .. } => format!("OpenAI API error: {message}"),
        LlmError::EmptyContent => "No response from OpenAI".to_string(),
        LlmError::Http(e) => format!("OpenAI API error: {e}"),
        LlmError::Parse(_) => "OpenAI API error: Unknown error".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let body = Json(json!({
            "ok": false,
            "error": self.client_message()
        }));
        (self.status(), body).into_response()
    }
}
