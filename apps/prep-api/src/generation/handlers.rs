//! Axum route handlers for the resume generation API.
//!
//! The body is taken as raw bytes so a malformed payload still gets the
//! route's own 400 envelope instead of Axum's rejection text.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::generation::generator::{
    generate_resume, generate_resume_legacy, GenerateResumeRequest, GenerateResumeResponse,
};
use crate::state::AppState;

fn parse_request(body: &[u8]) -> Result<GenerateResumeRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateResumeRequest::default());
    }
    serde_json::from_slice(body).map_err(|_| AppError::Validation("Invalid JSON body".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical route
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/generate
///
/// Fills the locked resume template for a job description via the completion
/// backend. Responds `{ok: true, ...}` or `{ok: false, error}`.
pub async fn handle_generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResumeResponse>, AppError> {
    let request = parse_request(&body)?;
    let response = generate_resume(
        state.llm.as_deref(),
        &state.config.resume_template_path,
        request,
    )
    .await?;
    Ok(Json(response))
}

/// OPTIONS /api/v1/resumes/generate
pub async fn handle_preflight() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

// ────────────────────────────────────────────────────────────────────────────
// Legacy route
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/generate/legacy
///
/// Older clients: `{error}` on failure, the model's object on success.
pub async fn handle_generate_legacy(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match parse_request(&body) {
        Ok(request) => {
            generate_resume_legacy(
                state.llm.as_deref(),
                &state.config.resume_template_path,
                request,
            )
            .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(output) => Json(output).into_response(),
        Err(e) => e.into_legacy_response(),
    }
}

pub async fn legacy_method_not_allowed() -> Response {
    AppError::MethodNotAllowed.into_legacy_response()
}
