//! Resume Generation: validates the request, builds the prompt around the
//! locked template, calls the completion backend and normalizes its output.
//!
//! Flow: validate → target match → must-include skills → read template →
//!       completion → extract JSON payload → structure check → metric clamps.
//!
//! Two response envelopes are served. The canonical one (`{ok: ...}`, metrics
//! clamped 90–100) and the legacy one (`{error}` on failure, the model's own
//! object echoed back with metrics clamped 70–100).

use std::path::Path;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::errors::AppError;
use crate::generation::prompts::{build_user_prompt, LEGACY_RESUME_SYSTEM, RESUME_SYSTEM};
use crate::llm_client::CompletionBackend;

pub const DEFAULT_TARGET_MATCH: u8 = 85;
const TARGET_MATCH_MIN: f64 = 70.0;
const TARGET_MATCH_MAX: f64 = 100.0;

static FENCED_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap());

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for both routes. Fields stay loosely typed: clients send
/// numbers as strings, skills as arrays or CSV, and so on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResumeRequest {
    #[serde(default)]
    pub candidate_id: Option<Value>,
    #[serde(default)]
    pub company_name: Option<Value>,
    #[serde(default)]
    pub job_description: Option<Value>,
    #[serde(default)]
    pub target_match_mode: Option<Value>,
    #[serde(default)]
    pub target_match_value: Option<Value>,
    #[serde(default)]
    pub must_include_skills: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeMetrics {
    pub jd_match: u8,
    pub hr_catchiness: u8,
    pub ats_friendliness: u8,
    pub chances_of_shortlisting: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResumeResponse {
    pub ok: bool,
    pub filename: String,
    pub resume_html: String,
    pub role_title: String,
    pub target_match: u8,
    pub metrics: ResumeMetrics,
    pub added_skills: Vec<Value>,
}

/// Which route's rules apply where the two differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Envelope {
    Canonical,
    Legacy,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// Canonical route. `backend` is `None` when no API key is configured.
pub async fn generate_resume(
    backend: Option<&dyn CompletionBackend>,
    template_path: &Path,
    request: GenerateResumeRequest,
) -> Result<GenerateResumeResponse, AppError> {
    let job_description = request
        .job_description
        .as_ref()
        .and_then(Value::as_str)
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("jobDescription is required".to_string()))?;

    if !is_truthy(request.candidate_id.as_ref()) || !is_truthy(request.company_name.as_ref()) {
        return Err(AppError::Validation(
            "Missing required fields: candidateId, companyName".to_string(),
        ));
    }

    let backend = backend
        .ok_or_else(|| AppError::Configuration("OPENAI_API_KEY is not set".to_string()))?;

    let target_match = if is_auto_mode(request.target_match_mode.as_ref(), Envelope::Canonical) {
        random_target_match()
    } else {
        fixed_target_match(request.target_match_value.as_ref())
    };
    let skills = parse_must_include_skills(request.must_include_skills.as_ref());

    let template_html = read_template(template_path).await?;

    info!(
        "generateResume request: target_match={}, must_include_skills={}",
        target_match,
        skills.len()
    );

    let prompt = build_user_prompt(
        &value_text(request.company_name.as_ref()),
        job_description,
        target_match,
        &skills,
        &template_html,
    );
    let content = backend.complete(RESUME_SYSTEM, &prompt).await?;
    let output = parse_model_output(&content, Envelope::Canonical)?;

    let raw = output.get("metrics");
    let metrics = ResumeMetrics {
        jd_match: clamp_canonical(first_present(raw, &["jdMatch"]), target_match),
        hr_catchiness: clamp_canonical(first_present(raw, &["hrCatchiness"]), 91),
        ats_friendliness: clamp_canonical(first_present(raw, &["atsFriendliness", "ats"]), 92),
        chances_of_shortlisting: clamp_canonical(
            first_present(raw, &["chancesOfShortlisting", "shortlistChance"]),
            93,
        ),
    };

    Ok(GenerateResumeResponse {
        ok: true,
        filename: value_text(output.get("filename")),
        resume_html: value_text(output.get("resumeHtml")),
        role_title: if is_truthy(output.get("roleTitle")) {
            value_text(output.get("roleTitle"))
        } else {
            String::new()
        },
        target_match,
        metrics,
        added_skills: output
            .get("addedSkills")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    })
}

/// Legacy route: returns the model's object with `metrics` normalized and
/// `targetMatch` overwritten.
pub async fn generate_resume_legacy(
    backend: Option<&dyn CompletionBackend>,
    template_path: &Path,
    request: GenerateResumeRequest,
) -> Result<Value, AppError> {
    if !is_truthy(request.candidate_id.as_ref())
        || !is_truthy(request.company_name.as_ref())
        || !is_truthy(request.job_description.as_ref())
    {
        return Err(AppError::Validation(
            "Missing required fields: candidateId, companyName, jobDescription".to_string(),
        ));
    }

    let backend = backend
        .ok_or_else(|| AppError::Configuration("OPENAI_API_KEY not configured".to_string()))?;

    let target_match = if is_auto_mode(request.target_match_mode.as_ref(), Envelope::Legacy) {
        random_target_match()
    } else {
        fixed_target_match(request.target_match_value.as_ref())
    };
    let skills = parse_must_include_skills(request.must_include_skills.as_ref());

    let template_html = read_template(template_path).await?;

    let prompt = build_user_prompt(
        &value_text(request.company_name.as_ref()),
        &value_text(request.job_description.as_ref()),
        target_match,
        &skills,
        &template_html,
    );
    let content = backend.complete(LEGACY_RESUME_SYSTEM, &prompt).await?;
    let mut output = parse_model_output(&content, Envelope::Legacy)?;

    let mut metrics = match output.remove("metrics") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for (key, fallback) in [
        ("jdMatch", target_match),
        ("ats", 85),
        ("hrCatchiness", 80),
        ("shortlistChance", 82),
    ] {
        let clamped = clamp_legacy(metrics.get(key), fallback);
        metrics.insert(key.to_string(), Value::from(clamped));
    }
    output.insert("metrics".to_string(), Value::Object(metrics));
    output.insert("targetMatch".to_string(), Value::from(target_match));

    Ok(Value::Object(output))
}

async fn read_template(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        error!("Template read error ({}): {e}", path.display());
        AppError::Template(e.to_string())
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Request normalization
// ────────────────────────────────────────────────────────────────────────────

/// Absent means auto. The canonical route compares case-insensitively; the
/// legacy route only accepts the exact string `AUTO`.
fn is_auto_mode(mode: Option<&Value>, envelope: Envelope) -> bool {
    match mode {
        None => true,
        Some(Value::String(s)) => match envelope {
            Envelope::Canonical => s.eq_ignore_ascii_case("auto"),
            Envelope::Legacy => s == "AUTO",
        },
        Some(_) => false,
    }
}

/// Uniform integer in 90..=95.
pub fn random_target_match() -> u8 {
    rand::thread_rng().gen_range(90..=95)
}

/// Numeric value clamped to 70–100. Absent, zero or non-numeric → 85.
pub fn fixed_target_match(value: Option<&Value>) -> u8 {
    let numeric = match value {
        None => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(_) => None,
    };
    match numeric.filter(|n| n.is_finite() && *n != 0.0) {
        Some(n) => n.clamp(TARGET_MATCH_MIN, TARGET_MATCH_MAX).round() as u8,
        None => DEFAULT_TARGET_MATCH,
    }
}

/// An array is taken as-is (blank entries dropped); a string is split on commas.
pub fn parse_must_include_skills(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| value_text(Some(item)))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Model output
// ────────────────────────────────────────────────────────────────────────────

/// The first fenced block if there is one, else the outermost `{...}` span,
/// else the whole text.
pub fn extract_json_payload(content: &str) -> &str {
    if let Some(inner) = FENCED_JSON_RE.captures(content).and_then(|c| c.get(1)) {
        return inner.as_str();
    }
    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => content,
    }
}

fn parse_model_output(content: &str, envelope: Envelope) -> Result<Map<String, Value>, AppError> {
    let parsed: Value = serde_json::from_str(extract_json_payload(content).trim()).map_err(|e| {
        error!("JSON parse error: {e}; content: {content}");
        AppError::ModelOutput("Failed to parse OpenAI response as JSON".to_string())
    })?;

    let invalid = || AppError::ModelOutput("Invalid response structure from OpenAI".to_string());
    let Value::Object(output) = parsed else {
        return Err(invalid());
    };

    let mut required = vec!["filename", "resumeHtml", "addedSkills"];
    if envelope == Envelope::Legacy {
        required.push("metrics");
    }
    if required.iter().any(|key| !is_truthy(output.get(*key))) {
        return Err(invalid());
    }
    Ok(output)
}

/// Leading-integer parse of a number or string: `"95%"` → 95, `92.7` → 92.
pub fn parse_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (sign, digits) = match s.as_bytes().first() {
                Some(b'-') => (-1, &s[1..]),
                Some(b'+') => (1, &s[1..]),
                _ => (1, s),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end].parse::<i64>().ok().map(|n| sign * n)
        }
        _ => None,
    }
}

/// Canonical clamp: unparseable → fallback, then 90–100.
fn clamp_canonical(value: Option<&Value>, fallback: u8) -> u8 {
    parse_int(value)
        .unwrap_or(i64::from(fallback))
        .clamp(90, 100) as u8
}

/// Legacy clamp: unparseable or zero → fallback, then 70–100.
fn clamp_legacy(value: Option<&Value>, fallback: u8) -> u8 {
    parse_int(value)
        .filter(|n| *n != 0)
        .unwrap_or(i64::from(fallback))
        .clamp(70, 100) as u8
}

fn first_present<'a>(metrics: Option<&'a Value>, names: &[&str]) -> Option<&'a Value> {
    let metrics = metrics?;
    names
        .iter()
        .find_map(|name| metrics.get(*name).filter(|v| !v.is_null()))
}

/// Loose truthiness: absent, null, false, 0 and "" are falsy.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Strings verbatim, anything else as its JSON text.
fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
