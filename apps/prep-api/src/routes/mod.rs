pub mod health;

use axum::{
    http::{header, HeaderValue},
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .merge(resume_routes())
        .with_state(state)
}

/// Fixed CORS headers on every canonical response, preflight included.
/// `OPTIONS` must still reach the handler, so this is not a `CorsLayer`.
async fn cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    response
}

fn resume_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/resumes/generate",
            post(handlers::handle_generate)
                .options(handlers::handle_preflight)
                .fallback(handlers::method_not_allowed),
        )
        .layer(middleware::map_response(cors_headers))
        .route(
            "/api/v1/resumes/generate/legacy",
            post(handlers::handle_generate_legacy).fallback(handlers::legacy_method_not_allowed),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::{CompletionBackend, LlmError};

    struct CannedBackend(&'static str);

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    const REPLY: &str = r#"{"filename": "Priya_Sharma.pdf", "resumeHtml": "<html/>",
        "metrics": {"jdMatch": 96}, "addedSkills": ["SQL"], "roleTitle": "Analyst"}"#;

    fn app(template: Option<&std::path::Path>, backend: Option<&'static str>) -> Router {
        let config = Config {
            resume_template_path: template
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| "/no/such/template.html".into()),
            ..Config::default()
        };
        build_router(AppState {
            config,
            llm: backend.map(|reply| Arc::new(CannedBackend(reply)) as Arc<dyn CompletionBackend>),
        })
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("origin", "https://recruiter.example")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    const VALID: &str = r#"{"candidateId": "C-1", "companyName": "Acme",
        "jobDescription": "Helpdesk analyst", "targetMatchMode": "manual", "targetMatchValue": 91}"#;

    #[tokio::test]
    async fn test_health() {
        let req = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(None, None), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "prep-api");
    }

    #[tokio::test]
    async fn test_generate_success() {
        let tpl = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tpl.path(), "<html>{{CANDIDATE_NAME}}</html>").unwrap();

        let response = app(Some(tpl.path()), Some(REPLY))
            .oneshot(post_json("/api/v1/resumes/generate", VALID))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(body["filename"], "Priya_Sharma.pdf");
        assert_eq!(body["roleTitle"], "Analyst");
        assert_eq!(body["targetMatch"], 91);
        assert_eq!(body["metrics"]["jdMatch"], 96);
        assert_eq!(body["metrics"]["hrCatchiness"], 91);
        assert_eq!(body["metrics"]["atsFriendliness"], 92);
        assert_eq!(body["metrics"]["chancesOfShortlisting"], 93);
        assert_eq!(body["addedSkills"][0], "SQL");
    }

    #[tokio::test]
    async fn test_generate_rejects_get() {
        let req = Request::get("/api/v1/resumes/generate")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(None, None), req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_generate_options_returns_ok() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/v1/resumes/generate")
            .body(Body::empty())
            .unwrap();
        let response = app(None, None).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-methods"],
            "POST, OPTIONS"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_generate_invalid_json() {
        let (status, body) = send(
            app(None, None),
            post_json("/api/v1/resumes/generate", "{ nope"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid JSON body");
    }

    #[tokio::test]
    async fn test_generate_missing_job_description() {
        let (status, body) = send(
            app(None, None),
            post_json(
                "/api/v1/resumes/generate",
                r#"{"candidateId": "C-1", "companyName": "Acme"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"ok": false, "error": "jobDescription is required"}));
    }

    #[tokio::test]
    async fn test_generate_empty_body_is_missing_job_description() {
        let (status, body) = send(app(None, None), post_json("/api/v1/resumes/generate", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "jobDescription is required");
    }

    #[tokio::test]
    async fn test_generate_without_api_key() {
        let (status, body) =
            send(app(None, None), post_json("/api/v1/resumes/generate", VALID)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "OPENAI_API_KEY is not set");
    }

    #[tokio::test]
    async fn test_generate_with_missing_template() {
        let (status, body) = send(
            app(None, Some(REPLY)),
            post_json("/api/v1/resumes/generate", VALID),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Locked template file not found or unreadable");
    }

    #[tokio::test]
    async fn test_legacy_envelope() {
        let tpl = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tpl.path(), "<html/>").unwrap();

        let (status, body) = send(
            app(Some(tpl.path()), Some(REPLY)),
            post_json("/api/v1/resumes/generate/legacy", VALID),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["targetMatch"], 91);
        assert_eq!(body["metrics"]["jdMatch"], 96);
        assert_eq!(body["metrics"]["ats"], 85);
        assert!(body.get("ok").is_none());

        let (status, body) = send(
            app(None, None),
            post_json("/api/v1/resumes/generate/legacy", r#"{"candidateId": "C-1"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({"error": "Missing required fields: candidateId, companyName, jobDescription"})
        );
    }

    #[tokio::test]
    async fn test_legacy_rejects_get() {
        let req = Request::get("/api/v1/resumes/generate/legacy")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(None, None), req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, serde_json::json!({"error": "Method not allowed"}));
    }
}
