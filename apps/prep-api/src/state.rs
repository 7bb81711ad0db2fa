use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when `OPENAI_API_KEY` is unset; handlers answer 500 per request.
    pub llm: Option<Arc<dyn CompletionBackend>>,
}
