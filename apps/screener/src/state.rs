use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionModel;
use crate::screening::notifier::Mailer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-run data; each screening builds its own session.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Completion backend. `LlmClient` in production.
    pub llm: Arc<dyn CompletionModel>,
    /// Mail relay. `SmtpMailer` in production.
    pub mailer: Arc<dyn Mailer>,
}
