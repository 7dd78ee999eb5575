mod config;
mod errors;
mod llm_client;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::notifier::SmtpMailer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV screener v{}", env!("CARGO_PKG_VERSION"));

    // API keys arrive with each submission; the client only carries endpoint and model.
    let llm = LlmClient::new(&config.llm_api_base, config.llm_model.clone())?;
    info!(
        "LLM client initialized (model: {}, base: {})",
        llm.model(),
        config.llm_api_base
    );

    let mailer = SmtpMailer::new(config.smtp_host.clone(), config.smtp_port);
    info!(
        "SMTP relay configured ({}:{})",
        config.smtp_host, config.smtp_port
    );

    let state = AppState {
        config: config.clone(),
        llm: Arc::new(llm),
        mailer: Arc::new(mailer),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
