pub mod api;
pub mod config;
pub mod db;
pub mod empathy;
pub mod llm;
pub mod monitor;
pub mod safety;
pub mod session;
pub mod triage;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::db::Database;
use crate::llm::gemini::GeminiClient;
use crate::llm::LlmClient;

/// Start the triage service: tracing, config, database, LLM client when
/// keys are configured, then the HTTP server until ctrl-c.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Triara starting v{}", config::APP_VERSION);

    let cfg = config::AppConfig::from_env();
    if let Some(parent) = cfg.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Arc::new(Database::open(&cfg.db_path)?);

    let llm: Option<Arc<dyn LlmClient>> = if cfg.llm_enabled() {
        let client = GeminiClient::new(&cfg.gemini)?;
        tracing::info!(
            model = cfg.gemini.model,
            keys = cfg.gemini.api_keys.len(),
            "LLM client configured"
        );
        Some(Arc::new(client))
    } else {
        tracing::warn!("no Gemini API keys configured, running keyword-only");
        None
    };

    let ctx = ApiContext::new(llm, db, cfg.history_cap);
    let app = api::triage_api_router(ctx);

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Triara stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
