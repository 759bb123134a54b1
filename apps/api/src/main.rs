mod catalog;
mod config;
mod errors;
mod genotype;
mod llm_client;
mod models;
mod report;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{CompletionService, LlmClient, LlmSettings};
use crate::report::generator::ReportGenerator;
use crate::report::store::{RedisBackend, ReportStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting StrataHelix API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Tier catalog v{} loaded ({} tiers)",
        catalog::CATALOG_VERSION,
        catalog::all_tiers().len()
    );

    // Initialize completion service (optional: absent key means demo-mode reports)
    let completion = build_completion_service(&config)?;
    let generator = ReportGenerator::new(completion, config.prompt_mode, config.max_prompt_chars);
    info!(
        "Report generator ready (live: {}, prompt mode: {:?})",
        generator.is_configured(),
        generator.prompt_mode()
    );

    // Initialize report store
    let store = build_report_store(&config)?;

    // Build app state
    let state = AppState {
        generator,
        store,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the completion client, or `None` when no credential is configured.
fn build_completion_service(config: &Config) -> Result<Option<Arc<dyn CompletionService>>> {
    let Some(api_key) = config.anthropic_api_key.clone() else {
        warn!("ANTHROPIC_API_KEY missing – report generation disabled, returning demo reports");
        return Ok(None);
    };

    let llm = LlmClient::new(
        api_key,
        LlmSettings {
            model: config.llm_model.clone(),
            max_tokens: config.llm_max_tokens,
            timeout: Duration::from_secs(config.llm_timeout_secs),
        },
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    Ok(Some(Arc::new(llm)))
}

/// Redis-backed when `REDIS_URL` is set, in-memory otherwise.
fn build_report_store(config: &Config) -> Result<ReportStore> {
    match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            Ok(ReportStore::new(Arc::new(RedisBackend::new(
                client,
                config.report_store_key.clone(),
            ))))
        }
        None => {
            info!("REDIS_URL not set – report history is kept in memory");
            Ok(ReportStore::in_memory())
        }
    }
}
