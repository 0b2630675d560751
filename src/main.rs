mod config;
mod error;
mod llm;
mod model;
mod rate_limit;
mod routes;
mod seed;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::llm::LlmGenerate;
use crate::state::AppState;

const DEFAULT_LOG_FILTER: &str = "ecoclear=info,tower_http=info";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    // Non-fatal: classification falls back and the copilot answers "busy".
    let llm: Option<Arc<dyn LlmGenerate>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(
                vision = client.model(llm::types::ModelTier::Vision),
                chat = client.model(llm::types::ModelTier::Chat),
                "LLM client initialized"
            );
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured, AI features use fallbacks");
            None
        }
    };

    let addr = config.bind_addr();
    let state = if config.seed {
        tracing::info!("loading demo records");
        AppState::with_store(config, llm, seed::demo_store())
    } else {
        AppState::new(config, llm)
    };

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "ecoclear listening");
    axum::serve(listener, app).await?;
    Ok(())
}
