use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use leadbridge::config::AppConfig;
use leadbridge::handlers;
use leadbridge::services::ai::gemini::GeminiProvider;
use leadbridge::services::crm::CrmHttpClient;
use leadbridge::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.to_lowercase().into()),
        )
        .init();

    anyhow::ensure!(
        !config.gemini_api_key.is_empty(),
        "GEMINI_API_KEY must be set"
    );
    tracing::info!(model = %config.gemini_model, "using Gemini LLM provider");
    tracing::info!(base_url = %config.crm_base_url, "using CRM at base URL");

    let llm = GeminiProvider::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    let crm = CrmHttpClient::new(config.crm_base_url.clone())?;

    let state = Arc::new(AppState {
        config: config.clone(),
        llm: Box::new(llm),
        crm: Box::new(crm),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/bot/handle", post(handlers::bot::handle_bot_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
