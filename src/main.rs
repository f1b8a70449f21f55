use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clippy_reader::completion::OpenAiClient;
use clippy_reader::config::ServerConfig;
use clippy_reader::face::{AppState, build_router};
use clippy_reader::feed::{FeedService, default_sources};
use clippy_reader::services::Services;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();

    let backend = OpenAiClient::new(&config.openai_api_key, config.api_timeout())?
        .with_base_url(&config.openai_base_url)
        .with_model(&config.openai_model);
    let http = reqwest::Client::builder()
        .timeout(config.api_timeout())
        .build()
        .context("failed to build HTTP client")?;

    let services = Arc::new(Services::new(Arc::new(backend), http.clone()));
    let feed = Arc::new(FeedService::new(
        http,
        default_sources(),
        config.feed_cache_ttl(),
        services.article.clone(),
    ));

    let app = build_router(AppState {
        services,
        feed,
        expose_error_details: config.is_development(),
    });

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not bind to {addr}"))?;

    info!(
        %addr,
        model = %config.openai_model,
        development = config.is_development(),
        "Clippy Reader listening at http://{addr}"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
