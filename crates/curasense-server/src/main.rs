mod app;
mod error;
mod routes;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use curasense_core::AiConfig;
use curasense_interaction::GeminiAgent;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AiConfig::load().context("failed to load AI configuration")?;
    let agent = Arc::new(GeminiAgent::from_config(&config)?);

    if !curasense_extraction::ocr::is_available() {
        warn!("tesseract not found on PATH, OCR of image documents will fail");
    }

    let uploads_dir =
        PathBuf::from(std::env::var("CURASENSE_UPLOADS").unwrap_or_else(|_| "uploads".into()));
    tokio::fs::create_dir_all(&uploads_dir)
        .await
        .with_context(|| format!("failed to create uploads dir {}", uploads_dir.display()))?;

    let state = Arc::new(app::AppState::new(agent, uploads_dir));
    let router = app::router(state);

    let addr = std::env::var("CURASENSE_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".into());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, model = %config.model, "curasense listening");

    axum::serve(listener, router).await?;
    Ok(())
}
