//! Application state and router assembly.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use curasense_interaction::{Analyzer, ChatResponder, CompletionAgent};

use crate::routes;
use crate::session::SessionRegistry;

/// Shared state of the server: the pipeline components built around one
/// injected completion agent, plus the session registry and upload
/// directory.
pub struct AppState {
    pub analyzer: Analyzer,
    pub responder: ChatResponder,
    pub sessions: SessionRegistry,
    pub uploads_dir: PathBuf,
}

impl AppState {
    pub fn new(agent: Arc<dyn CompletionAgent>, uploads_dir: PathBuf) -> Self {
        Self {
            analyzer: Analyzer::new(agent.clone()),
            responder: ChatResponder::new(agent),
            sessions: SessionRegistry::new(),
            uploads_dir,
        }
    }
}

/// Builds the HTTP surface of the pipeline.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/upload", post(routes::upload))
        .route("/analyze", post(routes::analyze))
        .route("/api/chat", post(routes::chat))
        .with_state(state)
}
