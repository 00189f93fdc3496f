//! Route handlers: upload, analyze and chat.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use axum_extra::extract::cookie::CookieJar;
use curasense_core::CuraError;
use curasense_extraction::DocumentKind;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::session;

/// `POST /upload` — stores the multipart file and clears the session's
/// document context so stale text never survives a new upload.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let (session_id, jar) = session::session_id(jar);

    // Stale context must not survive a new upload, even one that fails
    // before a file is stored.
    let slot = state.sessions.slot(&session_id).await;
    slot.lock().await.clear();

    let mut saved: Option<(PathBuf, String)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CuraError::input(format!("invalid multipart payload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(sanitize_filename)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CuraError::input("no file selected"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| CuraError::input(format!("failed to read upload: {e}")))?;

        let stored = state
            .uploads_dir
            .join(format!("{}_{}", Uuid::new_v4(), filename));
        tokio::fs::write(&stored, &bytes).await?;
        saved = Some((stored, filename));
        break;
    }

    let (path, filename) = saved.ok_or_else(|| CuraError::input("no file part in request"))?;

    info!(%filename, path = %path.display(), "file uploaded");
    Ok((
        jar,
        Json(json!({
            "message": "File uploaded successfully",
            "file_path": path.to_string_lossy(),
            "filename": filename,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub file_path: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// `POST /analyze` — dispatches the uploaded document through extraction
/// and structured analysis.
///
/// The session mutex is held across clear → extract → analyze → set, so a
/// racing chat call on the same session sees either the previous context
/// or the new one, never the gap in between.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<AnalyzeRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let (session_id, jar) = session::session_id(jar);

    let path = PathBuf::from(&request.file_path);
    if !path.is_file() {
        return Err(CuraError::FileNotFound {
            path: request.file_path,
        }
        .into());
    }

    let filename = request.filename.unwrap_or_else(|| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();

    let slot = state.sessions.slot(&session_id).await;
    let mut slot = slot.lock().await;
    slot.clear();

    if DocumentKind::from_extension(&extension).is_image() {
        // Images go straight to the vision path and never populate the
        // session context.
        let bytes = tokio::fs::read(&path).await?;
        let report = state.analyzer.analyze_image(&bytes).await?;
        let body = serde_json::to_value(report).map_err(CuraError::from)?;
        return Ok((jar, Json(body)));
    }

    let text = {
        let path = path.clone();
        let extension = extension.clone();
        tokio::task::spawn_blocking(move || curasense_extraction::extract(&path, &extension))
            .await
            .map_err(|e| CuraError::internal(format!("extraction task failed: {e}")))?
    };

    if text.trim().is_empty() {
        return Err(CuraError::NoReadableText { filename }.into());
    }

    let report = state.analyzer.analyze_text(&text).await?;
    slot.set(text, filename);

    let body = serde_json::to_value(report).map_err(CuraError::from)?;
    Ok((jar, Json(body)))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/chat` — answers a free-text question, grounded in the
/// session's analyzed document when one exists.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<ChatRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let (session_id, jar) = session::session_id(jar);

    let message = request.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(CuraError::input("message is required").into());
    }

    let slot = state.sessions.slot(&session_id).await;
    let context = slot.lock().await.get().cloned();

    let answer = state.responder.respond(&message, context.as_ref()).await?;
    Ok((jar, Json(json!({ "response": answer }))))
}

fn sanitize_filename(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
