//! HTTP mapping of [`CuraError`].
//!
//! Input errors map to 400, everything else to 500. The AI variants carry
//! their diagnostic payload into the wire record:
//! `{error, raw_text?, safety_ratings?}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use curasense_core::CuraError;
use serde_json::json;

pub struct ApiError(pub CuraError);

impl From<CuraError> for ApiError {
    fn from(err: CuraError) -> Self {
        Self(err)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self(CuraError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_input() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let mut body = json!({ "error": self.0.to_string() });
        match &self.0 {
            CuraError::AiMalformed { raw_text, .. } => {
                body["raw_text"] = json!(raw_text);
            }
            CuraError::AiBlocked {
                safety_ratings: Some(ratings),
                ..
            } => {
                body["safety_ratings"] = ratings.clone();
            }
            _ => {}
        }

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}
