//! Error types for the Curasense application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Curasense application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. The AI-facing variants carry
/// the diagnostic payload (`raw_text`, `safety_ratings`) that the HTTP layer
/// serializes into the wire error record.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CuraError {
    /// Invalid or missing caller input (no file part, empty message, ...)
    #[error("{0}")]
    Input(String),

    /// The referenced upload does not exist on disk
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Extraction produced no usable text for the document
    #[error("No readable text could be extracted from '{filename}'")]
    NoReadableText { filename: String },

    /// Document extraction error (absorbed into empty text at the
    /// extraction boundary, surfaced only through logs)
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The AI capability refused to generate (safety block, recitation, ...)
    #[error("Response generation was blocked: {reason}")]
    AiBlocked {
        reason: String,
        safety_ratings: Option<serde_json::Value>,
    },

    /// The AI capability replied but no valid JSON could be recovered
    #[error("{message}")]
    AiMalformed { message: String, raw_text: String },

    /// Network or API failure calling the external AI capability
    #[error("AI request failed: {0}")]
    Transport(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CuraError {
    /// Creates an Input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Creates an Extraction error
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Creates an AiMalformed error preserving the raw reply for diagnosis
    pub fn malformed(message: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self::AiMalformed {
            message: message.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Check if this is a caller-input error (maps to HTTP 400)
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Self::Input(_) | Self::FileNotFound { .. } | Self::NoReadableText { .. }
        )
    }

    /// Check if this is an AI-side error (blocked, malformed or transport)
    pub fn is_ai(&self) -> bool {
        matches!(
            self,
            Self::AiBlocked { .. } | Self::AiMalformed { .. } | Self::Transport(_)
        )
    }
}

impl From<std::io::Error> for CuraError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CuraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CuraError>`.
pub type Result<T> = std::result::Result<T, CuraError>;
