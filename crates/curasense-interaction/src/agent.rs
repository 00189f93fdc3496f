//! The seam between the pipeline and the external AI capability.
//!
//! Components depend on [`CompletionAgent`], not on a concrete client, so
//! the Analyzer and Chat Responder can be exercised against mock agents in
//! tests while production injects the Gemini client constructed once at
//! process start.

use async_trait::async_trait;
use curasense_core::Result;
use serde_json::Value;

/// Completion-reason value for a normally finished generation.
pub const FINISH_STOP: &str = "STOP";

/// An image sent inline with a completion request.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// A single-turn completion request: a prompt, optionally with one inline
/// image.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub image: Option<InlineImage>,
}

impl CompletionRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(prompt: impl Into<String>, image: InlineImage) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}

/// The capability's reply: text payload if any, plus the structured
/// completion metadata used to diagnose blocked or empty generations.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub safety_ratings: Option<Value>,
}

/// Client for the external AI capability: structured text (and optionally
/// an image) in, a [`Completion`] or failure out.
#[async_trait]
pub trait CompletionAgent: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;
}
