//! Chat Responder: free-text questions, optionally grounded in the
//! session's analyzed document.

use std::sync::Arc;

use curasense_core::{CuraError, DocumentContext, Result};
use tracing::debug;

use crate::agent::{CompletionAgent, CompletionRequest};
use crate::prompt;
use crate::recovery::reply_text;

/// Answers user messages with exactly one single-turn completion per call.
/// No conversation state is retained between calls beyond the session's
/// document context, which the caller passes in.
#[derive(Clone)]
pub struct ChatResponder {
    agent: Arc<dyn CompletionAgent>,
}

impl ChatResponder {
    pub fn new(agent: Arc<dyn CompletionAgent>) -> Self {
        Self { agent }
    }

    /// Responds to a user message, grounding the answer in the document
    /// context when one is present.
    pub async fn respond(
        &self,
        message: &str,
        context: Option<&DocumentContext>,
    ) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(CuraError::input("message is required"));
        }

        let prompt = match context {
            Some(ctx) => {
                debug!(filename = %ctx.filename, "answering with document grounding");
                prompt::build_grounded_chat_prompt(message, ctx)
            }
            None => prompt::build_general_chat_prompt(message),
        };

        let completion = self.agent.complete(CompletionRequest::text(prompt)).await?;
        reply_text(&completion)
    }
}
