//! Curasense interaction layer: the completion-agent seam, the Gemini
//! REST client, and the components built on top of it (Structured
//! Analyzer, Chat Responder, defensive JSON recovery).

pub mod agent;
pub mod analyzer;
pub mod chat;
pub mod gemini;
pub mod prompt;
pub mod recovery;

pub use agent::{Completion, CompletionAgent, CompletionRequest, InlineImage};
pub use analyzer::Analyzer;
pub use chat::ChatResponder;
pub use gemini::GeminiAgent;
