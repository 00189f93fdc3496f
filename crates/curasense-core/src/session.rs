//! Session document context.
//!
//! Each user session holds at most one analyzed document, used to ground
//! chat answers. The slot is cleared before every upload and every analyze
//! call so a failed or in-flight analysis never leaves stale context
//! visible to chat.

use serde::{Deserialize, Serialize};

/// The most recently analyzed document of a session: extracted text plus
/// the original filename.
///
/// Presence implies the document was text-extractable and non-empty; image
/// analyses never produce a context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentContext {
    pub text: String,
    pub filename: String,
}

/// Single-slot store for a session's [`DocumentContext`].
///
/// Invariant: the slot never holds two documents' text simultaneously —
/// `set` silently replaces any prior value.
#[derive(Debug, Default)]
pub struct ContextSlot {
    current: Option<DocumentContext>,
}

impl ContextSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the slot. Idempotent: clearing an empty slot is a no-op.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Stores a document, replacing whatever was there before.
    pub fn set(&mut self, text: impl Into<String>, filename: impl Into<String>) {
        self.current = Some(DocumentContext {
            text: text.into(),
            filename: filename.into(),
        });
    }

    /// Returns the current document context, if any.
    pub fn get(&self) -> Option<&DocumentContext> {
        self.current.as_ref()
    }
}
