//! Defensive recovery of structured replies.
//!
//! The external model is instructed to answer with a bare JSON object but
//! is not guaranteed to honor formatting instructions, so parsing is an
//! ordered chain of pure attempts with short-circuit evaluation:
//!
//! 1. reply has no usable text payload: inspect the completion reason and
//!    report a blocked generation with its diagnostics;
//! 2. locate a JSON object, optionally wrapped in a markdown code fence,
//!    and parse the match;
//! 3. parse the entire raw reply as JSON;
//! 4. everything failed: an error record preserving the raw text.

use curasense_core::{CuraError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::agent::{Completion, FINISH_STOP};

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());
static BARE_JSON: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Extracts the usable text payload of a completion.
///
/// A completion without text is classified by its finish reason: anything
/// other than a normal stop is a blocked generation and carries the
/// safety diagnostics along.
pub fn reply_text(completion: &Completion) -> Result<String> {
    match &completion.text {
        Some(text) if !text.trim().is_empty() => Ok(text.clone()),
        _ => {
            let reason = completion
                .finish_reason
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            if reason.eq_ignore_ascii_case(FINISH_STOP) {
                Err(CuraError::transport(
                    "AI reply contained no text payload despite a normal stop",
                ))
            } else {
                Err(CuraError::AiBlocked {
                    reason,
                    safety_ratings: completion.safety_ratings.clone(),
                })
            }
        }
    }
}

/// Recovers a JSON object from a model reply, trying each tier in order.
pub fn recover_json(reply: &str) -> Result<Value> {
    let located = FENCED_JSON
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .or_else(|| BARE_JSON.find(reply).map(|m| m.as_str()));

    if let Some(candidate) = located {
        if let Some(value) = parse_object(candidate) {
            return Ok(value);
        }
    }

    if let Some(value) = parse_object(reply.trim()) {
        return Ok(value);
    }

    Err(CuraError::malformed("No valid JSON found in response", reply))
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(|value| value.is_object())
}
