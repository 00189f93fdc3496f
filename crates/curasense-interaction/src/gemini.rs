//! GeminiAgent - direct REST API implementation of [`CompletionAgent`].
//!
//! Calls the Gemini `generateContent` endpoint with the prompt text and,
//! for imaging analysis, one inline base64 image part. The structured
//! completion metadata (`finishReason`, `safetyRatings`) is surfaced so
//! callers can distinguish a blocked generation from an empty one.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use curasense_core::{AiConfig, CuraError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::agent::{Completion, CompletionAgent, CompletionRequest};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Agent implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiAgent {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Creates an agent from resolved configuration, with a bounded
    /// request timeout.
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CuraError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_body(request: &CompletionRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: request.prompt.clone(),
        }];

        if let Some(image) = &request.image {
            parts.push(Part::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: image.mime_type.clone(),
                    data: BASE64_STANDARD.encode(&image.data),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
        }
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<Completion> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| CuraError::transport(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| CuraError::transport(format!("Failed to parse Gemini response: {err}")))?;

        Ok(into_completion(parsed))
    }
}

#[async_trait]
impl CompletionAgent for GeminiAgent {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let body = Self::build_body(&request);
        self.send_request(&body).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
    #[serde(rename = "safetyRatings")]
    safety_ratings: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Option<Vec<PartResponse>>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
    #[serde(rename = "safetyRatings")]
    safety_ratings: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn into_completion(response: GenerateContentResponse) -> Completion {
    if let Some(candidate) = response
        .candidates
        .and_then(|mut candidates| (!candidates.is_empty()).then(|| candidates.remove(0)))
    {
        let text = candidate
            .content
            .and_then(|content| content.parts)
            .map(|parts| {
                parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty());

        return Completion {
            text,
            finish_reason: candidate.finish_reason,
            safety_ratings: candidate.safety_ratings,
        };
    }

    // No candidates at all: the prompt itself was rejected.
    let feedback = response.prompt_feedback;
    Completion {
        text: None,
        finish_reason: feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or(Some("NO_CANDIDATES".to_string())),
        safety_ratings: feedback.and_then(|f| f.safety_ratings),
    }
}

fn map_http_error(status: StatusCode, body: String) -> CuraError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    CuraError::transport(format!("Gemini API error ({status}): {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_completion_joins_parts_and_keeps_metadata() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"parts": [{"text": "{\"summary\""}, {"text": ": null}"}]},
                    "finishReason": "STOP",
                    "safetyRatings": [{"category": "HARM_CATEGORY_MEDICAL", "probability": "LOW"}]
                }]
            }"#,
        )
        .unwrap();

        let completion = into_completion(response);
        assert_eq!(completion.text.as_deref(), Some("{\"summary\": null}"));
        assert_eq!(completion.finish_reason.as_deref(), Some("STOP"));
        assert!(completion.safety_ratings.is_some());
    }

    #[test]
    fn test_into_completion_without_candidates_reports_block() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"promptFeedback": {"blockReason": "SAFETY", "safetyRatings": []}}"#,
        )
        .unwrap();

        let completion = into_completion(response);
        assert_eq!(completion.text, None);
        assert_eq!(completion.finish_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_map_http_error_reads_structured_body() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": {"message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#.into(),
        );
        let text = err.to_string();
        assert!(text.contains("RESOURCE_EXHAUSTED"));
        assert!(text.contains("quota exceeded"));
    }

    #[test]
    fn test_request_body_serializes_inline_image() {
        let request = CompletionRequest::with_image(
            "describe",
            crate::agent::InlineImage {
                mime_type: "image/jpeg".into(),
                data: vec![1, 2, 3],
            },
        );
        let body = GeminiAgent::build_body(&request);
        let json = serde_json::to_value(&body.contents).unwrap();
        let parts = &json[0]["parts"];
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
    }
}
