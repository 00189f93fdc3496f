//! Structured Analyzer: document text or image in, fixed-schema report out.

use std::io::Cursor;
use std::sync::Arc;

use curasense_core::{CuraError, ImagingReport, Result, TextReport};
use image::ImageFormat;
use tracing::{info, warn};

use crate::agent::{CompletionAgent, CompletionRequest, InlineImage};
use crate::prompt::{self, MAX_ANALYSIS_CHARS};
use crate::recovery::{recover_json, reply_text};

/// Turns extracted document text (or raw image bytes) into a fixed-schema
/// report via the injected AI capability.
///
/// Guarantee: a malformed AI reply never propagates as a crash; every call
/// yields either a well-formed report or a typed error carrying the raw
/// reply for diagnosis.
#[derive(Clone)]
pub struct Analyzer {
    agent: Arc<dyn CompletionAgent>,
}

impl Analyzer {
    pub fn new(agent: Arc<dyn CompletionAgent>) -> Self {
        Self { agent }
    }

    /// Analyzes extracted document text, capping it to the input budget.
    pub async fn analyze_text(&self, text: &str) -> Result<TextReport> {
        let (capped, truncated) = prompt::truncate_chars(text, MAX_ANALYSIS_CHARS);
        if truncated {
            warn!(
                original_chars = text.chars().count(),
                cap = MAX_ANALYSIS_CHARS,
                "document text truncated before analysis"
            );
        }

        let request = CompletionRequest::text(prompt::build_report_prompt(capped));
        let completion = self.agent.complete(request).await?;
        let reply = reply_text(&completion)?;
        let value = recover_json(&reply)?;

        serde_json::from_value(value).map_err(|e| {
            CuraError::malformed(format!("Reply did not match the report schema: {e}"), reply)
        })
    }

    /// Analyzes a medical image. The bytes are decoded, normalized to RGB
    /// and re-encoded as JPEG before transmission; undecodable bytes fail
    /// here, before any network call.
    pub async fn analyze_image(&self, bytes: &[u8]) -> Result<ImagingReport> {
        let image = prepare_inline_image(bytes)?;
        info!(encoded_bytes = image.data.len(), "sending image for analysis");

        let request = CompletionRequest::with_image(prompt::build_imaging_prompt(), image);
        let completion = self.agent.complete(request).await?;
        let reply = reply_text(&completion)?;
        let value = recover_json(&reply)?;

        serde_json::from_value(value).map_err(|e| {
            CuraError::malformed(format!("Reply did not match the report schema: {e}"), reply)
        })
    }
}

/// Decodes uploaded image bytes, normalizes to 3-channel RGB and
/// re-encodes as compact JPEG.
pub(crate) fn prepare_inline_image(bytes: &[u8]) -> Result<InlineImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CuraError::input(format!("Failed to process image data: {e}")))?;

    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    rgb.write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| CuraError::input(format!("Failed to process image data: {e}")))?;

    Ok(InlineImage {
        mime_type: "image/jpeg".to_string(),
        data: buffer.into_inner(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Completion;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Agent double that records the request and returns a canned reply.
    struct MockAgent {
        reply: Completion,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl MockAgent {
        fn replying(text: &str) -> Self {
            Self {
                reply: Completion {
                    text: Some(text.to_string()),
                    finish_reason: Some("STOP".into()),
                    safety_ratings: None,
                },
                seen: Mutex::new(Vec::new()),
            }
        }

        fn blocked(reason: &str) -> Self {
            Self {
                reply: Completion {
                    text: None,
                    finish_reason: Some(reason.into()),
                    safety_ratings: Some(serde_json::json!([])),
                },
                seen: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionAgent for MockAgent {
        async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
            self.seen.lock().unwrap().push(request);
            Ok(self.reply.clone())
        }
    }

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 10, 10]));
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[tokio::test]
    async fn test_analyze_text_parses_report() {
        let agent = Arc::new(MockAgent::replying(
            r#"{"summary": "Routine labs", "diagnosis": "hypertension", "key_findings": ["BP 150/95"]}"#,
        ));
        let analyzer = Analyzer::new(agent.clone());

        let report = analyzer
            .analyze_text("Patient has mild hypertension.")
            .await
            .unwrap();
        assert_eq!(report.diagnosis.as_deref(), Some("hypertension"));
        assert_eq!(report.key_findings, vec!["BP 150/95".to_string()]);

        let requests = agent.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("Patient has mild hypertension."));
        assert!(requests[0].image.is_none());
    }

    #[tokio::test]
    async fn test_analyze_text_truncates_to_budget() {
        let agent = Arc::new(MockAgent::replying(r#"{"summary": "big"}"#));
        let analyzer = Analyzer::new(agent.clone());

        let text = "a".repeat(MAX_ANALYSIS_CHARS + 500);
        analyzer.analyze_text(&text).await.unwrap();

        let prompt = &agent.requests()[0].prompt;
        let sent = prompt.chars().filter(|&c| c == 'a').count();
        // Only the capped document contributes 'a' runs of this size.
        assert!(sent >= MAX_ANALYSIS_CHARS);
        assert!(sent < MAX_ANALYSIS_CHARS + 100);
    }

    #[tokio::test]
    async fn test_analyze_text_fenced_reply() {
        let agent = Arc::new(MockAgent::replying(
            "```json\n{\"summary\": \"ok\", \"diagnosis\": null}\n```",
        ));
        let analyzer = Analyzer::new(agent);

        let report = analyzer.analyze_text("text").await.unwrap();
        assert_eq!(report.summary.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_analyze_text_prose_reply_preserves_raw_text() {
        let agent = Arc::new(MockAgent::replying("Sorry, I cannot help."));
        let analyzer = Analyzer::new(agent);

        match analyzer.analyze_text("text").await {
            Err(CuraError::AiMalformed { raw_text, .. }) => {
                assert_eq!(raw_text, "Sorry, I cannot help.");
            }
            other => panic!("Expected AiMalformed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_text_blocked_generation() {
        let agent = Arc::new(MockAgent::blocked("SAFETY"));
        let analyzer = Analyzer::new(agent);

        match analyzer.analyze_text("text").await {
            Err(CuraError::AiBlocked { reason, .. }) => assert_eq!(reason, "SAFETY"),
            other => panic!("Expected AiBlocked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_image_corrupt_bytes_skips_network() {
        let agent = Arc::new(MockAgent::replying("{}"));
        let analyzer = Analyzer::new(agent.clone());

        match analyzer.analyze_image(b"definitely not an image").await {
            Err(CuraError::Input(message)) => {
                assert!(message.starts_with("Failed to process image data:"));
            }
            other => panic!("Expected Input error, got {other:?}"),
        }
        assert!(agent.requests().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_image_sends_jpeg_inline() {
        let agent = Arc::new(MockAgent::replying(
            r#"{"summary": "Chest X-ray", "anatomical_structures": ["ribs"]}"#,
        ));
        let analyzer = Analyzer::new(agent.clone());

        let report = analyzer.analyze_image(&tiny_png()).await.unwrap();
        assert_eq!(report.summary, "Chest X-ray");
        assert_eq!(report.anatomical_structures, vec!["ribs".to_string()]);

        let requests = agent.requests();
        let image = requests[0].image.as_ref().unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        // JPEG SOI marker: the upload was re-encoded, not passed through.
        assert_eq!(&image.data[..2], &[0xFF, 0xD8]);
    }
}
