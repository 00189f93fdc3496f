//! Prompt construction and input budgets.

use curasense_core::DocumentContext;

/// Hard cap on document text sent for structured analysis.
pub const MAX_ANALYSIS_CHARS: usize = 100_000;
/// Hard cap on document text embedded in a chat grounding prompt.
pub const MAX_CONTEXT_CHARS: usize = 50_000;
/// Appended to chat context when the document text was cut.
pub const TRUNCATION_MARKER: &str = "\n[... document truncated ...]";

/// JSON contract for textual documents, embedded literally in the prompt.
pub(crate) const TEXT_REPORT_SCHEMA: &str = r#"{
  "summary": string | null,
  "diagnosis": string | null,
  "key_findings": [string],
  "causes": [string] | null,
  "recommendations": string | null,
  "precautions": [string],
  "remedies": [string],
  "important_notes": string | null,
  "treatment_plan": string | null,
  "lifestyle_changes": [string],
  "urgent_concerns": string | null
}"#;

/// JSON contract for medical images.
pub(crate) const IMAGING_REPORT_SCHEMA: &str = r#"{
  "summary": string,
  "diagnosis": string | null,
  "key_findings": [string],
  "precautions": [string] | null,
  "remedies": [string] | null,
  "urgent_concerns": string | null,
  "anatomical_structures": [string]
}"#;

/// Truncates to at most `cap` characters, on a character boundary.
/// Returns the capped slice and whether anything was cut.
pub fn truncate_chars(text: &str, cap: usize) -> (&str, bool) {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Structured-analysis prompt for extracted document text.
pub(crate) fn build_report_prompt(text: &str) -> String {
    format!(
        "You are a careful medical document analyst. Analyze the medical document \
below and produce a structured summary for the patient.\n\n\
Respond with ONLY a single JSON object matching exactly this schema:\n\
{TEXT_REPORT_SCHEMA}\n\n\
Rules:\n\
- If a field is not present in the document, use null (or an empty list for list fields). Never fabricate values.\n\
- Output only the JSON object. No prose, no explanations, no markdown code fences.\n\n\
Document text:\n{text}"
    )
}

/// Structured-analysis prompt for a medical image sent inline.
pub(crate) fn build_imaging_prompt() -> String {
    format!(
        "You are a careful medical imaging analyst. Examine the attached medical \
image and produce a structured summary for the patient.\n\n\
Respond with ONLY a single JSON object matching exactly this schema:\n\
{IMAGING_REPORT_SCHEMA}\n\n\
Rules:\n\
- If something cannot be determined from the image, use null (or an empty list for list fields). Never fabricate values.\n\
- Output only the JSON object. No prose, no explanations, no markdown code fences."
    )
}

/// Chat prompt grounded in the session's analyzed document.
pub(crate) fn build_grounded_chat_prompt(message: &str, context: &DocumentContext) -> String {
    let (text, truncated) = truncate_chars(&context.text, MAX_CONTEXT_CHARS);
    let marker = if truncated { TRUNCATION_MARKER } else { "" };
    format!(
        "You are a helpful medical assistant. The user previously uploaded a \
document named \"{filename}\"; its extracted text is below.\n\n\
--- Document: {filename} ---\n{text}{marker}\n--- End of document ---\n\n\
Instructions:\n\
- Prefer answering from the document when it is relevant to the question.\n\
- State clearly when an answer is drawn from the document.\n\
- Fall back to general medical knowledge when the document does not cover the question.\n\
- If neither the document nor general knowledge answers the question, say so plainly.\n\n\
User question: {message}",
        filename = context.filename,
    )
}

/// Chat prompt without any document context.
pub(crate) fn build_general_chat_prompt(message: &str) -> String {
    format!(
        "You are a helpful medical assistant. Answer from general medical \
knowledge, and admit uncertainty when you do not know.\n\n\
User question: {message}"
    )
}
