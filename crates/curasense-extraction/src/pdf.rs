//! PDF text extraction using pdf-extract (primary) with a lopdf fallback.

use std::path::Path;

use curasense_core::{CuraError, Result};
use tracing::warn;

/// Below this many characters the PDF is likely image-based (scanned).
/// We flag it but still return whatever was found; there is deliberately
/// no automatic OCR fallback for PDFs.
const LIKELY_SCANNED_THRESHOLD: usize = 50;

/// Extracts text from a PDF file.
///
/// Tries pdf-extract first; on error or empty output, walks the pages
/// with lopdf. Both failing is an extraction error, absorbed into empty
/// text by the dispatcher.
pub fn extract(path: &Path) -> Result<String> {
    let text = match pdf_extract::extract_text(path) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!(path = %path.display(), "pdf-extract produced no text, trying lopdf");
            extract_with_lopdf(path)?
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "pdf-extract failed, trying lopdf");
            extract_with_lopdf(path)?
        }
    };

    if text.trim().len() < LIKELY_SCANNED_THRESHOLD {
        warn!(
            path = %path.display(),
            chars = text.trim().len(),
            "very little text extracted, PDF may be image-based"
        );
    }

    Ok(text)
}

/// Fallback extraction: load the document with lopdf and concatenate the
/// text of every page.
fn extract_with_lopdf(path: &Path) -> Result<String> {
    let document = lopdf::Document::load(path)
        .map_err(|e| CuraError::extraction(format!("lopdf failed to load PDF: {e}")))?;

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    if page_numbers.is_empty() {
        return Ok(String::new());
    }

    document
        .extract_text(&page_numbers)
        .map_err(|e| CuraError::extraction(format!("lopdf failed to extract text: {e}")))
}
