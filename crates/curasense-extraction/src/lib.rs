//! Text extraction from uploaded documents.
//!
//! One backend per supported format:
//!
//! - `pdf`: pdf-extract with a lopdf fallback
//! - `docx`: ZIP container + `word/document.xml` parse
//! - `xlsx`: calamine sheet rendering
//! - `ocr`: image preprocessing + tesseract CLI for image uploads
//!
//! The [`extract`] boundary is infallible: any recognized-but-failing path
//! is logged and yields an empty string. Extraction failure is never fatal
//! to the request; it only escalates at the analyze boundary when the
//! resulting text is empty.

pub mod docx;
pub mod ocr;
pub mod pdf;
pub mod xlsx;

use std::path::Path;

use curasense_core::Result;
use tracing::warn;

/// Document categories the pipeline can dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Xlsx,
    Image,
    Unknown,
}

impl DocumentKind {
    /// Classifies a file extension (without the dot, any case).
    pub fn from_extension(extension: &str) -> Self {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "xlsx" => Self::Xlsx,
            "png" | "jpg" | "jpeg" | "bmp" | "tiff" | "tif" => Self::Image,
            _ => Self::Unknown,
        }
    }

    /// Image uploads bypass text extraction and go straight to the
    /// imaging analysis path.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image)
    }
}

/// Extracts plain text from a document, dispatching on its extension.
///
/// Never fails: unsupported types and backend errors are logged and
/// produce an empty string.
pub fn extract(path: &Path, extension: &str) -> String {
    match DocumentKind::from_extension(extension) {
        DocumentKind::Pdf => absorb(pdf::extract(path), path),
        DocumentKind::Docx => absorb(docx::extract(path), path),
        DocumentKind::Xlsx => absorb(xlsx::extract(path), path),
        DocumentKind::Image => absorb(ocr::recognize(path), path),
        DocumentKind::Unknown => {
            warn!(extension, path = %path.display(), "unsupported document type");
            String::new()
        }
    }
}

fn absorb(result: Result<String>, path: &Path) -> String {
    match result {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "extraction failed, returning empty text");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension_classification() {
        assert_eq!(DocumentKind::from_extension("pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_extension("PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_extension(".docx"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_extension("JPEG"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_extension("tif"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_extension("exe"), DocumentKind::Unknown);
        assert!(DocumentKind::from_extension("png").is_image());
        assert!(!DocumentKind::from_extension("xlsx").is_image());
    }

    #[test]
    fn test_extract_unknown_extension_is_empty() {
        let text = extract(Path::new("/tmp/whatever.zzz"), "zzz");
        assert_eq!(text, "");
    }

    #[test]
    fn test_extract_never_fails_on_garbage_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();
        assert_eq!(extract(&path, "pdf"), "");

        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"this is not a workbook").unwrap();
        assert_eq!(extract(&path, "xlsx"), "");

        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"this is not an image").unwrap();
        assert_eq!(extract(&path, "png"), "");
    }

    #[test]
    fn test_extract_missing_file_is_empty() {
        assert_eq!(extract(Path::new("/nonexistent/report.pdf"), "pdf"), "");
    }
}
