//! DOCX text extraction.
//!
//! A .docx file is a ZIP container whose main document part is
//! `word/document.xml`. We stream that XML with quick-xml and collect the
//! text of every non-empty `w:p` paragraph, in document order,
//! newline-joined.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use curasense_core::{CuraError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Extracts paragraph text from a DOCX file.
pub fn extract(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| CuraError::extraction(format!("failed to open DOCX container: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| CuraError::extraction(format!("DOCX has no document part: {e}")))?
        .read_to_string(&mut xml)?;

    collect_paragraphs(&xml)
}

/// Collects the text content of every `w:p` element, skipping paragraphs
/// that end up empty after trimming.
pub(crate) fn collect_paragraphs(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:p" => {
                in_paragraph = true;
                current.clear();
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => {
                if in_paragraph && !current.trim().is_empty() {
                    paragraphs.push(current.trim().to_string());
                }
                in_paragraph = false;
            }
            Ok(Event::Text(t)) if in_paragraph => {
                let text = t
                    .unescape()
                    .map_err(|e| CuraError::extraction(format!("DOCX XML unescape error: {e}")))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(CuraError::extraction(format!("DOCX XML parse error: {e}")));
            }
        }
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Patient has mild hypertension.</w:t></w:r></w:p>
    <w:p></w:p>
    <w:p><w:r><w:t>Follow-up in </w:t></w:r><w:r><w:t>two weeks.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn write_docx(path: &Path) {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(DOCUMENT_XML.as_bytes()).unwrap();
        let cursor = zip.finish().unwrap();
        std::fs::write(path, cursor.into_inner()).unwrap();
    }

    #[test]
    fn test_collect_paragraphs_skips_empty_and_keeps_order() {
        let text = collect_paragraphs(DOCUMENT_XML).unwrap();
        assert_eq!(
            text,
            "Patient has mild hypertension.\nFollow-up in two weeks."
        );
    }

    #[test]
    fn test_extract_from_docx_container() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.docx");
        write_docx(&path);

        let text = extract(&path).unwrap();
        assert!(text.starts_with("Patient has mild hypertension."));
        assert!(text.ends_with("two weeks."));
    }

    #[test]
    fn test_extract_non_zip_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.docx");
        std::fs::write(&path, b"plain bytes").unwrap();

        assert!(extract(&path).is_err());
    }
}
