//! OCR for image uploads.
//!
//! Preprocesses the image (grayscale, median blur, Otsu threshold, one
//! dilate + erode pass) and runs the `tesseract` CLI on the result:
//! first with `--psm 6` (single uniform block of text), retrying once with
//! `--psm 3` (fully automatic page segmentation) if that yields nothing.
//!
//! If the cleanup pipeline cannot be applied the plain grayscale image is
//! used instead; if the image cannot be decoded at all, OCR is skipped.

use std::path::Path;
use std::process::Command;

use curasense_core::{CuraError, Result};
use image::GrayImage;
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::distance_transform::Norm;
use imageproc::filter::median_filter;
use imageproc::morphology::{dilate, erode};
use tempfile::NamedTempFile;
use tracing::warn;

/// Single uniform block of text.
const PSM_SINGLE_BLOCK: &str = "6";
/// Fully automatic page segmentation.
const PSM_AUTO: &str = "3";

/// Check if the tesseract binary is available on the system.
pub fn is_available() -> bool {
    Command::new("tesseract")
        .arg("--version")
        .output()
        .map(|o| o.status.success() || !o.stderr.is_empty())
        .unwrap_or(false)
}

/// Runs OCR on an image file and returns the recognized text, or an empty
/// string when both segmentation modes come back blank.
pub fn recognize(path: &Path) -> Result<String> {
    let input = prepare_input(path)?;

    let first = run_tesseract(input.path(), PSM_SINGLE_BLOCK)?;
    if !first.trim().is_empty() {
        return Ok(first.trim().to_string());
    }

    let second = run_tesseract(input.path(), PSM_AUTO)?;
    Ok(second.trim().to_string())
}

/// Decodes and preprocesses the image, writing the result to a temporary
/// PNG for the CLI call.
fn prepare_input(path: &Path) -> Result<NamedTempFile> {
    let decoded = image::open(path)
        .map_err(|e| CuraError::extraction(format!("failed to decode image: {e}")))?;
    let gray = decoded.to_luma8();

    match write_temp_png(&clean_for_ocr(&gray)) {
        Ok(file) => Ok(file),
        Err(err) => {
            // Preprocessed output could not be written; retry with the
            // plain grayscale image before giving up.
            warn!(error = %err, "preprocessed image unusable, falling back to grayscale");
            write_temp_png(&gray)
        }
    }
}

/// Denoise, binarize and clean the image for recognition.
fn clean_for_ocr(gray: &GrayImage) -> GrayImage {
    let denoised = median_filter(gray, 1, 1);
    let level = otsu_level(&denoised);
    let binary = threshold(&denoised, level, ThresholdType::Binary);
    let dilated = dilate(&binary, Norm::L1, 1);
    erode(&dilated, Norm::L1, 1)
}

fn write_temp_png(image: &GrayImage) -> Result<NamedTempFile> {
    let file = tempfile::Builder::new().suffix(".png").tempfile()?;
    image
        .save(file.path())
        .map_err(|e| CuraError::extraction(format!("failed to write OCR input: {e}")))?;
    Ok(file)
}

/// Runs the tesseract CLI with the given page segmentation mode.
fn run_tesseract(input: &Path, psm: &str) -> Result<String> {
    let output = Command::new("tesseract")
        .arg(input)
        .arg("stdout")
        .arg("--psm")
        .arg(psm)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CuraError::extraction(
                    "tesseract not found. Install it: brew install tesseract (macOS) or apt install tesseract-ocr (Linux)",
                )
            } else {
                CuraError::extraction(format!("tesseract failed to start: {e}"))
            }
        })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CuraError::extraction(format!(
            "tesseract exited with code {code}: {stderr}"
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_is_available_answers_without_panicking() {
        // Environment-dependent either way; the startup check must only
        // ever report, never fail.
        let _ = is_available();
    }

    #[test]
    fn test_recognize_undecodable_image_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"\x89PNG but truncated").unwrap();

        assert!(recognize(&path).is_err());
    }

    #[test]
    fn test_clean_for_ocr_produces_binary_output() {
        // Half dark, half light image should binarize to two levels.
        let gray = GrayImage::from_fn(16, 16, |x, _| {
            if x < 8 { Luma([30u8]) } else { Luma([220u8]) }
        });
        let cleaned = clean_for_ocr(&gray);
        assert_eq!(cleaned.dimensions(), (16, 16));
        assert!(cleaned.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }
}
