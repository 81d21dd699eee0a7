//! Text extraction: pull page-delimited text out of the source PDF.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread so the Tokio workers never stall on CPU-bound extraction.
//!
//! ## Per-page failure policy
//!
//! A page whose text cannot be read gets a fixed placeholder body instead of
//! aborting the run. The placeholder keeps the marker count equal to the PDF
//! page count, so every downstream count invariant still holds; the page
//! simply narrates as "could not be extracted".

use crate::error::LectureError;
use crate::marker;
use pdfium_render::prelude::*;
use std::fmt::Write as _;
use tracing::{debug, info, warn};

/// Placeholder body for a page whose text could not be read.
pub const PAGE_PLACEHOLDER: &str = "[text for this page could not be extracted]";

/// Extracted document text plus the page count it was built from.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Marker-delimited text, one segment per PDF page.
    pub text: String,
    pub page_count: usize,
}

/// Extract marker-delimited text from PDF bytes.
pub async fn extract_text(pdf: Vec<u8>) -> Result<ExtractedText, LectureError> {
    tokio::task::spawn_blocking(move || extract_text_blocking(&pdf))
        .await
        .map_err(|e| LectureError::Internal(format!("extraction task panicked: {e}")))?
}

/// Blocking implementation of text extraction.
fn extract_text_blocking(pdf: &[u8]) -> Result<ExtractedText, LectureError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| LectureError::InvalidPdf {
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    if page_count == 0 {
        return Err(LectureError::EmptyDocument);
    }
    info!("PDF loaded: {} pages", page_count);

    let results: Vec<Result<String, String>> =
        (0..page_count).map(|idx| read_page(&pages, idx)).collect();
    let text = assemble_pages(&results);

    debug!("Extracted {} chars from {} pages", text.len(), page_count);
    Ok(ExtractedText { text, page_count })
}

/// Read one page's text, reporting failure as a detail string.
fn read_page(pages: &PdfPages<'_>, idx: usize) -> Result<String, String> {
    let page = pages.get(idx as u16).map_err(|e| format!("load: {e:?}"))?;
    let text = page.text().map_err(|e| format!("text: {e:?}"))?;
    Ok(text.all())
}

/// Join per-page results into one marker-delimited string.
///
/// Failed or blank pages get [`PAGE_PLACEHOLDER`] as their body, so the
/// output always carries exactly one marker per input page.
fn assemble_pages(results: &[Result<String, String>]) -> String {
    let mut out = String::new();
    for (idx, result) in results.iter().enumerate() {
        let body = match result {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("Page {}: no extractable text; using placeholder", idx + 1);
                PAGE_PLACEHOLDER.to_string()
            }
            Err(detail) => {
                warn!("Page {}: {detail}; using placeholder", idx + 1);
                PAGE_PLACEHOLDER.to_string()
            }
        };
        let _ = writeln!(out, "{}", marker::page_marker(idx + 1));
        out.push_str(&body);
        out.push_str("\n\n");
    }

    debug_assert_eq!(marker::marker_count(&out), results.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "needs a pdfium shared library on the host"]
    fn garbage_bytes_are_invalid_pdf() {
        let err = extract_text_blocking(b"%PDF-1.7 but actually garbage").unwrap_err();
        assert!(matches!(err, LectureError::InvalidPdf { .. }));
    }

    #[test]
    fn failed_page_gets_placeholder_and_marker_count_is_preserved() {
        let results = vec![
            Ok("First page text.".to_string()),
            Err("load: PdfiumLibraryInternalError".to_string()),
            Ok("Third page text.".to_string()),
        ];
        let text = assemble_pages(&results);

        assert_eq!(marker::marker_count(&text), 3);
        let pages = marker::split_pages(&text);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].text, "First page text.");
        assert_eq!(pages[1].text, PAGE_PLACEHOLDER);
        assert_eq!(pages[2].text, "Third page text.");
    }

    #[test]
    fn blank_page_gets_placeholder_too() {
        let results = vec![Ok("Real text.".to_string()), Ok("   \n".to_string())];
        let text = assemble_pages(&results);
        assert_eq!(marker::marker_count(&text), 2);
        assert_eq!(marker::split_pages(&text)[1].text, PAGE_PLACEHOLDER);
    }

    #[test]
    fn all_pages_failing_still_yields_full_marker_count() {
        let results: Vec<Result<String, String>> =
            (0..4).map(|_| Err("text: read failed".to_string())).collect();
        let text = assemble_pages(&results);
        assert_eq!(marker::marker_count(&text), 4);
        assert_eq!(marker::split_pages(&text).len(), 4);
    }
}
