//! Document text extraction
//!
//! Turns an uploaded announcement document into plain text for the
//! analyzers. Extraction is total: any unreadable input yields an empty
//! string, never an error, so a bad upload degrades to a short-text
//! penalty downstream instead of aborting the analysis.

use tracing::warn;

use crate::official::visible_text;

/// Extract plain text from a document by extension.
///
/// `.pdf` goes through the PDF text extractor, `.html`/`.htm` through the
/// markup stripper; everything else is treated as UTF-8 text with lossy
/// decoding.
pub fn extract_text(bytes: &[u8], filename: &str) -> String {
    let lower = filename.to_lowercase();
    if lower.ends_with(".pdf") {
        extract_pdf(bytes)
    } else if lower.ends_with(".html") || lower.ends_with(".htm") {
        let html = String::from_utf8_lossy(bytes);
        visible_text(&html)
    } else {
        String::from_utf8_lossy(bytes).trim().to_string()
    }
}

fn extract_pdf(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "pdf extraction failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passthrough() {
        let text = extract_text(b"Novapharm Labs announces FDA approval", "note.txt");
        assert_eq!(text, "Novapharm Labs announces FDA approval");
    }

    #[test]
    fn test_html_is_stripped() {
        let html = b"<html><body><p>Dividend of 5 rupees declared</p></body></html>";
        let text = extract_text(html, "filing.html");
        assert_eq!(text, "Dividend of 5 rupees declared");
    }

    #[test]
    fn test_garbage_pdf_yields_empty() {
        let text = extract_text(b"\x00\x01not a pdf", "broken.pdf");
        assert!(text.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_lossy_not_fatal() {
        let text = extract_text(&[0xff, 0xfe, b'h', b'i'], "weird.txt");
        assert!(text.contains("hi"));
    }
}
