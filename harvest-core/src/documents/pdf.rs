//! PDF parsing on top of `lopdf`.

use super::extractor::{DocumentParser, ParseFailure};
use lopdf::Document;

/// Extracts page text from PDF bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfParser;

impl DocumentParser for PdfParser {
    type Document = Document;

    fn open(&self, bytes: &[u8]) -> Result<Document, ParseFailure> {
        Document::load_mem(bytes).map_err(|e| ParseFailure::Open(e.to_string()))
    }

    fn page_numbers(&self, document: &Document) -> Vec<u32> {
        // BTreeMap keys, already ascending
        document.get_pages().into_keys().collect()
    }

    fn page_text(&self, document: &Document, page: u32) -> Result<String, ParseFailure> {
        let mut text = document
            .extract_text(&[page])
            .map_err(|e| ParseFailure::Page {
                page,
                reason: e.to_string(),
            })?;
        // lopdf ends every text object with a line break; drop the last one
        // so consecutive pages join without a separator.
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }
}
