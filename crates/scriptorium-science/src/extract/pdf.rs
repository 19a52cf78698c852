use lopdf::{Dictionary, Document, Object};
use tracing::{debug, warn};

use super::{DocumentExtractor, ExtractedDocument, LeadingText, ScanLimits};
use crate::error::{Result, ScienceError};

/// PDF extractor: `Title`/`Author` from the document information
/// dictionary, text from the first pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl DocumentExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn extract(&self, content: &[u8], limits: &ScanLimits) -> Result<ExtractedDocument> {
        let document = Document::load_mem(content)
            .map_err(|err| ScienceError::PdfExtraction(format!("lopdf failed to parse PDF: {err}")))?;

        let info = info_dictionary(&document);
        let title = info.and_then(|dict| info_text(dict, b"Title"));
        let author = info.and_then(|dict| info_text(dict, b"Author"));

        let pages = document.get_pages();
        debug!(page_count = pages.len(), "extracting leading PDF text");

        let mut text = LeadingText::new(*limits);
        for page_num in pages.keys().copied() {
            if !text.wants_more() {
                break;
            }
            match document.extract_text(&[page_num]) {
                Ok(page_text) => text.push_page(page_text),
                Err(err) => {
                    warn!(page = page_num, error = %err, "failed to extract text from page");
                    text.push_page(String::new());
                }
            }
        }

        Ok(ExtractedDocument {
            title,
            author,
            leading_text: text.finish(),
        })
    }
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn info_text(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => {
            let text = decode_text_string(bytes);
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        _ => None,
    }
}

/// PDF text strings are UTF-16BE behind a byte-order mark, otherwise a
/// single-byte encoding; UTF-8 is accepted since many producers write it.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
