//! Document extractors: metadata plus a bounded slice of leading text.

mod pdf;

pub use pdf::PdfExtractor;

use std::path::Path;

use scriptorium_core::IngestConfig;
use scriptorium_core::file_import::has_extension;

use crate::error::Result;

/// How much of a document is read when looking for identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    pub max_pages: usize,
    pub max_chars: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_pages: 2,
            max_chars: 20_000,
        }
    }
}

impl From<&IngestConfig> for ScanLimits {
    fn from(config: &IngestConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_chars: config.max_chars,
        }
    }
}

/// Accumulates page text until either scan limit is reached.
///
/// Pages are taken in order. Once the running character count exceeds
/// `max_chars` no further page is requested, and the joined text is cut to
/// `max_chars` characters.
#[derive(Debug)]
pub struct LeadingText {
    limits: ScanLimits,
    pages: Vec<String>,
    total_chars: usize,
}

impl LeadingText {
    pub fn new(limits: ScanLimits) -> Self {
        Self {
            limits,
            pages: Vec::new(),
            total_chars: 0,
        }
    }

    pub fn wants_more(&self) -> bool {
        self.pages.len() < self.limits.max_pages && self.total_chars <= self.limits.max_chars
    }

    pub fn push_page(&mut self, text: String) {
        self.total_chars += text.chars().count();
        self.pages.push(text);
    }

    pub fn finish(self) -> String {
        let joined = self.pages.join("\n");
        match joined.char_indices().nth(self.limits.max_chars) {
            Some((cut, _)) => joined[..cut].to_string(),
            None => joined,
        }
    }
}

/// What an extractor recovered from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Embedded title, `None` when absent or blank.
    pub title: Option<String>,
    /// Embedded author field, unsplit.
    pub author: Option<String>,
    /// Text of the first pages, bounded by [`ScanLimits`].
    pub leading_text: String,
}

pub trait DocumentExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lowercase file extensions this extractor claims, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    fn supports(&self, path: &Path) -> bool {
        has_extension(path, self.extensions())
    }

    fn extract(&self, content: &[u8], limits: &ScanLimits) -> Result<ExtractedDocument>;
}

/// Ordered set of extractors; the first one that supports a path wins.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn DocumentExtractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(PdfExtractor));
        registry
    }
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    pub fn register(&mut self, extractor: Box<dyn DocumentExtractor>) {
        self.extractors.push(extractor);
    }

    pub fn find(&self, path: &Path) -> Option<&dyn DocumentExtractor> {
        self.extractors
            .iter()
            .find(|e| e.supports(path))
            .map(|e| &**e)
    }

    pub fn extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<&'static str> = self
            .extractors
            .iter()
            .flat_map(|e| e.extensions().iter().copied())
            .collect();
        exts.sort_unstable();
        exts.dedup();
        exts
    }
}
