//! Identity resolution for incoming documents.
//!
//! A file is matched first by content hash, then by exact DOI; otherwise a new
//! paper is created. Each accepted file receives the next version number of
//! its paper.

mod batch;
mod resolver;

pub use batch::{BatchEntry, BatchSummary, error_kind};
pub use resolver::IdentityResolver;

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IngestStatus {
    #[serde(rename = "ingested")]
    Ingested,
    #[serde(rename = "skipped:duplicate_file_hash")]
    SkippedDuplicateFileHash,
}

impl IngestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingested => "ingested",
            Self::SkippedDuplicateFileHash => "skipped:duplicate_file_hash",
        }
    }
}

impl fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifiers of the file a call produced or matched.
///
/// For a skipped duplicate every field describes the file already stored,
/// not the path that was offered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestResult {
    pub status: IngestStatus,
    pub paper_id: String,
    pub title: String,
    pub doi: Option<String>,
    pub file_id: String,
    pub file_path: String,
    pub content_hash: String,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Ingested(IngestResult),
    SkippedDuplicate(IngestResult),
}

impl IngestOutcome {
    pub fn result(&self) -> &IngestResult {
        match self {
            Self::Ingested(result) | Self::SkippedDuplicate(result) => result,
        }
    }

    pub fn into_result(self) -> IngestResult {
        match self {
            Self::Ingested(result) | Self::SkippedDuplicate(result) => result,
        }
    }

    pub fn is_ingested(&self) -> bool {
        matches!(self, Self::Ingested(_))
    }
}
