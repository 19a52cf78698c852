//! Scriptorium Science: document extraction, identity resolution,
//! duplicate detection and bibliography export.

pub mod dedup;
pub mod error;
pub mod extract;
pub mod formats;
pub mod identifiers;
pub mod ingest;

pub use dedup::{DuplicateCandidate, DuplicateFinder, dedup_score, find_possible_duplicates};
pub use error::{Result, ScienceError};
pub use extract::{DocumentExtractor, ExtractedDocument, ExtractorRegistry, ScanLimits};
pub use formats::{ExportFormat, export_library};
pub use identifiers::{Doi, detect_doi};
pub use ingest::{
    BatchEntry, BatchSummary, IdentityResolver, IngestOutcome, IngestResult, IngestStatus,
};
