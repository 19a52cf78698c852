//! Duplicate detection over the stored library.

pub mod matcher;
pub mod report;
pub mod similarity;

pub use report::{DuplicateCandidate, DuplicateFinder, find_possible_duplicates};
pub use similarity::{author_overlap, dedup_score, normalize_title, title_similarity};
