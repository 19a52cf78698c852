use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical artifact belonging to a paper.
///
/// `content_hash` is unique across all files; `version` counts up from 1 per
/// paper in ingestion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperFile {
    pub id: String,
    pub paper_id: String,
    pub file_path: String,
    pub content_hash: String,
    pub version: u32,
    pub added_at: DateTime<Utc>,
}

impl PaperFile {
    pub fn new(
        paper_id: impl Into<String>,
        file_path: impl Into<String>,
        content_hash: impl Into<String>,
        version: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            paper_id: paper_id.into(),
            file_path: file_path.into(),
            content_hash: content_hash.into(),
            version,
            added_at: Utc::now(),
        }
    }
}
