use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Tag {
    /// Tags are stored trimmed and lowercased.
    pub fn normalize_name(raw: &str) -> String {
        raw.trim().to_lowercase()
    }
}

/// The single Markdown note attached to a paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub paper_id: String,
    pub content_md: String,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names_are_trimmed_and_lowercased() {
        assert_eq!(Tag::normalize_name("  Transformers "), "transformers");
        assert_eq!(Tag::normalize_name("   "), "");
    }
}
