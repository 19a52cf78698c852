use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Author;

/// Canonical paper record. At most one paper exists per non-null DOI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    pub title: String,

    #[serde(rename = "abstract", default)]
    pub abstract_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(default)]
    pub venue: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Paper {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            abstract_text: String::new(),
            year: None,
            venue: String::new(),
            doi: None,
            arxiv_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_doi(mut self, doi: Option<String>) -> Self {
        self.doi = doi;
        self
    }

    /// True when both papers carry the same non-empty DOI.
    pub fn shares_doi_with(&self, other: &Paper) -> bool {
        match (self.doi.as_deref(), other.doi.as_deref()) {
            (Some(a), Some(b)) => !a.is_empty() && a == b,
            _ => false,
        }
    }
}

/// A paper together with its byline, in `author_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperWithAuthors {
    #[serde(flatten)]
    pub paper: Paper,
    pub authors: Vec<Author>,
}

impl PaperWithAuthors {
    pub fn new(paper: Paper, authors: Vec<Author>) -> Self {
        Self { paper, authors }
    }

    pub fn author_names(&self) -> impl Iterator<Item = &str> {
        self.authors.iter().map(|a| a.name.as_str())
    }
}

/// One ranked row from the full-text index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub doi: Option<String>,
    pub year: Option<i32>,
    pub venue: String,
    pub rank: f64,
}
