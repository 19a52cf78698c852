use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScienceError};

static DOI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b10\.\d{4,9}/[-._;()/:A-Z0-9]+\b").expect("DOI pattern is valid")
});

/// First DOI-looking substring of `text`, trimmed, exactly as written.
pub fn detect_doi(text: &str) -> Option<String> {
    DOI_REGEX
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|doi| !doi.is_empty())
}

/// Every DOI-looking substring of `text`, in order of appearance.
pub fn find_dois(text: &str) -> Vec<String> {
    DOI_REGEX
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// A DOI typed by a user, with resolver prefixes stripped.
///
/// Case is preserved: stored DOIs are compared byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doi {
    pub raw: String,
    pub bare: String,
    pub url: String,
}

impl Doi {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let stripped = [
            "https://doi.org/",
            "http://doi.org/",
            "https://dx.doi.org/",
            "http://dx.doi.org/",
            "doi:",
            "DOI:",
        ]
        .iter()
        .find_map(|prefix| input.strip_prefix(prefix))
        .map(str::trim_start)
        .unwrap_or(input);

        if !stripped.starts_with("10.") {
            return Err(ScienceError::InvalidDoi(input.to_string()));
        }
        let slash_pos = stripped
            .find('/')
            .ok_or_else(|| ScienceError::InvalidDoi(input.to_string()))?;
        if stripped[slash_pos + 1..].is_empty() {
            return Err(ScienceError::InvalidDoi(input.to_string()));
        }

        Ok(Self {
            raw: input.to_string(),
            bare: stripped.to_string(),
            url: format!("https://doi.org/{stripped}"),
        })
    }
}
