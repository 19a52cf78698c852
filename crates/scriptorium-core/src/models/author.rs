use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

/// Split a raw metadata author field into display names.
///
/// Names are separated by `;` or the word `and`; commas are kept because
/// "Family, Given" is a common byline form.
pub fn split_author_field(raw: &str) -> Vec<String> {
    raw.split(';')
        .flat_map(|chunk| chunk.split(" and "))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
