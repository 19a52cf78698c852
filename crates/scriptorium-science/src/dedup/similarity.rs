use std::collections::HashSet;

use scriptorium_core::PaperWithAuthors;

use super::matcher::SequenceMatcher;

pub const TITLE_WEIGHT: f64 = 0.7;
pub const AUTHOR_WEIGHT: f64 = 0.3;

/// Lowercase, turn anything that is not a word character or whitespace into
/// a space, collapse whitespace runs, trim.
pub fn normalize_title(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity of two titles in `[0, 1]`; 0 when either raw title is empty.
///
/// The matcher is order-sensitive, so the normalized titles are compared in
/// lexicographic order to make the result symmetric.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    normalized_similarity(&normalize_title(a), &normalize_title(b))
}

pub(crate) fn normalized_similarity(a: &str, b: &str) -> f64 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    SequenceMatcher::new(first, second).ratio()
}

/// `|A ∩ B| / max(|A|, |B|)` over lowercased author names; 0 when either
/// side has no authors.
pub fn author_overlap<'a>(
    a: impl IntoIterator<Item = &'a str>,
    b: impl IntoIterator<Item = &'a str>,
) -> f64 {
    overlap_of_sets(&author_set(a), &author_set(b))
}

pub(crate) fn author_set<'a>(names: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    names.into_iter().map(str::to_lowercase).collect()
}

pub(crate) fn overlap_of_sets(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    shared as f64 / a.len().max(b.len()) as f64
}

/// Round to three decimals, halves away from zero.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// The weights in tenths. Scaling by these keeps decimal ties such as
// 0.2625 exact, where multiplying by 0.7 lands just below them.
const TITLE_TENTHS: f64 = 7.0;
const AUTHOR_TENTHS: f64 = 3.0;

/// `TITLE_WEIGHT * title + AUTHOR_WEIGHT * authors`, rounded to three
/// decimals with halves away from zero.
pub(crate) fn combine(title: f64, authors: f64) -> f64 {
    ((TITLE_TENTHS * title + AUTHOR_TENTHS * authors) * 100.0).round() / 1000.0
}

/// Weighted duplicate score of two papers, rounded to three decimals.
pub fn dedup_score(a: &PaperWithAuthors, b: &PaperWithAuthors) -> f64 {
    combine(
        title_similarity(&a.paper.title, &b.paper.title),
        author_overlap(a.author_names(), b.author_names()),
    )
}
