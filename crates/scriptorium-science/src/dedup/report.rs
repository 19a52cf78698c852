use std::collections::HashSet;

use scriptorium_core::{Database, PaperWithAuthors, ScriptoriumError};
use serde::Serialize;
use tracing::debug;

use super::similarity::{author_set, combine, normalize_title, normalized_similarity, overlap_of_sets};
use crate::error::Result;

/// A pair of papers whose score reached the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateCandidate {
    pub paper_1_id: String,
    pub paper_1_title: String,
    pub paper_2_id: String,
    pub paper_2_title: String,
    pub score: f64,
}

/// Per-paper inputs to the pairwise score, computed once.
struct Prepared<'a> {
    entry: &'a PaperWithAuthors,
    normalized_title: String,
    authors: HashSet<String>,
}

impl<'a> Prepared<'a> {
    fn new(entry: &'a PaperWithAuthors) -> Self {
        Self {
            entry,
            normalized_title: normalize_title(&entry.paper.title),
            authors: author_set(entry.author_names()),
        }
    }

    fn score_against(&self, other: &Prepared<'_>) -> f64 {
        let title = if self.entry.paper.title.is_empty() || other.entry.paper.title.is_empty() {
            0.0
        } else {
            normalized_similarity(&self.normalized_title, &other.normalized_title)
        };
        combine(title, overlap_of_sets(&self.authors, &other.authors))
    }
}

/// Read-only pairwise scan for likely duplicates.
///
/// Every unordered pair is scored, so cost grows with the square of the
/// library size.
#[derive(Debug, Clone)]
pub struct DuplicateFinder {
    threshold: f64,
}

impl DuplicateFinder {
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ScriptoriumError::InvalidArgument(format!(
                "threshold must be between 0 and 1, got {threshold}"
            ))
            .into());
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Pairs `(i, j)` with `i < j` in slice order, outer index ascending, then
    /// inner. Pairs that already share a DOI are skipped.
    pub fn find(&self, papers: &[PaperWithAuthors]) -> Vec<DuplicateCandidate> {
        let prepared: Vec<Prepared<'_>> = papers.iter().map(Prepared::new).collect();
        let mut candidates = Vec::new();

        for (i, first) in prepared.iter().enumerate() {
            for second in &prepared[i + 1..] {
                if first.entry.paper.shares_doi_with(&second.entry.paper) {
                    continue;
                }
                let score = first.score_against(second);
                if score >= self.threshold {
                    candidates.push(DuplicateCandidate {
                        paper_1_id: first.entry.paper.id.clone(),
                        paper_1_title: first.entry.paper.title.clone(),
                        paper_2_id: second.entry.paper.id.clone(),
                        paper_2_title: second.entry.paper.title.clone(),
                        score,
                    });
                }
            }
        }

        debug!(
            papers = papers.len(),
            candidates = candidates.len(),
            threshold = self.threshold,
            "duplicate scan finished"
        );
        candidates
    }
}

/// Score every stored paper pair; the threshold is checked before any read.
pub fn find_possible_duplicates(db: &Database, threshold: f64) -> Result<Vec<DuplicateCandidate>> {
    let finder = DuplicateFinder::new(threshold)?;
    let papers = db.list_papers_with_authors()?;
    Ok(finder.find(&papers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScienceError;
    use scriptorium_core::{
        AuthorRepository, Paper, Repository, SqliteAuthorRepository, SqlitePaperRepository,
    };

    fn store(db: &Database, title: &str, doi: Option<&str>, authors: &[&str]) -> Paper {
        let paper = Paper::new(title).with_doi(doi.map(str::to_string));
        let names: Vec<String> = authors.iter().map(|a| a.to_string()).collect();
        db.with_transaction(|tx| {
            SqlitePaperRepository::new(tx).insert(&paper)?;
            SqliteAuthorRepository::new(tx).link_authors(&paper.id, &names)?;
            Ok(())
        })
        .unwrap();
        paper
    }

    fn attention_library() -> (Database, Paper, Paper) {
        let db = Database::open_in_memory().unwrap();
        let a = store(
            &db,
            "Attention Is All You Need",
            None,
            &["Ashish Vaswani", "Noam Shazear"],
        );
        let b = store(&db, "Attention is all you need.", None, &["Ashish Vaswani"]);
        store(&db, "Deep Residual Learning for Image Recognition", None, &["Kaiming He"]);
        (db, a, b)
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        for bad in [-0.1, 1.01, f64::NAN] {
            let err = find_possible_duplicates(&db, bad).unwrap_err();
            assert!(matches!(
                err,
                ScienceError::Core(ScriptoriumError::InvalidArgument(_))
            ));
        }
        assert!(DuplicateFinder::new(0.0).is_ok());
        assert!(DuplicateFinder::new(1.0).is_ok());
    }

    #[test]
    fn threshold_decides_inclusion() {
        let (db, a, b) = attention_library();

        assert!(find_possible_duplicates(&db, 0.9).unwrap().is_empty());

        let found = find_possible_duplicates(&db, 0.8).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].paper_1_id, a.id);
        assert_eq!(found[0].paper_2_id, b.id);
        assert_eq!(found[0].paper_2_title, "Attention is all you need.");
        assert_eq!(found[0].score, 0.85);
    }

    #[test]
    fn tie_score_meets_threshold_at_rounded_value() {
        let db = Database::open_in_memory().unwrap();
        store(&db, "abcdefgh", None, &[]);
        store(&db, "abcxyzuv", None, &[]);

        let found = find_possible_duplicates(&db, 0.263).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].score, 0.263);
        assert!(find_possible_duplicates(&db, 0.264).unwrap().is_empty());
    }

    #[test]
    fn shared_doi_pairs_are_never_reported() {
        let a = PaperWithAuthors::new(
            Paper::new("Same Title").with_doi(Some("10.1000/same".into())),
            vec![],
        );
        let b = PaperWithAuthors::new(
            Paper::new("Same Title").with_doi(Some("10.1000/same".into())),
            vec![],
        );
        let c = PaperWithAuthors::new(Paper::new("Same Title"), vec![]);

        let finder = DuplicateFinder::new(0.0).unwrap();
        let found = finder.find(&[a.clone(), b.clone(), c.clone()]);
        let pairs: Vec<(&str, &str)> = found
            .iter()
            .map(|d| (d.paper_1_id.as_str(), d.paper_2_id.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (a.paper.id.as_str(), c.paper.id.as_str()),
                (b.paper.id.as_str(), c.paper.id.as_str()),
            ]
        );
        assert!(found.iter().all(|d| d.score == 0.7));
    }

    #[test]
    fn empty_dois_do_not_short_circuit() {
        let a = PaperWithAuthors::new(Paper::new("Twin").with_doi(Some(String::new())), vec![]);
        let b = PaperWithAuthors::new(Paper::new("Twin").with_doi(Some(String::new())), vec![]);
        let found = DuplicateFinder::new(0.5).unwrap().find(&[a, b]);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn pairs_follow_enumeration_order() {
        let titles = ["Alpha Model", "Alpha Model v2", "Alpha Models", "Beta"];
        let papers: Vec<PaperWithAuthors> = titles
            .iter()
            .map(|t| PaperWithAuthors::new(Paper::new(*t), vec![]))
            .collect();

        let found = DuplicateFinder::new(0.5).unwrap().find(&papers);
        let index_of = |id: &str| papers.iter().position(|p| p.paper.id == id).unwrap();
        let order: Vec<(usize, usize)> = found
            .iter()
            .map(|d| (index_of(&d.paper_1_id), index_of(&d.paper_2_id)))
            .collect();

        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(order, sorted);
        assert!(order.iter().all(|(i, j)| i < j));
        assert!(order.contains(&(0, 2)));
    }

    #[test]
    fn score_matches_pairwise_function() {
        let (db, _, _) = attention_library();
        let papers = db.list_papers_with_authors().unwrap();
        let found = DuplicateFinder::new(0.0).unwrap().find(&papers);
        assert_eq!(found.len(), 3);
        for candidate in found {
            let a = papers.iter().find(|p| p.paper.id == candidate.paper_1_id).unwrap();
            let b = papers.iter().find(|p| p.paper.id == candidate.paper_2_id).unwrap();
            assert_eq!(candidate.score, super::super::similarity::dedup_score(a, b));
        }
    }
}
