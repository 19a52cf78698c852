use rusqlite::{Connection, params};
use tracing::debug;

use crate::error::Result;
use crate::models::SearchHit;

/// Full-text index over paper title, abstract and DOI.
pub struct PaperSearchQuery<'a> {
    conn: &'a Connection,
}

impl<'a> PaperSearchQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Drop every index row and repopulate from `papers`. Returns the number
    /// of indexed papers.
    pub fn rebuild(&self) -> Result<usize> {
        self.conn.execute("DELETE FROM paper_fts", [])?;
        let indexed = self.conn.execute(
            "INSERT INTO paper_fts (paper_id, title, abstract, doi)
             SELECT id, title, COALESCE(abstract, ''), COALESCE(doi, '')
             FROM papers",
            [],
        )?;
        debug!(indexed, "rebuilt full-text index");
        Ok(indexed)
    }

    /// FTS5 `MATCH` query, best `bm25` rank first (lower is better).
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.title, p.doi, p.year, p.venue, bm25(paper_fts) AS rank
             FROM paper_fts
             JOIN papers p ON p.id = paper_fts.paper_id
             WHERE paper_fts MATCH ?1
             ORDER BY rank
             LIMIT ?2",
        )?;

        let hits = stmt
            .query_map(params![query, limit as i64], |row| {
                Ok(SearchHit {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    doi: row.get(2)?,
                    year: row.get(3)?,
                    venue: row.get(4)?,
                    rank: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(hits)
    }
}
