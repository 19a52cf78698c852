use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::Result;
use crate::models::Author;

pub trait AuthorRepository {
    /// Reuse an author with exactly this name, or create one.
    fn find_or_create_by_name(&self, name: &str) -> Result<Author>;
    /// Link `names` to a paper in byline order, starting at `author_order = 0`.
    fn link_authors(&self, paper_id: &str, names: &[String]) -> Result<Vec<Author>>;
    fn authors_for_paper(&self, paper_id: &str) -> Result<Vec<Author>>;
    /// Bylines of every paper that has at least one author.
    fn authors_by_paper(&self) -> Result<HashMap<String, Vec<Author>>>;
}

pub struct SqliteAuthorRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteAuthorRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_author(row: &rusqlite::Row) -> rusqlite::Result<Author> {
        Ok(Author {
            id: row.get(0)?,
            name: row.get(1)?,
            orcid: row.get(2)?,
        })
    }
}

impl<'a> AuthorRepository for SqliteAuthorRepository<'a> {
    fn find_or_create_by_name(&self, name: &str) -> Result<Author> {
        let existing = self
            .conn
            .query_row(
                "SELECT id, name, orcid FROM authors WHERE name = ?1 ORDER BY id LIMIT 1",
                params![name],
                Self::row_to_author,
            )
            .optional()?;
        if let Some(author) = existing {
            return Ok(author);
        }

        self.conn
            .execute("INSERT INTO authors (name) VALUES (?1)", params![name])?;
        Ok(Author {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            orcid: None,
        })
    }

    fn link_authors(&self, paper_id: &str, names: &[String]) -> Result<Vec<Author>> {
        let mut linked = Vec::with_capacity(names.len());
        for (order, name) in names.iter().enumerate() {
            let author = self.find_or_create_by_name(name)?;
            // A name repeated in one byline keeps its first position.
            let inserted = self.conn.execute(
                "INSERT OR IGNORE INTO paper_authors (paper_id, author_id, author_order)
                 VALUES (?1, ?2, ?3)",
                params![paper_id, author.id, order as i64],
            )?;
            if inserted > 0 {
                linked.push(author);
            }
        }
        debug!(paper_id, count = linked.len(), "linked authors");
        Ok(linked)
    }

    fn authors_for_paper(&self, paper_id: &str) -> Result<Vec<Author>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.name, a.orcid
             FROM paper_authors pa
             JOIN authors a ON a.id = pa.author_id
             WHERE pa.paper_id = ?1
             ORDER BY pa.author_order",
        )?;
        let authors = stmt
            .query_map(params![paper_id], Self::row_to_author)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(authors)
    }

    fn authors_by_paper(&self) -> Result<HashMap<String, Vec<Author>>> {
        let mut stmt = self.conn.prepare(
            "SELECT pa.paper_id, a.id, a.name, a.orcid
             FROM paper_authors pa
             JOIN authors a ON a.id = pa.author_id
             ORDER BY pa.paper_id, pa.author_order",
        )?;
        let rows = stmt.query_map([], |row| {
            let paper_id: String = row.get(0)?;
            let author = Author {
                id: row.get(1)?,
                name: row.get(2)?,
                orcid: row.get(3)?,
            };
            Ok((paper_id, author))
        })?;

        let mut by_paper: HashMap<String, Vec<Author>> = HashMap::new();
        for row in rows {
            let (paper_id, author) = row?;
            by_paper.entry(paper_id).or_default().push(author);
        }
        Ok(by_paper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Paper;
    use crate::storage::database::open_in_memory;
    use crate::storage::repositories::{Repository, SqlitePaperRepository};

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn authors_are_reused_by_exact_name() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let repo = SqliteAuthorRepository::new(&conn);

        let first = repo.find_or_create_by_name("Ashish Vaswani").unwrap();
        let again = repo.find_or_create_by_name("Ashish Vaswani").unwrap();
        let other = repo.find_or_create_by_name("ashish vaswani").unwrap();

        assert_eq!(first.id, again.id);
        assert_ne!(first.id, other.id);
    }

    #[test]
    fn links_keep_byline_order() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let paper = Paper::new("Attention Is All You Need");
        SqlitePaperRepository::new(&conn).insert(&paper).unwrap();

        let repo = SqliteAuthorRepository::new(&conn);
        repo.link_authors(&paper.id, &names(&["Vaswani", "Shazeer", "Parmar", "Vaswani"]))
            .unwrap();

        let byline: Vec<String> = repo
            .authors_for_paper(&paper.id)
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(byline, names(&["Vaswani", "Shazeer", "Parmar"]));

        let all = repo.authors_by_paper().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[&paper.id].len(), 3);
    }
}
