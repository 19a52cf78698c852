use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use crate::models::Paper;
use crate::storage::database::conflict_or_db;

use super::{Repository, parse_timestamp};

const PAPER_COLUMNS: &str = "id, title, abstract, year, venue, doi, arxiv_id, created_at";

pub trait PaperRepository: Repository<Entity = Paper, Id = str> {
    /// Exact, case-sensitive DOI lookup backed by the UNIQUE index.
    fn find_by_doi(&self, doi: &str) -> Result<Option<Paper>>;
    fn exists(&self, id: &str) -> Result<bool>;
    fn list(&self, limit: usize, offset: usize, year: Option<i32>) -> Result<Vec<Paper>>;
    /// Every paper in insertion order.
    fn list_all(&self) -> Result<Vec<Paper>>;
    fn count(&self) -> Result<usize>;
}

pub struct SqlitePaperRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqlitePaperRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub(crate) fn row_to_paper(row: &rusqlite::Row) -> rusqlite::Result<Paper> {
        let created_at: String = row.get(7)?;
        Ok(Paper {
            id: row.get(0)?,
            title: row.get(1)?,
            abstract_text: row.get(2)?,
            year: row.get(3)?,
            venue: row.get(4)?,
            doi: row.get(5)?,
            arxiv_id: row.get(6)?,
            created_at: parse_timestamp(7, &created_at)?,
        })
    }
}

impl<'a> Repository for SqlitePaperRepository<'a> {
    type Entity = Paper;
    type Id = str;

    fn find_by_id(&self, id: &str) -> Result<Option<Paper>> {
        let paper = self
            .conn
            .query_row(
                &format!("SELECT {PAPER_COLUMNS} FROM papers WHERE id = ?1"),
                params![id],
                Self::row_to_paper,
            )
            .optional()?;
        Ok(paper)
    }

    fn insert(&self, paper: &Paper) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO papers (id, title, abstract, year, venue, doi, arxiv_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    paper.id,
                    paper.title,
                    paper.abstract_text,
                    paper.year,
                    paper.venue,
                    paper.doi,
                    paper.arxiv_id,
                    paper.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| conflict_or_db(e, || format!("paper {} (doi {:?})", paper.id, paper.doi)))?;
        Ok(())
    }
}

impl<'a> PaperRepository for SqlitePaperRepository<'a> {
    fn find_by_doi(&self, doi: &str) -> Result<Option<Paper>> {
        let paper = self
            .conn
            .query_row(
                &format!("SELECT {PAPER_COLUMNS} FROM papers WHERE doi = ?1"),
                params![doi],
                Self::row_to_paper,
            )
            .optional()?;
        Ok(paper)
    }

    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self
            .conn
            .prepare("SELECT 1 FROM papers WHERE id = ?1")?
            .exists(params![id])?)
    }

    fn list(&self, limit: usize, offset: usize, year: Option<i32>) -> Result<Vec<Paper>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PAPER_COLUMNS} FROM papers
             WHERE (?1 IS NULL OR year = ?1)
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3"
        ))?;

        let rows = stmt
            .query_map(params![year, limit as i64, offset as i64], Self::row_to_paper)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn list_all(&self) -> Result<Vec<Paper>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PAPER_COLUMNS} FROM papers ORDER BY rowid"))?;
        let rows = stmt
            .query_map([], Self::row_to_paper)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM papers", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScriptoriumError;
    use crate::storage::database::open_in_memory;

    #[test]
    fn insert_and_find_by_id_and_doi() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let repo = SqlitePaperRepository::new(&conn);

        let paper = Paper::new("Attention Is All You Need")
            .with_doi(Some("10.48550/arXiv.1706.03762".into()));
        repo.insert(&paper).unwrap();

        let found = repo.find_by_id(&paper.id).unwrap().unwrap();
        assert_eq!(found.title, paper.title);
        assert_eq!(found.created_at, paper.created_at);

        let by_doi = repo.find_by_doi("10.48550/arXiv.1706.03762").unwrap().unwrap();
        assert_eq!(by_doi.id, paper.id);
        assert!(repo.find_by_doi("10.48550/arxiv.1706.03762").unwrap().is_none());
        assert!(repo.exists(&paper.id).unwrap());
        assert!(!repo.exists("missing").unwrap());
    }

    #[test]
    fn duplicate_doi_is_a_conflict() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let repo = SqlitePaperRepository::new(&conn);

        repo.insert(&Paper::new("A").with_doi(Some("10.1000/same".into()))).unwrap();
        let err = repo
            .insert(&Paper::new("B").with_doi(Some("10.1000/same".into())))
            .unwrap_err();
        assert!(matches!(err, ScriptoriumError::Conflict(_)));

        repo.insert(&Paper::new("C")).unwrap();
        repo.insert(&Paper::new("D")).unwrap();
        assert_eq!(repo.count().unwrap(), 3);
    }

    #[test]
    fn list_all_keeps_insertion_order_and_list_filters_year() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let repo = SqlitePaperRepository::new(&conn);

        let mut first = Paper::new("First");
        first.year = Some(2017);
        let second = Paper::new("Second");
        repo.insert(&first).unwrap();
        repo.insert(&second).unwrap();

        let titles: Vec<String> = repo.list_all().unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["First", "Second"]);

        let in_2017 = repo.list(10, 0, Some(2017)).unwrap();
        assert_eq!(in_2017.len(), 1);
        assert_eq!(in_2017[0].title, "First");
        assert_eq!(repo.list(10, 0, None).unwrap().len(), 2);
        assert_eq!(repo.list(1, 1, None).unwrap().len(), 1);
    }
}
