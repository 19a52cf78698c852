mod connection;
mod error;
mod migrations;
mod schema;

pub use connection::ConnectionPool;
pub use error::{conflict_or_db, is_constraint_violation};
pub use migrations::{Migration, get_applied_versions, run_migrations};
pub use schema::SCHEMA_VERSION;

use std::path::Path;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::info;

use crate::error::{Result, ScriptoriumError};
use crate::models::{Note, Paper, PaperFile, PaperWithAuthors, Project, SearchHit, Tag};
use crate::search::IndexRefresher;

use super::queries::PaperSearchQuery;
use super::repositories::{
    AuthorRepository, FileRepository, NoteRepository, PaperRepository, ProjectRepository,
    Repository, SqliteAuthorRepository, SqliteFileRepository, SqliteNoteRepository,
    SqlitePaperRepository, SqliteProjectRepository, SqliteTagRepository, TagRepository,
};

pub fn open_database(path: &Path) -> Result<ConnectionPool> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let pool = ConnectionPool::open(path)?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

pub fn open_in_memory() -> Result<ConnectionPool> {
    let pool = ConnectionPool::open_in_memory()?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

/// Tags, notes, projects and file listings reject unknown ids as bad input.
fn ensure_paper(conn: &Connection, paper_id: &str) -> Result<()> {
    if SqlitePaperRepository::new(conn).exists(paper_id)? {
        Ok(())
    } else {
        Err(ScriptoriumError::InvalidArgument(format!("unknown paper {paper_id}")))
    }
}

fn ensure_project(conn: &Connection, project_id: i64) -> Result<()> {
    match SqliteProjectRepository::new(conn).find_by_id(project_id)? {
        Some(_) => Ok(()),
        None => Err(ScriptoriumError::InvalidArgument(format!("unknown project {project_id}"))),
    }
}

/// The library store. Every method takes the connection lock for its
/// duration, so calls from different threads are serialized.
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let pool = open_database(path)?;
        info!(path = %path.display(), "opened library database");
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> Result<Self> {
        let pool = open_in_memory()?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Run `f` against the locked connection without a transaction.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.pool.get_connection();
        f(&conn)
    }

    /// Run `f` inside `BEGIN IMMEDIATE` while holding the connection lock.
    /// The transaction commits when `f` succeeds and rolls back otherwise.
    pub fn with_transaction<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.pool.get_connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    // ─── Papers & files ────────────────────────────────────

    pub fn find_paper(&self, id: &str) -> Result<Paper> {
        let conn = self.pool.get_connection();
        SqlitePaperRepository::new(&conn)
            .find_by_id(id)?
            .ok_or_else(|| ScriptoriumError::NotFound(format!("paper {id}")))
    }

    pub fn paper_with_authors(&self, id: &str) -> Result<PaperWithAuthors> {
        let conn = self.pool.get_connection();
        let paper = SqlitePaperRepository::new(&conn)
            .find_by_id(id)?
            .ok_or_else(|| ScriptoriumError::NotFound(format!("paper {id}")))?;
        let authors = SqliteAuthorRepository::new(&conn).authors_for_paper(id)?;
        Ok(PaperWithAuthors::new(paper, authors))
    }

    /// Exact DOI lookup, returned with the paper's byline.
    pub fn find_paper_by_doi(&self, doi: &str) -> Result<Option<PaperWithAuthors>> {
        let conn = self.pool.get_connection();
        let Some(paper) = SqlitePaperRepository::new(&conn).find_by_doi(doi)? else {
            return Ok(None);
        };
        let authors = SqliteAuthorRepository::new(&conn).authors_for_paper(&paper.id)?;
        Ok(Some(PaperWithAuthors::new(paper, authors)))
    }

    pub fn list_papers(&self, limit: usize, offset: usize, year: Option<i32>) -> Result<Vec<Paper>> {
        let conn = self.pool.get_connection();
        SqlitePaperRepository::new(&conn).list(limit, offset, year)
    }

    pub fn count_papers(&self) -> Result<usize> {
        let conn = self.pool.get_connection();
        SqlitePaperRepository::new(&conn).count()
    }

    /// Every paper with its byline, in insertion order, read under one lock.
    pub fn list_papers_with_authors(&self) -> Result<Vec<PaperWithAuthors>> {
        let conn = self.pool.get_connection();
        let papers = SqlitePaperRepository::new(&conn).list_all()?;
        let mut bylines = SqliteAuthorRepository::new(&conn).authors_by_paper()?;
        Ok(papers
            .into_iter()
            .map(|paper| {
                let authors = bylines.remove(&paper.id).unwrap_or_default();
                PaperWithAuthors::new(paper, authors)
            })
            .collect())
    }

    pub fn find_file_by_hash(&self, content_hash: &str) -> Result<Option<PaperFile>> {
        let conn = self.pool.get_connection();
        SqliteFileRepository::new(&conn).find_by_hash(content_hash)
    }

    pub fn list_files(&self, paper_id: &str) -> Result<Vec<PaperFile>> {
        let conn = self.pool.get_connection();
        ensure_paper(&conn, paper_id)?;
        SqliteFileRepository::new(&conn).list_for_paper(paper_id)
    }

    // ─── Full-text index ───────────────────────────────────

    pub fn rebuild_index(&self) -> Result<usize> {
        let conn = self.pool.get_connection();
        PaperSearchQuery::new(&conn).rebuild()
    }

    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let conn = self.pool.get_connection();
        PaperSearchQuery::new(&conn).search(query, limit)
    }

    // ─── Tags & notes ──────────────────────────────────────

    pub fn add_tag(&self, paper_id: &str, name: &str) -> Result<Option<Tag>> {
        let conn = self.pool.get_connection();
        ensure_paper(&conn, paper_id)?;
        SqliteTagRepository::new(&conn).add_to_paper(paper_id, name)
    }

    pub fn list_tags(&self, paper_id: &str) -> Result<Vec<String>> {
        let conn = self.pool.get_connection();
        ensure_paper(&conn, paper_id)?;
        SqliteTagRepository::new(&conn).list_for_paper(paper_id)
    }

    pub fn list_all_tags(&self) -> Result<Vec<(String, u32)>> {
        let conn = self.pool.get_connection();
        SqliteTagRepository::new(&conn).list()
    }

    pub fn set_note(&self, paper_id: &str, content_md: &str) -> Result<Note> {
        let conn = self.pool.get_connection();
        ensure_paper(&conn, paper_id)?;
        SqliteNoteRepository::new(&conn).upsert(paper_id, content_md)
    }

    /// The note's Markdown, or an empty string when none was written.
    pub fn get_note(&self, paper_id: &str) -> Result<String> {
        let conn = self.pool.get_connection();
        Ok(SqliteNoteRepository::new(&conn)
            .find_for_paper(paper_id)?
            .map(|note| note.content_md)
            .unwrap_or_default())
    }

    // ─── Projects ──────────────────────────────────────────

    pub fn create_project(&self, name: &str, description: &str) -> Result<Project> {
        let conn = self.pool.get_connection();
        SqliteProjectRepository::new(&conn).create(name, description)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let conn = self.pool.get_connection();
        SqliteProjectRepository::new(&conn).list()
    }

    pub fn add_paper_to_project(&self, project_id: i64, paper_id: &str) -> Result<()> {
        let conn = self.pool.get_connection();
        ensure_project(&conn, project_id)?;
        ensure_paper(&conn, paper_id)?;
        SqliteProjectRepository::new(&conn).add_paper(project_id, paper_id)
    }

    pub fn list_papers_in_project(&self, project_id: i64) -> Result<Vec<Paper>> {
        let conn = self.pool.get_connection();
        ensure_project(&conn, project_id)?;
        SqliteProjectRepository::new(&conn).papers(project_id)
    }
}

impl IndexRefresher for Database {
    fn refresh_index(&self) -> Result<()> {
        self.rebuild_index().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn insert_paper(db: &Database, title: &str, doi: Option<&str>, authors: &[&str]) -> Paper {
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

    #[test]
    fn test_open_creates_database_file_and_applies_migrations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db").join("scriptorium.db");
        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db.count_papers().unwrap(), 0);

        let versions = db.with_connection(|conn| get_applied_versions(conn)).unwrap();
        assert_eq!(versions, vec![1, SCHEMA_VERSION]);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        let result: Result<()> = db.with_transaction(|tx| {
            SqlitePaperRepository::new(tx).insert(&Paper::new("Doomed"))?;
            Err(ScriptoriumError::InvalidArgument("abort".into()))
        });
        assert!(result.is_err());
        assert_eq!(db.count_papers().unwrap(), 0);
    }

    #[test]
    fn test_papers_with_authors_in_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let first = insert_paper(&db, "First", None, &["Ada Lovelace", "Charles Babbage"]);
        let second = insert_paper(&db, "Second", Some("10.1000/two"), &[]);

        let all = db.list_papers_with_authors().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].paper.id, first.id);
        assert_eq!(
            all[0].author_names().collect::<Vec<_>>(),
            vec!["Ada Lovelace", "Charles Babbage"]
        );
        assert_eq!(all[1].paper.id, second.id);
        assert!(all[1].authors.is_empty());
    }

    #[test]
    fn test_find_paper_by_doi_is_exact() {
        let db = Database::open_in_memory().unwrap();
        let paper = insert_paper(&db, "Cased", Some("10.1000/AbC"), &["Grace Hopper"]);

        let found = db.find_paper_by_doi("10.1000/AbC").unwrap().unwrap();
        assert_eq!(found.paper.id, paper.id);
        assert_eq!(found.author_names().collect::<Vec<_>>(), vec!["Grace Hopper"]);
        assert!(db.find_paper_by_doi("10.1000/abc").unwrap().is_none());
    }

    #[test]
    fn test_refresh_index_makes_papers_searchable() {
        let db = Database::open_in_memory().unwrap();
        insert_paper(&db, "Graph Neural Networks", None, &[]);
        db.refresh_index().unwrap();
        let hits = db.search("graph", 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Graph Neural Networks");
    }

    #[test]
    fn test_tags_and_notes_reject_unknown_paper() {
        let db = Database::open_in_memory().unwrap();
        let paper = insert_paper(&db, "Tagged", None, &[]);

        db.add_tag(&paper.id, "Survey").unwrap();
        assert_eq!(db.list_tags(&paper.id).unwrap(), vec!["survey"]);
        assert!(matches!(db.add_tag("missing", "x"), Err(ScriptoriumError::InvalidArgument(_))));

        assert_eq!(db.get_note(&paper.id).unwrap(), "");
        db.set_note(&paper.id, "Read section 3").unwrap();
        assert_eq!(db.get_note(&paper.id).unwrap(), "Read section 3");
        assert!(matches!(db.set_note("missing", "x"), Err(ScriptoriumError::InvalidArgument(_))));
    }

    #[test]
    fn test_projects_group_papers_and_reject_unknown_ids() {
        let db = Database::open_in_memory().unwrap();
        let paper = insert_paper(&db, "Grouped", None, &[]);
        let project = db.create_project("Reading list", "").unwrap();

        db.add_paper_to_project(project.id, &paper.id).unwrap();
        let papers = db.list_papers_in_project(project.id).unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].id, paper.id);

        assert!(matches!(
            db.add_paper_to_project(project.id + 100, &paper.id),
            Err(ScriptoriumError::InvalidArgument(_))
        ));
        assert!(matches!(
            db.add_paper_to_project(project.id, "missing"),
            Err(ScriptoriumError::InvalidArgument(_))
        ));
        assert!(matches!(
            db.list_papers_in_project(project.id + 100),
            Err(ScriptoriumError::InvalidArgument(_))
        ));
    }
}
