use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Result, ScriptoriumError};
use crate::models::{Paper, Project};
use crate::storage::database::conflict_or_db;

use super::{SqlitePaperRepository, parse_timestamp};

pub trait ProjectRepository {
    /// Create a project with a trimmed, non-empty, unique name.
    fn create(&self, name: &str, description: &str) -> Result<Project>;
    fn find_by_id(&self, id: i64) -> Result<Option<Project>>;
    fn list(&self) -> Result<Vec<Project>>;
    /// Idempotent link between a project and a paper.
    fn add_paper(&self, project_id: i64, paper_id: &str) -> Result<()>;
    fn papers(&self, project_id: i64) -> Result<Vec<Paper>>;
}

pub struct SqliteProjectRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteProjectRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
        let created_at: String = row.get(3)?;
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            created_at: parse_timestamp(3, &created_at)?,
        })
    }
}

impl<'a> ProjectRepository for SqliteProjectRepository<'a> {
    fn create(&self, name: &str, description: &str) -> Result<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScriptoriumError::InvalidArgument(
                "project name is required".to_string(),
            ));
        }

        let created_at = Utc::now();
        self.conn
            .execute(
                "INSERT INTO projects (name, description, created_at) VALUES (?1, ?2, ?3)",
                params![name, description, created_at.to_rfc3339()],
            )
            .map_err(|e| conflict_or_db(e, || format!("project '{name}' already exists")))?;

        Ok(Project {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            description: description.to_string(),
            created_at,
        })
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Project>> {
        let project = self
            .conn
            .query_row(
                "SELECT id, name, description, created_at FROM projects WHERE id = ?1",
                params![id],
                Self::row_to_project,
            )
            .optional()?;
        Ok(project)
    }

    fn list(&self) -> Result<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description, created_at FROM projects ORDER BY id")?;
        let projects = stmt
            .query_map([], Self::row_to_project)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    fn add_paper(&self, project_id: i64, paper_id: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO paper_projects (paper_id, project_id) VALUES (?1, ?2)",
            params![paper_id, project_id],
        )?;
        Ok(())
    }

    fn papers(&self, project_id: i64) -> Result<Vec<Paper>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.title, p.abstract, p.year, p.venue, p.doi, p.arxiv_id, p.created_at
             FROM paper_projects pp
             JOIN papers p ON p.id = pp.paper_id
             WHERE pp.project_id = ?1
             ORDER BY p.rowid",
        )?;
        let papers = stmt
            .query_map(params![project_id], SqlitePaperRepository::row_to_paper)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(papers)
    }
}
