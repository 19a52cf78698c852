use rusqlite::{Connection, params};

use crate::error::Result;
use crate::models::Tag;

pub trait TagRepository {
    /// Attach a tag to a paper, creating the tag on first use. Returns `None`
    /// when the name is empty after normalization.
    fn add_to_paper(&self, paper_id: &str, name: &str) -> Result<Option<Tag>>;
    fn list_for_paper(&self, paper_id: &str) -> Result<Vec<String>>;
    /// Every tag with the number of papers carrying it, most used first.
    fn list(&self) -> Result<Vec<(String, u32)>>;
}

pub struct SqliteTagRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteTagRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> TagRepository for SqliteTagRepository<'a> {
    fn add_to_paper(&self, paper_id: &str, name: &str) -> Result<Option<Tag>> {
        let name = Tag::normalize_name(name);
        if name.is_empty() {
            return Ok(None);
        }

        self.conn
            .execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", params![name])?;
        let id: i64 = self.conn.query_row(
            "SELECT id FROM tags WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO paper_tags (paper_id, tag_id) VALUES (?1, ?2)",
            params![paper_id, id],
        )?;

        Ok(Some(Tag { id, name }))
    }

    fn list_for_paper(&self, paper_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name FROM paper_tags pt
             JOIN tags t ON t.id = pt.tag_id
             WHERE pt.paper_id = ?1
             ORDER BY t.name",
        )?;
        let names = stmt
            .query_map(params![paper_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn list(&self) -> Result<Vec<(String, u32)>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name, COUNT(pt.paper_id) AS uses
             FROM tags t
             LEFT JOIN paper_tags pt ON pt.tag_id = t.id
             GROUP BY t.id
             ORDER BY uses DESC, t.name",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<(String, u32)>, _>>()?;
        Ok(rows)
    }
}
