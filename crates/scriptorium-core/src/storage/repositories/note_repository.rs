use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use crate::models::Note;

use super::parse_timestamp;

pub trait NoteRepository {
    fn find_for_paper(&self, paper_id: &str) -> Result<Option<Note>>;
    /// Insert or replace the note, stamping `updated_at`.
    fn upsert(&self, paper_id: &str, content_md: &str) -> Result<Note>;
}

pub struct SqliteNoteRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteNoteRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> NoteRepository for SqliteNoteRepository<'a> {
    fn find_for_paper(&self, paper_id: &str) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                "SELECT paper_id, content_md, updated_at FROM notes WHERE paper_id = ?1",
                params![paper_id],
                |row| {
                    let updated_at: String = row.get(2)?;
                    Ok(Note {
                        paper_id: row.get(0)?,
                        content_md: row.get(1)?,
                        updated_at: parse_timestamp(2, &updated_at)?,
                    })
                },
            )
            .optional()?;
        Ok(note)
    }

    fn upsert(&self, paper_id: &str, content_md: &str) -> Result<Note> {
        let note = Note {
            paper_id: paper_id.to_string(),
            content_md: content_md.to_string(),
            updated_at: Utc::now(),
        };
        self.conn.execute(
            "INSERT INTO notes (paper_id, content_md, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(paper_id) DO UPDATE SET
                content_md = excluded.content_md,
                updated_at = excluded.updated_at",
            params![note.paper_id, note.content_md, note.updated_at.to_rfc3339()],
        )?;
        Ok(note)
    }
}
