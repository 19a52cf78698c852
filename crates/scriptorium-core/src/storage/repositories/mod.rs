mod author_repository;
mod file_repository;
mod note_repository;
mod paper_repository;
mod project_repository;
mod tag_repository;

pub use author_repository::{AuthorRepository, SqliteAuthorRepository};
pub use file_repository::{FileRepository, SqliteFileRepository};
pub use note_repository::{NoteRepository, SqliteNoteRepository};
pub use paper_repository::{PaperRepository, SqlitePaperRepository};
pub use project_repository::{ProjectRepository, SqliteProjectRepository};
pub use tag_repository::{SqliteTagRepository, TagRepository};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;

use crate::error::Result;

/// Repositories borrow a plain `&Connection`, so the same repository works on
/// the pooled connection and inside a `rusqlite::Transaction`.
pub trait Repository {
    type Entity;
    type Id: ?Sized;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>>;
    fn insert(&self, entity: &Self::Entity) -> Result<()>;
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
