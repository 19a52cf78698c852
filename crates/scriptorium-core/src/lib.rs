pub mod config;
pub mod error;
pub mod file_import;
pub mod models;
pub mod search;
pub mod storage;

pub use config::{AppConfig, DedupConfig, IngestConfig};
pub use error::{ExitCode, Result, ScriptoriumError};
pub use models::*;

pub use search::{IndexRefresher, NoopRefresher};

pub use storage::database::{ConnectionPool, Database, open_database, open_in_memory};

pub use storage::repositories::{
    AuthorRepository, FileRepository, NoteRepository, PaperRepository, ProjectRepository,
    Repository, SqliteAuthorRepository, SqliteFileRepository, SqliteNoteRepository,
    SqlitePaperRepository, SqliteProjectRepository, SqliteTagRepository, TagRepository,
};

pub use storage::queries::PaperSearchQuery;
