use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use crate::models::PaperFile;
use crate::storage::database::conflict_or_db;

use super::{Repository, parse_timestamp};

const FILE_COLUMNS: &str = "id, paper_id, file_path, content_hash, version, added_at";

pub trait FileRepository: Repository<Entity = PaperFile, Id = str> {
    /// Lookup through the UNIQUE index on `content_hash`.
    fn find_by_hash(&self, content_hash: &str) -> Result<Option<PaperFile>>;
    fn count_for_paper(&self, paper_id: &str) -> Result<u32>;
    fn list_for_paper(&self, paper_id: &str) -> Result<Vec<PaperFile>>;
}

pub struct SqliteFileRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteFileRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<PaperFile> {
        let added_at: String = row.get(5)?;
        Ok(PaperFile {
            id: row.get(0)?,
            paper_id: row.get(1)?,
            file_path: row.get(2)?,
            content_hash: row.get(3)?,
            version: row.get(4)?,
            added_at: parse_timestamp(5, &added_at)?,
        })
    }
}

impl<'a> Repository for SqliteFileRepository<'a> {
    type Entity = PaperFile;
    type Id = str;

    fn find_by_id(&self, id: &str) -> Result<Option<PaperFile>> {
        let file = self
            .conn
            .query_row(
                &format!("SELECT {FILE_COLUMNS} FROM paper_files WHERE id = ?1"),
                params![id],
                Self::row_to_file,
            )
            .optional()?;
        Ok(file)
    }

    fn insert(&self, file: &PaperFile) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO paper_files (id, paper_id, file_path, content_hash, version, added_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    file.id,
                    file.paper_id,
                    file.file_path,
                    file.content_hash,
                    file.version,
                    file.added_at.to_rfc3339(),
                ],
            )
            .map_err(|e| {
                conflict_or_db(e, || {
                    format!(
                        "file {} (hash {}, paper {} v{})",
                        file.file_path, file.content_hash, file.paper_id, file.version
                    )
                })
            })?;
        Ok(())
    }
}

impl<'a> FileRepository for SqliteFileRepository<'a> {
    fn find_by_hash(&self, content_hash: &str) -> Result<Option<PaperFile>> {
        let file = self
            .conn
            .query_row(
                &format!("SELECT {FILE_COLUMNS} FROM paper_files WHERE content_hash = ?1"),
                params![content_hash],
                Self::row_to_file,
            )
            .optional()?;
        Ok(file)
    }

    fn count_for_paper(&self, paper_id: &str) -> Result<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM paper_files WHERE paper_id = ?1",
            params![paper_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn list_for_paper(&self, paper_id: &str) -> Result<Vec<PaperFile>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM paper_files WHERE paper_id = ?1 ORDER BY version"
        ))?;
        let rows = stmt
            .query_map(params![paper_id], Self::row_to_file)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScriptoriumError;
    use crate::models::Paper;
    use crate::storage::database::open_in_memory;
    use crate::storage::repositories::SqlitePaperRepository;

    #[test]
    fn files_are_found_by_hash_and_counted_per_paper() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let paper = Paper::new("Versioned");
        SqlitePaperRepository::new(&conn).insert(&paper).unwrap();

        let repo = SqliteFileRepository::new(&conn);
        assert_eq!(repo.count_for_paper(&paper.id).unwrap(), 0);

        repo.insert(&PaperFile::new(&paper.id, "/a/v1.pdf", "hash-1", 1)).unwrap();
        repo.insert(&PaperFile::new(&paper.id, "/a/v2.pdf", "hash-2", 2)).unwrap();

        assert_eq!(repo.count_for_paper(&paper.id).unwrap(), 2);
        let found = repo.find_by_hash("hash-2").unwrap().unwrap();
        assert_eq!(found.version, 2);
        assert_eq!(found.file_path, "/a/v2.pdf");
        assert!(repo.find_by_hash("hash-3").unwrap().is_none());

        let versions: Vec<u32> = repo
            .list_for_paper(&paper.id)
            .unwrap()
            .iter()
            .map(|f| f.version)
            .collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[test]
    fn hash_and_version_uniqueness_are_enforced() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let paper = Paper::new("Constrained");
        SqlitePaperRepository::new(&conn).insert(&paper).unwrap();
        let repo = SqliteFileRepository::new(&conn);

        repo.insert(&PaperFile::new(&paper.id, "/a.pdf", "same", 1)).unwrap();

        let same_hash = repo.insert(&PaperFile::new(&paper.id, "/b.pdf", "same", 2));
        assert!(matches!(same_hash, Err(ScriptoriumError::Conflict(_))));

        let same_version = repo.insert(&PaperFile::new(&paper.id, "/c.pdf", "other", 1));
        assert!(matches!(same_version, Err(ScriptoriumError::Conflict(_))));

        let orphan = repo.insert(&PaperFile::new("no-such-paper", "/d.pdf", "orphan", 1));
        assert!(matches!(orphan, Err(ScriptoriumError::Conflict(_))));
    }
}
