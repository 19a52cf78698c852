use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 2;

pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        ",
    )?;
    Ok(())
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS papers (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            abstract    TEXT NOT NULL DEFAULT '',
            year        INTEGER,
            venue       TEXT NOT NULL DEFAULT '',
            doi         TEXT UNIQUE,
            arxiv_id    TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS paper_files (
            id           TEXT PRIMARY KEY,
            paper_id     TEXT NOT NULL REFERENCES papers(id),
            file_path    TEXT NOT NULL,
            content_hash TEXT NOT NULL UNIQUE,
            version      INTEGER NOT NULL CHECK(version >= 1),
            added_at     TEXT NOT NULL,
            UNIQUE (paper_id, version)
        );

        CREATE TABLE IF NOT EXISTS authors (
            id    INTEGER PRIMARY KEY,
            name  TEXT NOT NULL,
            orcid TEXT
        );

        CREATE TABLE IF NOT EXISTS paper_authors (
            paper_id     TEXT NOT NULL REFERENCES papers(id) ON DELETE CASCADE,
            author_id    INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
            author_order INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (paper_id, author_id)
        );

        CREATE TABLE IF NOT EXISTS tags (
            id   INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS paper_tags (
            paper_id TEXT NOT NULL REFERENCES papers(id) ON DELETE CASCADE,
            tag_id   INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (paper_id, tag_id)
        );

        CREATE TABLE IF NOT EXISTS notes (
            id         INTEGER PRIMARY KEY,
            paper_id   TEXT NOT NULL UNIQUE REFERENCES papers(id) ON DELETE CASCADE,
            content_md TEXT NOT NULL DEFAULT '',
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS projects (
            id          INTEGER PRIMARY KEY,
            name        TEXT UNIQUE NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS paper_projects (
            paper_id   TEXT NOT NULL REFERENCES papers(id) ON DELETE CASCADE,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            PRIMARY KEY (paper_id, project_id)
        );
        ",
    )?;
    Ok(())
}

pub fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_papers_year         ON papers(year);
        CREATE INDEX IF NOT EXISTS idx_papers_created_at   ON papers(created_at);
        CREATE INDEX IF NOT EXISTS idx_paper_files_paper   ON paper_files(paper_id);
        CREATE INDEX IF NOT EXISTS idx_authors_name        ON authors(name);
        CREATE INDEX IF NOT EXISTS idx_authors_orcid       ON authors(orcid);
        CREATE INDEX IF NOT EXISTS idx_paper_authors_order ON paper_authors(paper_id, author_order);
        ",
    )?;
    Ok(())
}

/// Full-text table over title, abstract and DOI. The index is always rebuilt
/// wholesale from `papers`, so it stores its own copy of the text.
pub fn create_fts_table(conn: &Connection) -> Result<()> {
    let has_fts: bool = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='paper_fts'")?
        .exists([])?;

    if !has_fts {
        conn.execute_batch(
            "
            CREATE VIRTUAL TABLE paper_fts USING fts5(
                paper_id UNINDEXED, title, abstract, doi,
                tokenize='unicode61'
            );
            ",
        )?;
    }
    Ok(())
}
