use std::path::{Path, PathBuf};

use scriptorium_core::file_import::scan_directory;
use scriptorium_core::{Database, IndexRefresher, NoopRefresher};
use serde::Serialize;
use tracing::{info, warn};

use super::{IdentityResolver, IngestOutcome};
use crate::error::{Result, ScienceError};

/// Outcome for one file of a directory import.
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub outcome: Result<IngestOutcome>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub ingested: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut summary, entry| {
            match &entry.outcome {
                Ok(IngestOutcome::Ingested(_)) => summary.ingested += 1,
                Ok(IngestOutcome::SkippedDuplicate(_)) => summary.skipped += 1,
                Err(_) => summary.failed += 1,
            }
            summary
        })
    }
}

impl IdentityResolver {
    /// Ingest every supported file under `dir`, in path order.
    ///
    /// A failing file becomes an `Err` entry and the batch continues. The
    /// index is refreshed once at the end if anything was ingested.
    pub fn ingest_directory(
        &self,
        db: &Database,
        dir: &Path,
        recursive: bool,
        refresher: &dyn IndexRefresher,
    ) -> Result<Vec<BatchEntry>> {
        let extensions = self.registry().extensions();
        let files = scan_directory(dir, recursive, &extensions)?;
        info!(dir = %dir.display(), count = files.len(), "importing directory");

        let entries: Vec<BatchEntry> = files
            .into_iter()
            .map(|path| {
                let outcome = self.ingest_file(db, &path, &NoopRefresher);
                if let Err(err) = &outcome {
                    warn!(path = %path.display(), error = %err, "failed to ingest file");
                }
                BatchEntry { path, outcome }
            })
            .collect();

        let summary = BatchSummary::from_entries(&entries);
        if summary.ingested > 0
            && let Err(err) = refresher.refresh_index()
        {
            warn!(error = %err, "search index refresh failed after import");
        }
        info!(
            ingested = summary.ingested,
            skipped = summary.skipped,
            failed = summary.failed,
            "directory import finished"
        );
        Ok(entries)
    }
}

/// Failure kind label used when reporting a batch entry.
pub fn error_kind(err: &ScienceError) -> &'static str {
    use scriptorium_core::ScriptoriumError as Core;
    match err {
        ScienceError::Core(Core::NotFound(_)) => "not_found",
        ScienceError::Core(Core::UnsupportedFormat(_)) => "unsupported_format",
        ScienceError::Core(Core::InvalidArgument(_)) => "invalid_argument",
        ScienceError::Core(Core::Conflict(_)) => "conflict",
        ScienceError::PdfExtraction(_) => "extraction_failed",
        _ => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::resolver::tests::{fake_resolver, write};
    use scriptorium_core::ScriptoriumError;
    use tempfile::TempDir;

    #[test]
    fn failures_are_isolated_per_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a_good.fake", "Title: Good Paper\n10.4242/good");
        write(&dir, "b_corrupt.fake", "CORRUPT");
        write(&dir, "c_copy.fake", "Title: Good Paper\n10.4242/good");
        write(&dir, "d_ignored.txt", "not a document");

        let db = Database::open_in_memory().unwrap();
        let entries = fake_resolver()
            .ingest_directory(&db, dir.path(), false, &db)
            .unwrap();

        assert_eq!(entries.len(), 3);
        assert!(entries[0].path.ends_with("a_good.fake"));
        assert!(matches!(entries[0].outcome, Ok(IngestOutcome::Ingested(_))));
        assert!(matches!(entries[1].outcome, Err(ScienceError::PdfExtraction(_))));
        assert!(matches!(entries[2].outcome, Ok(IngestOutcome::SkippedDuplicate(_))));

        assert_eq!(
            BatchSummary::from_entries(&entries),
            BatchSummary {
                ingested: 1,
                skipped: 1,
                failed: 1
            }
        );
        assert_eq!(db.search("good", 10).unwrap().len(), 1);
    }

    #[test]
    fn recursive_import_descends_into_subdirectories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        write(&dir, "top.fake", "Title: Top");
        write(&dir, "nested/inner.fake", "Title: Inner");

        let db = Database::open_in_memory().unwrap();
        let resolver = fake_resolver();
        let flat = resolver
            .ingest_directory(&db, dir.path(), false, &NoopRefresher)
            .unwrap();
        assert_eq!(flat.len(), 1);

        let deep = resolver
            .ingest_directory(&db, dir.path(), true, &NoopRefresher)
            .unwrap();
        assert_eq!(deep.len(), 2);
        assert_eq!(BatchSummary::from_entries(&deep).skipped, 1);
        assert_eq!(db.count_papers().unwrap(), 2);
    }

    #[test]
    fn missing_directory_fails_the_whole_call() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let err = fake_resolver()
            .ingest_directory(&db, &dir.path().join("absent"), false, &NoopRefresher)
            .unwrap_err();
        assert!(matches!(err, ScienceError::Core(ScriptoriumError::NotFound(_))));
        assert_eq!(error_kind(&err), "not_found");
    }
}
