use crate::error::Result;

/// Something that can rebuild the full-text index after the paper set changed.
///
/// Ingestion calls this after a successful commit; a failure there is logged,
/// not propagated, because the next refresh rebuilds everything anyway.
pub trait IndexRefresher: Send + Sync {
    fn refresh_index(&self) -> Result<()>;
}

/// Refresher that does nothing, for callers that batch their own reindex.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRefresher;

impl IndexRefresher for NoopRefresher {
    fn refresh_index(&self) -> Result<()> {
        Ok(())
    }
}
