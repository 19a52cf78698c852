use rusqlite::ErrorCode;

use crate::error::ScriptoriumError;

/// Whether SQLite rejected a statement because of a UNIQUE/CHECK/FK constraint.
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

/// Map constraint violations to [`ScriptoriumError::Conflict`]; everything
/// else stays a database error.
pub fn conflict_or_db(err: rusqlite::Error, context: impl FnOnce() -> String) -> ScriptoriumError {
    if is_constraint_violation(&err) {
        ScriptoriumError::Conflict(format!("{}: {err}", context()))
    } else {
        ScriptoriumError::Database(err)
    }
}
