use thiserror::Error;

/// All errors that can occur in scriptorium-core.
#[derive(Debug, Error)]
pub enum ScriptoriumError {
    /// A source file or looked-up record that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Bad caller input: an out-of-range threshold, an empty name, or a
    /// reference to a paper or project that does not exist.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A unique constraint in the store rejected a write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl ScriptoriumError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::NotFound(_) => ExitCode::NotFound,
            Self::UnsupportedFormat(_) | Self::InvalidArgument(_) => ExitCode::InvalidArgs,
            Self::Conflict(_) => ExitCode::Conflict,
            Self::Io(_) => ExitCode::FileSystemError,
            _ => ExitCode::GeneralError,
        }
    }
}

/// Exit codes used by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
    Conflict = 7,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

pub type Result<T> = std::result::Result<T, ScriptoriumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(ScriptoriumError::NotFound("a.pdf".into()).exit_code(), ExitCode::NotFound);
        assert_eq!(
            ScriptoriumError::InvalidArgument("threshold".into()).exit_code(),
            ExitCode::InvalidArgs
        );
        assert_eq!(ScriptoriumError::Conflict("hash".into()).exit_code(), ExitCode::Conflict);
        assert_eq!(i32::from(ExitCode::Conflict), 7);
    }
}
