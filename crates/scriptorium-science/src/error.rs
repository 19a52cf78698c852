use scriptorium_core::{ExitCode, ScriptoriumError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScienceError {
    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    /// The document claims a supported format but could not be parsed.
    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error(transparent)]
    Core(#[from] ScriptoriumError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScienceError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidDoi(_) => ExitCode::InvalidArgs,
            Self::PdfExtraction(_) => ExitCode::GeneralError,
            Self::Core(err) => err.exit_code(),
            Self::Io(_) => ExitCode::FileSystemError,
        }
    }

    /// The wrapped core error, if this is one.
    pub fn as_core(&self) -> Option<&ScriptoriumError> {
        match self {
            Self::Core(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScienceError>;
