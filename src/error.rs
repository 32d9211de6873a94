use std::io;
use thiserror::Error;

/// Result type for cres operations
pub type Result<T> = std::result::Result<T, CresError>;

/// Unified error type for all cres operations
#[derive(Debug, Error)]
pub enum CresError {
    // I/O errors (reading source bytes, writing artifacts)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Manifest errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(String),

    #[error("Invalid manifest: {0}")]
    InvalidArgument(String),

    // Tree errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    // Codegen errors
    #[error("Symbol collision: `{symbol}` generated by both \"{first}\" and \"{second}\"")]
    SymbolCollision {
        symbol: String,
        first: String,
        second: String,
    },

    #[error("Glob pattern error: {0}")]
    InvalidPattern(String),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<toml::de::Error> for CresError {
    fn from(err: toml::de::Error) -> Self {
        CresError::Toml(err.to_string())
    }
}

impl From<glob::PatternError> for CresError {
    fn from(err: glob::PatternError) -> Self {
        CresError::InvalidPattern(err.to_string())
    }
}

impl From<glob::GlobError> for CresError {
    fn from(err: glob::GlobError) -> Self {
        CresError::Io(err.into_error())
    }
}
