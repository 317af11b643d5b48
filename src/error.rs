//! Error types for artifact loading and export

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for artifact operations
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Errors that can surface from a load or an export.
///
/// Candidate query failures are deliberately absent: they are recorded in the
/// resolution report and never escape the resolver.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// The file could not be opened at all (missing, permissions, locked)
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// The file opened but is not a readable SQLite store
    #[error("{} is not a readable SQLite database: {source}", path.display())]
    NotADatabase {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// I/O error (file read/write)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Invalid configuration or request
    #[error("Configuration error: {0}")]
    Config(String),
    /// A load worker panicked before reporting
    #[error("Load worker panicked: {0}")]
    WorkerPanic(String),
    /// Category tag or catalog label not recognized
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_names_path() {
        let err = ArtifactError::Open {
            path: PathBuf::from("/evidence/calllog.db"),
            source: rusqlite::Error::InvalidQuery,
        };
        let text = err.to_string();
        assert!(text.starts_with("Failed to open /evidence/calllog.db"));
    }

    #[test]
    fn test_io_conversion() {
        let err: ArtifactError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ArtifactError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: gone");
    }
}
