//! Errors reported by the typewiz library.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TypewizError {
    /// A file the operation needs is not part of the program.
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read {}: {message}", .path.display())]
    ConfigRead { path: PathBuf, message: String },

    #[error("failed to parse {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("invalid configuration in {}: {message}", .path.display())]
    ConfigValidation { path: PathBuf, message: String },

    /// The file changed after its types were collected; its offsets no
    /// longer point at the same code.
    #[error(
        "hash mismatch for {file}: source file has changed since type information was collected \
         (expected {expected}, found {actual})"
    )]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Collected type information that does not follow the snapshot format.
    #[error("invalid type information: {0}")]
    InvalidTypeInfo(String),
}

impl TypewizError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TypewizError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TypewizError>;
