//! Store file error types.

use std::path::PathBuf;

use comanda_commerce::backend::StoreError;
use thiserror::Error;

/// Errors raised while reading or writing the store document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid store document.
    #[error("Invalid store document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document could not be encoded.
    #[error("Could not encode store document: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<DocumentError> for StoreError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::Io { .. } => StoreError::Unavailable(e.to_string()),
            DocumentError::Parse { .. } | DocumentError::Encode(_) => {
                StoreError::Serialization(e.to_string())
            }
        }
    }
}
