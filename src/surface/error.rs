//! Editing surface error types.

use super::DocumentId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the host editor
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("File {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document '{0}' is not open")]
    DocumentNotFound(DocumentId),

    #[error("Command '{command_id}' failed: {reason}")]
    CommandFailed { command_id: String, reason: String },

    #[error("Host rejected the operation: {0}")]
    Rejected(String),
}
