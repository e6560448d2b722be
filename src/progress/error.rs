//! Progress store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving progress
#[derive(Debug, Error)]
pub enum ProgressError {
    /// Reading or writing the backing file failed
    #[error("Progress file {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored record is not valid JSON for the progress schema
    #[error("Progress record could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store cannot be used at all
    #[error("Progress store unavailable: {0}")]
    Unavailable(String),
}
