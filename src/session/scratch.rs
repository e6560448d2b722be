//! Scratch files backing a level's editing environment.

use crate::catalog::{Level, LevelSetup};
use crate::surface::DocumentId;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The single temporary document the session owns at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScratchFile {
    pub path: PathBuf,
    /// Set once the surface has opened the file.
    pub document: Option<DocumentId>,
}

impl ScratchFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            document: None,
        }
    }
}

/// `<dir>/<prefix><level id>_<random>.<ext>`
///
/// The random segment keeps two trainer instances sharing a temp directory
/// from clobbering each other's files.
pub fn scratch_path(dir: &Path, prefix: &str, level: &Level, setup: &LevelSetup) -> PathBuf {
    let id: String = level
        .id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let nonce = Uuid::new_v4().simple().to_string();
    dir.join(format!(
        "{prefix}{id}_{}.{}",
        &nonce[..8],
        setup.file_extension()
    ))
}
