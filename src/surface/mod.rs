//! The host editor boundary.
//!
//! The trainer never edits text itself. It asks an [`EditingSurface`] to open
//! and show documents, place the cursor, and run host commands, and it
//! receives [`SurfaceEvent`]s describing what the user did.

mod error;
mod recording;

pub use error::SurfaceError;
pub use recording::{RecordingSurface, SurfaceCall};

use crate::catalog::Position;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Host command that saves the active document.
pub const SAVE_COMMAND: &str = "workbench.action.files.save";

/// Host command that closes every open editor.
pub const CLOSE_ALL_EDITORS_COMMAND: &str = "workbench.action.closeAllEditors";

/// Opaque handle of an open document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Document state as seen when an event fired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub document: DocumentId,
    pub text: String,
    /// Monotonically increasing edit counter. Freshly opened documents are at 1.
    pub version: u64,
}

/// The focused editor and its primary cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveEditor {
    pub document: DocumentId,
    pub cursor: Position,
}

/// Something the user did in the host editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    Saved(DocumentSnapshot),
    Changed {
        document: DocumentSnapshot,
        /// Number of content changes carried by the event. Zero for
        /// metadata-only notifications such as dirty-state flips.
        content_changes: usize,
    },
    SelectionChanged(DocumentSnapshot),
}

impl SurfaceEvent {
    pub fn document(&self) -> &DocumentSnapshot {
        match self {
            SurfaceEvent::Saved(document)
            | SurfaceEvent::SelectionChanged(document)
            | SurfaceEvent::Changed { document, .. } => document,
        }
    }
}

/// Answer to the "all levels complete" prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionChoice {
    /// Clear this profile's completions and start over.
    Restart,
    /// Stay where we are.
    Stop,
}

/// Host editor capabilities used by the trainer.
///
/// File operations default to the local filesystem; hosts with a virtual
/// filesystem override them.
#[async_trait]
pub trait EditingSurface: Send + Sync {
    /// Open the document at `path`, using `language` as the syntax hint.
    async fn open_document(&self, path: &Path, language: &str) -> Result<DocumentId, SurfaceError>;

    /// Bring an open document into the focused editor.
    async fn show_document(&self, document: &DocumentId) -> Result<(), SurfaceError>;

    /// Collapse the selection of the editor showing `document` to `position`.
    async fn set_cursor(&self, document: &DocumentId, position: Position) -> Result<(), SurfaceError>;

    /// Scroll so that `position` is visible.
    async fn reveal(&self, document: &DocumentId, position: Position) -> Result<(), SurfaceError>;

    async fn execute_command(&self, command_id: &str) -> Result<(), SurfaceError>;

    /// Currently focused editor, if any.
    fn active_editor(&self) -> Option<ActiveEditor>;

    /// Transient status bar message.
    fn show_status(&self, message: &str);

    /// Ask the user what to do after the last level of a profile.
    async fn prompt_all_complete(&self) -> CompletionChoice;

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), SurfaceError> {
        fs::write(path, contents).map_err(|source| SurfaceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Remove `path`. A file that is already gone is not an error.
    fn delete_file(&self, path: &Path) -> Result<(), SurfaceError> {
        remove_file_if_present(path)
    }
}

pub(crate) fn remove_file_if_present(path: &Path) -> Result<(), SurfaceError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(SurfaceError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
