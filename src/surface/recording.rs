//! Headless editing surface.
//!
//! Keeps open documents in memory, writes scratch files to a real directory,
//! and records every call it receives. The simulation methods
//! ([`edit`](RecordingSurface::edit), [`save`](RecordingSurface::save),
//! [`move_cursor`](RecordingSurface::move_cursor)) stand in for the user and
//! return the event a real host would dispatch.

use super::{
    remove_file_if_present, ActiveEditor, CompletionChoice, DocumentId, DocumentSnapshot,
    EditingSurface, SurfaceError, SurfaceEvent, CLOSE_ALL_EDITORS_COMMAND,
};
use crate::catalog::Position;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A call received by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceCall {
    Opened { path: PathBuf, language: String },
    Shown(DocumentId),
    CursorSet(DocumentId, Position),
    Revealed(DocumentId, Position),
    Command(String),
    Status(String),
    Prompted,
    Deleted(PathBuf),
}

#[derive(Debug)]
struct OpenDocument {
    path: PathBuf,
    text: String,
    version: u64,
}

#[derive(Debug)]
struct Inner {
    documents: BTreeMap<DocumentId, OpenDocument>,
    active: Option<ActiveEditor>,
    calls: Vec<SurfaceCall>,
    completion_choice: CompletionChoice,
    fail_deletes: bool,
}

#[derive(Debug)]
pub struct RecordingSurface {
    temp_dir: PathBuf,
    inner: Mutex<Inner>,
}

impl RecordingSurface {
    /// Surface whose scratch files live in `temp_dir`.
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            inner: Mutex::new(Inner {
                documents: BTreeMap::new(),
                active: None,
                calls: Vec::new(),
                completion_choice: CompletionChoice::Stop,
                fail_deletes: false,
            }),
        }
    }

    /// Answer given to every "all levels complete" prompt.
    pub fn set_completion_choice(&self, choice: CompletionChoice) {
        self.lock().completion_choice = choice;
    }

    /// Make every `delete_file` call fail.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.lock().fail_deletes = fail;
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.lock().calls.clone()
    }

    /// Host commands executed so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::Command(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Status messages shown so far, in order.
    pub fn statuses(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::Status(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn open_documents(&self) -> Vec<DocumentId> {
        self.lock().documents.keys().cloned().collect()
    }

    pub fn snapshot(&self, document: &DocumentId) -> Option<DocumentSnapshot> {
        let inner = self.lock();
        inner.documents.get(document).map(|d| DocumentSnapshot {
            document: document.clone(),
            text: d.text.clone(),
            version: d.version,
        })
    }

    /// Replace the text of the active document, as a user edit would.
    pub fn edit(&self, text: &str) -> Result<SurfaceEvent, SurfaceError> {
        let mut inner = self.lock();
        let document = active_document(&inner)?;
        let open = inner
            .documents
            .get_mut(&document)
            .ok_or_else(|| SurfaceError::DocumentNotFound(document.clone()))?;
        open.text = text.to_string();
        open.version += 1;

        Ok(SurfaceEvent::Changed {
            document: DocumentSnapshot {
                document,
                text: open.text.clone(),
                version: open.version,
            },
            content_changes: 1,
        })
    }

    /// Write the active document to disk.
    pub fn save(&self) -> Result<SurfaceEvent, SurfaceError> {
        let inner = self.lock();
        let document = active_document(&inner)?;
        let open = inner
            .documents
            .get(&document)
            .ok_or_else(|| SurfaceError::DocumentNotFound(document.clone()))?;
        fs::write(&open.path, &open.text).map_err(|source| SurfaceError::Io {
            path: open.path.clone(),
            source,
        })?;

        Ok(SurfaceEvent::Saved(DocumentSnapshot {
            document,
            text: open.text.clone(),
            version: open.version,
        }))
    }

    /// Move the cursor of the active editor.
    pub fn move_cursor(&self, position: Position) -> Result<SurfaceEvent, SurfaceError> {
        let mut inner = self.lock();
        let document = active_document(&inner)?;
        inner.active = Some(ActiveEditor {
            document: document.clone(),
            cursor: position,
        });
        let open = inner
            .documents
            .get(&document)
            .ok_or_else(|| SurfaceError::DocumentNotFound(document.clone()))?;

        Ok(SurfaceEvent::SelectionChanged(DocumentSnapshot {
            document,
            text: open.text.clone(),
            version: open.version,
        }))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn active_document(inner: &Inner) -> Result<DocumentId, SurfaceError> {
    inner
        .active
        .as_ref()
        .map(|a| a.document.clone())
        .ok_or_else(|| SurfaceError::Rejected("no active editor".into()))
}

#[async_trait]
impl EditingSurface for RecordingSurface {
    async fn open_document(&self, path: &Path, language: &str) -> Result<DocumentId, SurfaceError> {
        let text = fs::read_to_string(path).map_err(|source| SurfaceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document = DocumentId::new(format!("file://{}", path.display()));

        let mut inner = self.lock();
        inner.calls.push(SurfaceCall::Opened {
            path: path.to_path_buf(),
            language: language.to_string(),
        });
        inner.documents.insert(
            document.clone(),
            OpenDocument {
                path: path.to_path_buf(),
                text,
                version: 1,
            },
        );
        Ok(document)
    }

    async fn show_document(&self, document: &DocumentId) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        if !inner.documents.contains_key(document) {
            return Err(SurfaceError::DocumentNotFound(document.clone()));
        }
        inner.calls.push(SurfaceCall::Shown(document.clone()));
        let already_active = inner
            .active
            .as_ref()
            .is_some_and(|a| &a.document == document);
        if !already_active {
            inner.active = Some(ActiveEditor {
                document: document.clone(),
                cursor: Position::default(),
            });
        }
        Ok(())
    }

    async fn set_cursor(&self, document: &DocumentId, position: Position) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        match inner.active.as_mut() {
            Some(active) if &active.document == document => active.cursor = position,
            _ => return Err(SurfaceError::DocumentNotFound(document.clone())),
        }
        inner
            .calls
            .push(SurfaceCall::CursorSet(document.clone(), position));
        Ok(())
    }

    async fn reveal(&self, document: &DocumentId, position: Position) -> Result<(), SurfaceError> {
        self.lock()
            .calls
            .push(SurfaceCall::Revealed(document.clone(), position));
        Ok(())
    }

    async fn execute_command(&self, command_id: &str) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        inner.calls.push(SurfaceCall::Command(command_id.to_string()));
        if command_id == CLOSE_ALL_EDITORS_COMMAND {
            inner.documents.clear();
            inner.active = None;
        }
        Ok(())
    }

    fn active_editor(&self) -> Option<ActiveEditor> {
        self.lock().active.clone()
    }

    fn show_status(&self, message: &str) {
        self.lock().calls.push(SurfaceCall::Status(message.to_string()));
    }

    async fn prompt_all_complete(&self) -> CompletionChoice {
        let mut inner = self.lock();
        inner.calls.push(SurfaceCall::Prompted);
        inner.completion_choice
    }

    fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone()
    }

    fn delete_file(&self, path: &Path) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        if inner.fail_deletes {
            return Err(SurfaceError::Rejected(format!(
                "deleting {} is not permitted",
                path.display()
            )));
        }
        remove_file_if_present(path)?;
        inner.calls.push(SurfaceCall::Deleted(path.to_path_buf()));
        Ok(())
    }
}
