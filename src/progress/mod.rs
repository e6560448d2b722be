//! Durable progress.
//!
//! The session persists a single [`ProgressRecord`] under one namespaced key.
//! A [`ProgressStore`] is a plain key/value capability: it never interprets
//! the record, and the session is the only writer.
//!
//! Stored layout (JSON):
//!
//! ```json
//! {
//!   "lastActiveProfile": "vim",
//!   "completedLevels": ["vim-001-line-end", "vim-002-delete-line"],
//!   "lastLevelId": "vim-003-word-forward",
//!   "scores": { "vim-001-line-end": 100, "vim-002-delete-line": 80 },
//!   "stats": {
//!     "vim-001-line-end": { "attempts": 2, "completions": 1, "hintsUsed": 0, "totalTimeMs": 5400, "bestTimeMs": 5400 }
//!   },
//!   "updatedAt": "2026-10-19T08:30:00Z"
//! }
//! ```
//!
//! `scores`, `stats` and `updatedAt` are optional, so records written without them
//! still load.

mod error;
mod file;
mod memory;
mod stats;

pub use error::ProgressError;
pub use file::JsonFileProgressStore;
pub use memory::MemoryProgressStore;
pub use stats::LevelStats;

use crate::catalog::Profile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Persisted projection of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub last_active_profile: Profile,
    #[serde(default)]
    pub completed_levels: BTreeSet<String>,
    #[serde(default)]
    pub last_level_id: String,
    /// Best score per completed level.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: BTreeMap<String, u32>,
    /// Practice statistics per level.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stats: BTreeMap<String, LevelStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Key/value persistence for the progress record.
///
/// Both calls are synchronous from the caller's point of view. A write
/// replaces the previous record entirely; the last write wins.
pub trait ProgressStore: Send + Sync {
    /// Load the record under `key`, `None` if nothing was ever saved.
    fn get(&self, key: &str) -> Result<Option<ProgressRecord>, ProgressError>;

    /// Replace the record under `key`.
    fn set(&self, key: &str, record: &ProgressRecord) -> Result<(), ProgressError>;
}

impl<T: ProgressStore + ?Sized> ProgressStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<ProgressRecord>, ProgressError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, record: &ProgressRecord) -> Result<(), ProgressError> {
        (**self).set(key, record)
    }
}
