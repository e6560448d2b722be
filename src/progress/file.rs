//! JSON file backed progress store.

use super::{ProgressError, ProgressRecord, ProgressStore};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Keeps each key in `<dir>/<key>.json`.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write never leaves a truncated record behind.
#[derive(Clone, Debug)]
pub struct JsonFileProgressStore {
    dir: PathBuf,
}

impl JsonFileProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the record for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl ProgressStore for JsonFileProgressStore {
    fn get(&self, key: &str) -> Result<Option<ProgressRecord>, ProgressError> {
        let path = self.path_for(key);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ProgressError::Io { path, source }),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn set(&self, key: &str, record: &ProgressRecord) -> Result<(), ProgressError> {
        fs::create_dir_all(&self.dir).map_err(|source| ProgressError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(record)?;

        fs::write(&temp_path, json).map_err(|source| ProgressError::Io {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &path).map_err(|source| ProgressError::Io { path, source })
    }
}
