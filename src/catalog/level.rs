//! Level definitions.

use super::profile::Profile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A zero-based document position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

fn default_file_type() -> String {
    "plaintext".to_string()
}

/// Initial editing environment of a level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSetup {
    /// Language hint handed to the editing surface.
    #[serde(default = "default_file_type")]
    pub file_type: String,
    #[serde(default)]
    pub initial_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_selection: Option<Position>,
}

impl LevelSetup {
    /// Extension used for the scratch file of this setup.
    pub fn file_extension(&self) -> &'static str {
        match self.file_type.as_str() {
            "javascript" => "js",
            "typescript" => "ts",
            "python" => "py",
            "rust" => "rs",
            "markdown" => "md",
            "json" => "json",
            _ => "txt",
        }
    }
}

/// Win condition of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Trigger {
    /// A named host command fired.
    Command { command_id: String },
    /// The document text, with carriage returns removed, contains `match_content`.
    Content {
        match_content: String,
        /// Minimum document version before the trigger may fire.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_events: Option<u64>,
    },
    /// The active cursor sits exactly on `match_selection`.
    Selection { match_selection: Position },
    /// Reserved. Never satisfied.
    State {
        state_key: String,
        #[serde(default)]
        state_value: serde_json::Value,
    },
}

impl Trigger {
    pub fn kind(&self) -> &'static str {
        match self {
            Trigger::Command { .. } => "command",
            Trigger::Content { .. } => "content",
            Trigger::Selection { .. } => "selection",
            Trigger::State { .. } => "state",
        }
    }
}

/// One exercise: an initial environment, a win condition and hints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<LevelSetup>,
    pub trigger: Trigger,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl Level {
    /// The profile whose working set contains this level.
    pub fn profile(&self) -> Profile {
        Profile::of_tags(&self.tags)
    }
}
