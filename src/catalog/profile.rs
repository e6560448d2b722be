//! Training profiles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Tag whose presence moves a level into the [`Profile::Vim`] working set.
pub const PROFILE_TAG: &str = "vim";

/// A training track. Partitions the catalog into two disjoint working sets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// General editor shortcuts.
    #[default]
    VsCode,
    /// Modal editing.
    Vim,
}

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::VsCode, Profile::Vim];

    /// Profile a level with the given tags belongs to.
    pub fn of_tags(tags: &BTreeSet<String>) -> Self {
        if tags.contains(PROFILE_TAG) {
            Profile::Vim
        } else {
            Profile::VsCode
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::VsCode => "vscode",
            Profile::Vim => "vim",
        }
    }

    /// Name shown to the user when picking a track.
    pub fn display_name(&self) -> &'static str {
        match self {
            Profile::VsCode => "VSCode",
            Profile::Vim => "Vim",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown profile '{0}', expected 'vscode' or 'vim'")]
pub struct ParseProfileError(String);

impl FromStr for Profile {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vscode" => Ok(Profile::VsCode),
            "vim" => Ok(Profile::Vim),
            _ => Err(ParseProfileError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn profile_follows_discriminating_tag() {
        assert_eq!(Profile::of_tags(&tags(&["basic", "file"])), Profile::VsCode);
        assert_eq!(Profile::of_tags(&tags(&["vim", "motion"])), Profile::Vim);
        assert_eq!(Profile::of_tags(&tags(&[])), Profile::VsCode);
    }

    #[test]
    fn parses_user_facing_names() {
        assert_eq!("VSCode".parse::<Profile>(), Ok(Profile::VsCode));
        assert_eq!(" vim ".parse::<Profile>(), Ok(Profile::Vim));
        assert!("emacs".parse::<Profile>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Profile::VsCode).unwrap(), "\"vscode\"");
        assert_eq!(serde_json::to_string(&Profile::Vim).unwrap(), "\"vim\"");
        assert_eq!(Profile::default(), Profile::VsCode);
    }
}
