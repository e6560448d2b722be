//! Catalog error types.

use super::profile::Profile;
use thiserror::Error;

/// A single problem found while validating a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogIssue {
    #[error("Level at position {index} has an empty id")]
    EmptyId { index: usize },

    #[error("Level id '{id}' appears more than once")]
    DuplicateId { id: String },

    #[error("Profile '{profile}' has no levels")]
    EmptyProfile { profile: Profile },

    #[error("Level '{id}' has a content trigger with an empty target")]
    EmptyMatchContent { id: String },
}

/// Errors that can occur when loading a level catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog document is not valid JSON for the level schema
    #[error("Failed to parse level catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog parsed but breaks one or more invariants
    #[error("Level catalog failed validation with {} issue(s): {}", .issues.len(), join_issues(.issues))]
    Invalid { issues: Vec<CatalogIssue> },
}

fn join_issues(issues: &[CatalogIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
