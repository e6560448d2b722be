//! The level catalog.
//!
//! An ordered, immutable collection of [`Level`]s. Each level belongs to
//! exactly one [`Profile`] working set, decided by the presence of the
//! [`PROFILE_TAG`] in its tags. Catalog order is the order levels are played.
//!
//! Catalogs are validated once on construction. Validation collects every
//! problem instead of stopping at the first, so a broken catalog file can be
//! fixed in one pass:
//!
//! ```rust
//! use keyforge::catalog::{CatalogError, LevelCatalog};
//!
//! let err = LevelCatalog::from_json(r#"{ "levels": [] }"#).unwrap_err();
//! match err {
//!     CatalogError::Invalid { issues } => assert_eq!(issues.len(), 2),
//!     other => panic!("unexpected error: {other}"),
//! }
//! ```

mod error;
mod level;
mod profile;

pub use error::{CatalogError, CatalogIssue};
pub use level::{Difficulty, Level, LevelSetup, Position, Trigger};
pub use profile::{ParseProfileError, Profile, PROFILE_TAG};

use serde::Deserialize;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

const BUILTIN_CATALOG: &str = include_str!("../../levels/catalog.json");

#[derive(Deserialize)]
struct CatalogDocument {
    levels: Vec<Level>,
}

/// Validated, read-only level collection.
#[derive(Clone, Debug)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Build a catalog, checking every invariant.
    pub fn new(levels: Vec<Level>) -> Result<Self, CatalogError> {
        match validate(&levels) {
            Validation::Success(_) => Ok(Self { levels }),
            Validation::Failure(issues) => Err(CatalogError::Invalid {
                issues: issues.iter().cloned().collect(),
            }),
        }
    }

    /// Parse a `{ "levels": [...] }` document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::new(document.levels)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// All levels in catalog order.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// The working set of `profile`, in catalog order.
    pub fn levels_for(&self, profile: Profile) -> Vec<&Level> {
        self.iter_for(profile).collect()
    }

    pub fn count_for(&self, profile: Profile) -> usize {
        self.iter_for(profile).count()
    }

    /// Level at `index` within the working set of `profile`.
    pub fn level_for(&self, profile: Profile, index: usize) -> Option<&Level> {
        self.iter_for(profile).nth(index)
    }

    /// Index of `id` within the working set of `profile`.
    pub fn position_for(&self, profile: Profile, id: &str) -> Option<usize> {
        self.iter_for(profile).position(|l| l.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn iter_for(&self, profile: Profile) -> impl Iterator<Item = &Level> {
        self.levels.iter().filter(move |l| l.profile() == profile)
    }
}

fn validate(levels: &[Level]) -> Validation<(), NonEmptyVec<CatalogIssue>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<CatalogIssue>>> = Vec::new();
    let mut seen = HashSet::new();

    for (index, level) in levels.iter().enumerate() {
        if level.id.trim().is_empty() {
            checks.push(Validation::fail(CatalogIssue::EmptyId { index }));
        } else if !seen.insert(level.id.as_str()) {
            checks.push(Validation::fail(CatalogIssue::DuplicateId {
                id: level.id.clone(),
            }));
        }

        if let Trigger::Content { match_content, .. } = &level.trigger {
            if match_content.replace('\r', "").is_empty() {
                checks.push(Validation::fail(CatalogIssue::EmptyMatchContent {
                    id: level.id.clone(),
                }));
            }
        }
    }

    for profile in Profile::ALL {
        let check = if levels.iter().any(|l| l.profile() == profile) {
            Validation::success(())
        } else {
            Validation::fail(CatalogIssue::EmptyProfile { profile })
        };
        checks.push(check);
    }

    Validation::all_vec(checks).map(|_| ())
}
