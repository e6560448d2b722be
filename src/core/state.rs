//! Session phases of the level progression machine.
//!
//! The trainer moves through a small set of phases while the user works
//! through a profile's levels. Phases are plain values; the [`LevelManager`]
//! owns the current one and records every change in a [`StateHistory`].
//!
//! [`LevelManager`]: crate::session::LevelManager
//! [`StateHistory`]: crate::core::StateHistory

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for values that describe a position in a state machine.
///
/// All methods are pure. Implementors must be serializable so that
/// phase histories can be logged or persisted alongside progress.
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Short name for display and logging.
    fn name(&self) -> &str;

    /// Whether no further transitions are expected from this state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}

/// Where the session currently stands.
///
/// ```text
/// Idle -> LevelActive(i) -> Transitioning -> LevelActive(i + 1)
///                                         \-> AllComplete
/// ```
///
/// `AllComplete` is left again when the user restarts the profile or
/// picks a level explicitly.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum SessionPhase {
    /// No level has been set up yet.
    Idle,
    /// A level's environment is set up and its trigger is being watched.
    LevelActive {
        index: usize,
        #[serde(rename = "levelId")]
        level_id: String,
    },
    /// The previous environment is being torn down and the next one set up.
    Transitioning {
        #[serde(rename = "fromLevelId")]
        from_level_id: Option<String>,
    },
    /// Every level of the current profile was passed through.
    AllComplete,
}

impl SessionPhase {
    /// Id of the active level, if a level is active.
    pub fn active_level_id(&self) -> Option<&str> {
        match self {
            Self::LevelActive { level_id, .. } => Some(level_id),
            _ => None,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Transitioning { .. })
    }
}

impl State for SessionPhase {
    fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::LevelActive { .. } => "LevelActive",
            Self::Transitioning { .. } => "Transitioning",
            Self::AllComplete => "AllComplete",
        }
    }

    fn is_final(&self) -> bool {
        matches!(self, Self::AllComplete)
    }
}
