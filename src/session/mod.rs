//! Level progression: the current profile, the current level and the
//! scratch environment that goes with it.

mod events;
mod manager;
mod scratch;

pub use events::{LevelEvents, Subscription};
pub use manager::{Advance, HintReveal, LevelManager, ProgressSummary};
pub use scratch::{scratch_path, ScratchFile};
