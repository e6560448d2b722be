//! Core state types of the trainer.
//!
//! - [`State`]: the trait every phase value implements
//! - [`SessionPhase`]: where the level progression currently stands
//! - [`StateHistory`]: bounded, timestamped record of phase changes
//!
//! Nothing in this module touches the editing surface or the progress store.

mod history;
mod state;

pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_CAPACITY};
pub use state::{SessionPhase, State};
