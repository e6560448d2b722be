//! Keyforge: level progression and verification for a keybinding trainer
//!
//! Keyforge drives a sequence of small editing challenges ("levels") inside a
//! host editor. Deciding whether a trigger is satisfied is a pure function of
//! an editing event; everything that touches the editor or the disk sits
//! behind the [`EditingSurface`](surface::EditingSurface) and
//! [`ProgressStore`](progress::ProgressStore) capabilities.
//!
//! # Core Concepts
//!
//! - **Catalog**: validated, read-only levels, partitioned into profiles
//! - **Session**: the [`LevelManager`] state machine owning the current level
//! - **Verifier**: turns editing events into at most one advancement per level
//!
//! # Example
//!
//! ```rust
//! use keyforge::catalog::{LevelCatalog, Profile};
//! use keyforge::progress::MemoryProgressStore;
//! use keyforge::surface::RecordingSurface;
//! use keyforge::{LevelManager, TrainerConfig};
//! use std::sync::Arc;
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let catalog = Arc::new(LevelCatalog::builtin().unwrap());
//! let surface = Arc::new(RecordingSurface::new(std::env::temp_dir()));
//! let mut session = LevelManager::new(
//!     catalog,
//!     surface,
//!     Box::new(MemoryProgressStore::new()),
//!     TrainerConfig::default(),
//! );
//!
//! session.restore_session(Some(Profile::Vim), false).await;
//! assert_eq!(session.current_level().unwrap().id, "vim-001-line-end");
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod progress;
pub mod session;
pub mod surface;
pub mod verifier;

// Re-export commonly used types
pub use catalog::{Level, LevelCatalog, Profile, Trigger};
pub use config::{ConfigError, TrainerConfig};
pub use core::{SessionPhase, State, StateHistory, StateTransition};
pub use session::{Advance, LevelManager};
pub use verifier::{Verdict, Verifier};
