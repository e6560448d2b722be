//! Trainer configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```rust
//! use keyforge::TrainerConfig;
//!
//! let config = TrainerConfig::from_toml_str("advance_delay_ms = 250").unwrap();
//! assert_eq!(config.advance_delay().as_millis(), 250);
//! assert_eq!(config.progress_key, "keyforge.progress");
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid trainer configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Key the progress record is stored under.
    pub progress_key: String,
    /// Pause between a level's success and the start of the next level.
    pub advance_delay_ms: u64,
    /// Directory for scratch files. Falls back to the surface's temp directory.
    pub scratch_dir: Option<PathBuf>,
    /// File name prefix of scratch files.
    pub scratch_prefix: String,
    /// Score for a level completed without hints.
    pub base_score: u32,
    /// Points deducted per revealed hint.
    pub hint_penalty: u32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            progress_key: "keyforge.progress".to_string(),
            advance_delay_ms: 1500,
            scratch_dir: None,
            scratch_prefix: "keyforge_level_".to_string(),
            base_score: 100,
            hint_penalty: 20,
        }
    }
}

impl TrainerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    /// Score earned after revealing `hints_revealed` hints.
    pub fn score_for(&self, hints_revealed: usize) -> u32 {
        let penalty = u32::try_from(hints_revealed)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.hint_penalty);
        self.base_score.saturating_sub(penalty)
    }
}
