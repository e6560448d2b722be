//! Per-level practice statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a user has fared on one level across sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelStats {
    /// Times the level was started.
    pub attempts: u32,
    /// Times the level was completed.
    pub completions: u32,
    /// Hints revealed over all completions.
    pub hints_used: u32,
    /// Sum of completion times, in milliseconds.
    pub total_time_ms: u64,
    /// Fastest completion, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl LevelStats {
    pub fn record_attempt(&mut self, at: DateTime<Utc>) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_attempt_at = Some(at);
    }

    /// Count a completion. `elapsed` is `None` when the level was completed
    /// without having been started in this session.
    pub fn record_completion(&mut self, elapsed: Option<Duration>, hints_used: usize) {
        self.completions = self.completions.saturating_add(1);
        self.hints_used = self
            .hints_used
            .saturating_add(u32::try_from(hints_used).unwrap_or(u32::MAX));
        if let Some(elapsed) = elapsed {
            let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            self.total_time_ms = self.total_time_ms.saturating_add(ms);
            self.best_time_ms = Some(self.best_time_ms.map_or(ms, |best| best.min(ms)));
        }
    }

    pub fn best_time(&self) -> Option<Duration> {
        self.best_time_ms.map(Duration::from_millis)
    }

    /// Mean time over timed completions.
    pub fn average_time(&self) -> Option<Duration> {
        if self.completions == 0 || self.best_time_ms.is_none() {
            return None;
        }
        Some(Duration::from_millis(
            self.total_time_ms / u64::from(self.completions),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_time_keeps_the_fastest_completion() {
        let mut stats = LevelStats::default();
        stats.record_attempt(Utc::now());
        stats.record_completion(Some(Duration::from_millis(4000)), 1);
        stats.record_attempt(Utc::now());
        stats.record_completion(Some(Duration::from_millis(2500)), 0);

        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.completions, 2);
        assert_eq!(stats.hints_used, 1);
        assert_eq!(stats.best_time(), Some(Duration::from_millis(2500)));
        assert_eq!(stats.average_time(), Some(Duration::from_millis(3250)));
    }

    #[test]
    fn untimed_completion_leaves_times_alone() {
        let mut stats = LevelStats::default();
        stats.record_completion(None, 2);

        assert_eq!(stats.completions, 1);
        assert_eq!(stats.best_time(), None);
        assert_eq!(stats.average_time(), None);
        assert_eq!(stats.total_time_ms, 0);
    }

    #[test]
    fn missing_fields_default() {
        let stats: LevelStats = serde_json::from_str(r#"{ "attempts": 3 }"#).unwrap();
        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.best_time_ms, None);
    }
}
