//! Phase transition history.
//!
//! Keeps the most recent transitions of a session so the presentation layer
//! and logs can show how the user moved through a profile.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of transitions retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// One recorded move between two states.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being left
    pub from: S,
    /// The state being entered
    pub to: S,
    /// When the move happened
    pub timestamp: DateTime<Utc>,
}

/// Bounded, ordered history of transitions.
///
/// Once `capacity` entries are held the oldest one is dropped for every new
/// record, so a long-running session never grows without bound.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: VecDeque<StateTransition<S>>,
    capacity: usize,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<S: State> StateHistory<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history keeping at most `capacity` transitions (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            transitions: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    /// Append a transition stamped with the current time.
    pub fn record(&mut self, from: S, to: S) {
        self.push(StateTransition {
            from,
            to,
            timestamp: Utc::now(),
        });
    }

    /// Append an already stamped transition.
    pub fn push(&mut self, transition: StateTransition<S>) {
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// States traversed, oldest first: the first retained `from`, then every `to`.
    pub fn path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        path.extend(self.transitions.iter().map(|t| &t.to));
        path
    }

    /// Most recent transition.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.back()
    }

    /// Time spent since the most recent transition, `None` when empty.
    pub fn time_in_current(&self) -> Option<Duration> {
        self.last()
            .and_then(|t| Utc::now().signed_duration_since(t.timestamp).to_std().ok())
    }

    /// Number of retained transitions entering a state with the given name.
    pub fn count_entries(&self, name: &str) -> usize {
        self.transitions
            .iter()
            .filter(|t| t.to.name() == name)
            .count()
    }

    pub fn transitions(&self) -> impl ExactSizeIterator<Item = &StateTransition<S>> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
