//! Level-changed notifications.

use crate::catalog::Level;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener = Arc<dyn Fn(&Level) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Publish/subscribe channel for "the current level changed".
///
/// Listeners run synchronously, in subscription order, on the task that
/// emitted. A listener may subscribe or unsubscribe others while running;
/// the change applies from the next emission.
#[derive(Clone, Default)]
pub struct LevelEvents {
    registry: Arc<Mutex<Registry>>,
}

/// Handle returned by [`LevelEvents::subscribe`].
///
/// Dropping the handle keeps the listener registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
#[derive(Debug)]
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl LevelEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Level) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Notify every listener. Returns how many were called.
    pub fn emit(&self, level: &Level) -> usize {
        let listeners: Vec<Listener> = lock(&self.registry)
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in &listeners {
            listener(level);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

impl fmt::Debug for LevelEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Subscription {
    /// Remove the listener. Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = lock(&registry);
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _)| *id != self.id);
        registry.listeners.len() != before
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Difficulty, Trigger};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn level(id: &str) -> Level {
        Level {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            difficulty: Difficulty::Beginner,
            tags: Default::default(),
            setup: None,
            trigger: Trigger::Command {
                command_id: "noop".into(),
            },
            hints: Vec::new(),
        }
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let events = LevelEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        let _a = events.subscribe(move |l| first.lock().unwrap().push(format!("a:{}", l.id)));
        let second = Arc::clone(&seen);
        let _b = events.subscribe(move |l| second.lock().unwrap().push(format!("b:{}", l.id)));

        assert_eq!(events.emit(&level("001")), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["a:001", "b:001"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let events = LevelEvents::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let subscription = events.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        events.emit(&level("x"));
        assert!(subscription.unsubscribe());
        events.emit(&level("y"));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn unsubscribe_after_channel_dropped_is_harmless() {
        let events = LevelEvents::new();
        let subscription = events.subscribe(|_| {});
        drop(events);
        assert!(!subscription.unsubscribe());
    }

    #[test]
    fn listener_may_subscribe_during_emit() {
        let events = LevelEvents::new();
        let inner = events.clone();
        let _s = events.subscribe(move |_| {
            let _late = inner.subscribe(|_| {});
        });

        assert_eq!(events.emit(&level("x")), 1);
        assert_eq!(events.listener_count(), 2);
    }
}
