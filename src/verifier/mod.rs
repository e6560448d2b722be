//! Turning editing events into level completions.
//!
//! The [`Verifier`] evaluates every [`SurfaceEvent`] against the current
//! level's trigger. The first success for a level marks it complete right
//! away and schedules advancement after a short, configurable delay. Until
//! that advancement has finished, further successes are suppressed: editing
//! events arrive in bursts, and one keystroke must not advance two levels.

mod observation;

pub use observation::{command_matches, content_matches, cursor_matches, Observation};

use crate::core::SessionPhase;
use crate::session::{Advance, LevelManager};
use crate::surface::{DocumentSnapshot, SurfaceEvent, SAVE_COMMAND};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Advancement guard of the [`Verifier`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AdvanceGuard {
    /// No advancement pending; the next success is handled.
    #[default]
    Ready,
    /// A success for `level_id` is waiting for its advancement to finish.
    Advancing { level_id: String },
}

/// What the verifier did with an event.
#[derive(Debug)]
pub enum Verdict {
    /// The current level's trigger is not satisfied.
    NoMatch,
    /// The event was not evaluated: a metadata-only change, or no level is
    /// in play.
    Ignored,
    /// The trigger is satisfied but an advancement is already pending.
    Suppressed,
    /// The level was completed; the handle resolves once the session has
    /// moved on.
    Advancing(JoinHandle<Advance>),
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Advancing(_))
    }
}

/// Success detection and debounced advancement.
#[derive(Clone, Debug)]
pub struct Verifier {
    session: Arc<tokio::sync::Mutex<LevelManager>>,
    guard: Arc<Mutex<AdvanceGuard>>,
    delay: Duration,
}

impl Verifier {
    /// Verifier using the session's configured advance delay.
    pub async fn new(session: Arc<tokio::sync::Mutex<LevelManager>>) -> Self {
        let delay = session.lock().await.config().advance_delay();
        Self::with_delay(session, delay)
    }

    pub fn with_delay(session: Arc<tokio::sync::Mutex<LevelManager>>, delay: Duration) -> Self {
        Self {
            session,
            guard: Arc::new(Mutex::new(AdvanceGuard::Ready)),
            delay,
        }
    }

    pub fn session(&self) -> &Arc<tokio::sync::Mutex<LevelManager>> {
        &self.session
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn guard(&self) -> AdvanceGuard {
        lock(&self.guard).clone()
    }

    pub fn is_advancing(&self) -> bool {
        matches!(*lock(&self.guard), AdvanceGuard::Advancing { .. })
    }

    /// Evaluate one editing event.
    pub async fn handle_event(&self, event: SurfaceEvent) -> Verdict {
        let command_id = match &event {
            SurfaceEvent::Changed {
                content_changes: 0, ..
            } => return Verdict::Ignored,
            SurfaceEvent::Saved(_) => Some(SAVE_COMMAND),
            _ => None,
        };
        self.check(event.document(), command_id).await
    }

    /// Complete the current level if its trigger is the command `command_id`.
    ///
    /// For hosts that intercept a command themselves, since arbitrary
    /// command executions do not show up as editing events.
    pub async fn manual_check_command(&self, command_id: &str) -> Verdict {
        let mut session = self.session.lock().await;
        if !in_play(session.phase()) {
            return Verdict::Ignored;
        }
        let Some(level) = session.current_level() else {
            return Verdict::Ignored;
        };
        if !command_matches(&level.trigger, command_id) {
            return Verdict::NoMatch;
        }
        let (level_id, title) = (level.id.clone(), level.title.clone());
        self.succeed(&mut session, level_id, title)
    }

    async fn check(&self, document: &DocumentSnapshot, command_id: Option<&str>) -> Verdict {
        let mut session = self.session.lock().await;
        if !in_play(session.phase()) {
            return Verdict::Ignored;
        }
        let active = session.surface().active_editor();
        let Some(level) = session.current_level() else {
            return Verdict::Ignored;
        };

        let observation = Observation::new(document, command_id, active.as_ref());
        if !observation.evaluate(&level.trigger) {
            return Verdict::NoMatch;
        }
        let (level_id, title) = (level.id.clone(), level.title.clone());
        self.succeed(&mut session, level_id, title)
    }

    fn succeed(&self, session: &mut LevelManager, level_id: String, title: String) -> Verdict {
        {
            let mut guard = lock(&self.guard);
            if let AdvanceGuard::Advancing { level_id: pending } = &*guard {
                debug!(level_id = %level_id, pending = %pending, "success suppressed, advancement pending");
                return Verdict::Suppressed;
            }
            *guard = AdvanceGuard::Advancing {
                level_id: level_id.clone(),
            };
        }

        session.mark_current_level_complete();
        session.surface().show_status(&format!("Completed: {title}"));
        info!(level_id = %level_id, delay = ?self.delay, "level succeeded, advancing");

        let shared = Arc::clone(&self.session);
        let release = ReleaseOnDrop(Arc::clone(&self.guard));
        let delay = self.delay;
        Verdict::Advancing(tokio::spawn(async move {
            let _release = release;
            tokio::time::sleep(delay).await;
            let mut session = shared.lock().await;
            let current = session.current_level().map(|l| l.id.clone());
            if current.as_deref() != Some(level_id.as_str()) {
                debug!(
                    level_id = %level_id,
                    current = current.as_deref().unwrap_or(""),
                    "level changed during the delay, advancement dropped"
                );
                return Advance::Superseded;
            }
            let advance = session.next_level().await;
            debug!(?advance, "advancement finished");
            advance
        }))
    }
}

/// Puts the guard back to `Ready` when the advancement task ends, whether it
/// returns, panics or is aborted.
struct ReleaseOnDrop(Arc<Mutex<AdvanceGuard>>);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        *lock(&self.0) = AdvanceGuard::Ready;
    }
}

fn in_play(phase: &SessionPhase) -> bool {
    !matches!(phase, SessionPhase::AllComplete)
}

fn lock(guard: &Mutex<AdvanceGuard>) -> MutexGuard<'_, AdvanceGuard> {
    guard.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn guard_is_released_when_the_task_panics() {
        let guard = Arc::new(Mutex::new(AdvanceGuard::Advancing {
            level_id: "001-save-file".into(),
        }));
        let release = ReleaseOnDrop(Arc::clone(&guard));

        let handle = tokio::spawn(async move {
            let _release = release;
            panic!("advancement failed");
        });

        assert!(handle.await.unwrap_err().is_panic());
        assert_eq!(*lock(&guard), AdvanceGuard::Ready);
    }

    #[tokio::test]
    async fn guard_is_released_when_the_task_is_aborted() {
        let guard = Arc::new(Mutex::new(AdvanceGuard::Advancing {
            level_id: "001-save-file".into(),
        }));
        let release = ReleaseOnDrop(Arc::clone(&guard));

        let handle = tokio::spawn(async move {
            let _release = release;
            std::future::pending::<()>().await;
        });
        handle.abort();

        assert!(handle.await.unwrap_err().is_cancelled());
        assert_eq!(*lock(&guard), AdvanceGuard::Ready);
    }
}
