//! The level manager: session state machine of the trainer.

use super::events::{LevelEvents, Subscription};
use super::scratch::{scratch_path, ScratchFile};
use crate::catalog::{Level, LevelCatalog, LevelSetup, Profile};
use crate::config::TrainerConfig;
use crate::core::{SessionPhase, StateHistory};
use crate::progress::{LevelStats, ProgressError, ProgressRecord, ProgressStore};
use crate::surface::{CompletionChoice, EditingSurface, SurfaceError, CLOSE_ALL_EDITORS_COMMAND};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of [`LevelManager::next_level`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The following level of the profile was started.
    Started { level_id: String },
    /// The profile was finished, the user chose to restart, and the first
    /// level was started again.
    Restarted { level_id: String },
    /// The profile was finished and the user chose to stop.
    AllComplete,
    /// The session moved to another level before a pending advancement
    /// ran, so nothing was advanced. Never returned by
    /// [`LevelManager::next_level`] itself.
    Superseded,
}

/// Outcome of [`LevelManager::reveal_hint`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HintReveal {
    /// The next hint; `number` is 1-based.
    Hint {
        text: String,
        number: usize,
        total: usize,
    },
    /// Every hint of the level has been shown already.
    Exhausted { total: usize },
}

/// Completion numbers for the current profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressSummary {
    pub profile: Profile,
    pub completed: usize,
    pub total: usize,
    /// Sum of best scores over every completed level of every profile.
    pub total_score: u32,
}

/// Owns the active profile, the current level, completion marks and the
/// scratch environment of the active level.
///
/// The current index always addresses the working set of the current
/// profile, never the whole catalog. Setup and teardown are awaited in
/// sequence, so two levels' scratch files never coexist.
///
/// Persistence failures are logged (the first one as a warning) and the
/// session carries on with its in-memory state.
pub struct LevelManager {
    catalog: Arc<LevelCatalog>,
    surface: Arc<dyn EditingSurface>,
    store: Box<dyn ProgressStore>,
    config: TrainerConfig,
    profile: Profile,
    current_index: usize,
    completed: BTreeSet<String>,
    scores: BTreeMap<String, u32>,
    stats: BTreeMap<String, LevelStats>,
    hints_revealed: usize,
    level_started_at: Option<DateTime<Utc>>,
    scratch: Option<ScratchFile>,
    phase: SessionPhase,
    history: StateHistory<SessionPhase>,
    events: LevelEvents,
    persistence_warned: bool,
}

impl LevelManager {
    /// Create a manager and load the stored progress, if any.
    pub fn new(
        catalog: Arc<LevelCatalog>,
        surface: Arc<dyn EditingSurface>,
        store: Box<dyn ProgressStore>,
        config: TrainerConfig,
    ) -> Self {
        let mut manager = Self {
            catalog,
            surface,
            store,
            config,
            profile: Profile::default(),
            current_index: 0,
            completed: BTreeSet::new(),
            scores: BTreeMap::new(),
            stats: BTreeMap::new(),
            hints_revealed: 0,
            level_started_at: None,
            scratch: None,
            phase: SessionPhase::Idle,
            history: StateHistory::new(),
            events: LevelEvents::new(),
            persistence_warned: false,
        };
        manager.load_progress();
        manager
    }

    fn load_progress(&mut self) {
        let record = match self.store.get(&self.config.progress_key) {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(e) => {
                self.report_persistence_failure("load", &e);
                return;
            }
        };

        self.profile = record.last_active_profile;
        self.current_index = self
            .catalog
            .position_for(self.profile, &record.last_level_id)
            .unwrap_or(0);
        self.completed = record.completed_levels;
        self.scores = record.scores;
        self.stats = record.stats;
        debug!(
            profile = %self.profile,
            completed = self.completed.len(),
            "loaded stored progress"
        );
    }

    /// The working set of `profile`, in catalog order.
    pub fn levels(&self, profile: Profile) -> Vec<&Level> {
        self.catalog.levels_for(profile)
    }

    /// The working set of the current profile.
    pub fn current_levels(&self) -> Vec<&Level> {
        self.catalog.levels_for(self.profile)
    }

    /// The level the current index points at.
    ///
    /// An index past the end of the working set is reset to 0 first.
    pub fn current_level(&mut self) -> Option<&Level> {
        self.clamp_index();
        self.catalog.level_for(self.profile, self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Point the current index somewhere without touching the editing
    /// surface. Out of range values are reset by [`current_level`](Self::current_level).
    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = index;
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn is_level_completed(&self, level_id: &str) -> bool {
        self.completed.contains(level_id)
    }

    pub fn completed_levels(&self) -> &BTreeSet<String> {
        &self.completed
    }

    /// Best score recorded for `level_id`.
    pub fn score(&self, level_id: &str) -> Option<u32> {
        self.scores.get(level_id).copied()
    }

    /// Practice statistics of `level_id`, if it was ever started or completed.
    pub fn stats(&self, level_id: &str) -> Option<&LevelStats> {
        self.stats.get(level_id)
    }

    pub fn all_stats(&self) -> &BTreeMap<String, LevelStats> {
        &self.stats
    }

    pub fn hints_revealed(&self) -> usize {
        self.hints_revealed
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn history(&self) -> &StateHistory<SessionPhase> {
        &self.history
    }

    /// Path of the active scratch file, if one exists.
    pub fn scratch_path(&self) -> Option<&Path> {
        self.scratch.as_ref().map(|s| s.path.as_path())
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<LevelCatalog> {
        &self.catalog
    }

    pub fn surface(&self) -> &Arc<dyn EditingSurface> {
        &self.surface
    }

    pub fn events(&self) -> &LevelEvents {
        &self.events
    }

    /// Listen for level changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Level) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Whether a progress record exists in the store.
    pub fn has_progress(&mut self) -> bool {
        match self.store.get(&self.config.progress_key) {
            Ok(record) => record.is_some(),
            Err(e) => {
                self.report_persistence_failure("load", &e);
                false
            }
        }
    }

    pub fn progress_summary(&self) -> ProgressSummary {
        let levels = self.catalog.levels_for(self.profile);
        ProgressSummary {
            profile: self.profile,
            completed: levels
                .iter()
                .filter(|l| self.completed.contains(&l.id))
                .count(),
            total: levels.len(),
            total_score: self.scores.values().sum(),
        }
    }

    /// Switch to `profile` and resume at its first incomplete level.
    ///
    /// Emits a level-changed notification but leaves the editing surface
    /// alone; call [`start_level`](Self::start_level) to set the level up.
    /// Returns `false` if `profile` was already active.
    pub fn set_profile(&mut self, profile: Profile) -> bool {
        if profile == self.profile {
            return false;
        }
        info!(from = %self.profile, to = %profile, "switching profile");
        if self.resume(Some(profile)).is_some() {
            self.emit_current();
        }
        true
    }

    /// Resume at the first incomplete level of the (optionally forced)
    /// profile, or at its first level if everything is complete.
    ///
    /// With `auto_start` the level is set up through
    /// [`start_level`](Self::start_level); otherwise only the level-changed
    /// notification is emitted.
    pub async fn restore_session(&mut self, force_profile: Option<Profile>, auto_start: bool) {
        let Some(level_id) = self.resume(force_profile) else {
            return;
        };
        if auto_start {
            self.start_level(&level_id).await;
        } else {
            self.emit_current();
        }
    }

    fn resume(&mut self, force_profile: Option<Profile>) -> Option<String> {
        let previous = self.current_level_id();
        if let Some(profile) = force_profile {
            self.profile = profile;
        }
        let first_incomplete = self
            .catalog
            .levels_for(self.profile)
            .iter()
            .position(|l| !self.completed.contains(&l.id));
        self.current_index = first_incomplete.unwrap_or(0);
        self.persist();

        let level_id = self.current_level_id();
        if level_id != previous {
            self.hints_revealed = 0;
            self.level_started_at = None;
        }
        self.leave_all_complete();
        info!(
            profile = %self.profile,
            index = self.current_index,
            level_id = level_id.as_deref().unwrap_or(""),
            all_complete = first_incomplete.is_none(),
            "session resumed"
        );
        level_id
    }

    /// Tear down the active environment and set up `level_id`.
    ///
    /// Ids outside the current profile's working set are ignored and
    /// `false` is returned.
    pub async fn start_level(&mut self, level_id: &str) -> bool {
        let Some(index) = self.catalog.position_for(self.profile, level_id) else {
            debug!(level_id, profile = %self.profile, "ignoring unknown level");
            return false;
        };
        let catalog = Arc::clone(&self.catalog);
        let Some(level) = catalog.level_for(self.profile, index) else {
            return false;
        };

        let from_level_id = self.phase.active_level_id().map(str::to_string);
        self.enter(SessionPhase::Transitioning { from_level_id });
        self.teardown_environment().await;

        self.current_index = index;
        self.hints_revealed = 0;
        let now = Utc::now();
        self.level_started_at = Some(now);
        self.stats
            .entry(level.id.clone())
            .or_default()
            .record_attempt(now);
        self.setup_environment(level).await;

        self.enter(SessionPhase::LevelActive {
            index,
            level_id: level.id.clone(),
        });
        info!(level_id = %level.id, index, profile = %self.profile, "level started");
        self.events.emit(level);
        true
    }

    /// Move to the following level, or finish the profile.
    pub async fn next_level(&mut self) -> Advance {
        self.clamp_index();
        let next = self
            .catalog
            .level_for(self.profile, self.current_index + 1)
            .map(|l| l.id.clone());
        if let Some(level_id) = next {
            self.start_level(&level_id).await;
            return Advance::Started { level_id };
        }

        let from_level_id = self.phase.active_level_id().map(str::to_string);
        self.enter(SessionPhase::Transitioning { from_level_id });
        self.teardown_environment().await;
        self.enter(SessionPhase::AllComplete);
        info!(profile = %self.profile, "all levels of the profile complete");

        match self.surface.prompt_all_complete().await {
            CompletionChoice::Restart => self.restart_profile().await,
            CompletionChoice::Stop => Advance::AllComplete,
        }
    }

    async fn restart_profile(&mut self) -> Advance {
        let ids: Vec<String> = self
            .catalog
            .levels_for(self.profile)
            .iter()
            .map(|l| l.id.clone())
            .collect();
        for id in &ids {
            self.completed.remove(id);
        }
        self.current_index = 0;
        self.persist();
        info!(profile = %self.profile, "profile restarted");

        match ids.into_iter().next() {
            Some(level_id) => {
                self.start_level(&level_id).await;
                Advance::Restarted { level_id }
            }
            None => Advance::AllComplete,
        }
    }

    /// Mark the current level complete and persist.
    ///
    /// Returns `false`, without writing, if it was already complete.
    pub fn mark_current_level_complete(&mut self) -> bool {
        let Some(level_id) = self.current_level().map(|l| l.id.clone()) else {
            return false;
        };
        if self.completed.contains(&level_id) {
            return false;
        }

        let score = self.config.score_for(self.hints_revealed);
        let best = self.scores.entry(level_id.clone()).or_insert(0);
        *best = (*best).max(score);
        self.completed.insert(level_id.clone());

        let elapsed = self
            .level_started_at
            .and_then(|started| Utc::now().signed_duration_since(started).to_std().ok());
        self.stats
            .entry(level_id.clone())
            .or_default()
            .record_completion(elapsed, self.hints_revealed);
        info!(
            level_id = %level_id,
            score,
            hints = self.hints_revealed,
            elapsed = ?elapsed,
            "level completed"
        );
        self.persist();
        true
    }

    /// Show the next hint of the current level.
    pub fn reveal_hint(&mut self) -> HintReveal {
        let revealed = self.hints_revealed;
        let Some(level) = self.current_level() else {
            return HintReveal::Exhausted { total: 0 };
        };
        let total = level.hints.len();
        match level.hints.get(revealed).cloned() {
            Some(text) => {
                self.hints_revealed += 1;
                HintReveal::Hint {
                    text,
                    number: revealed + 1,
                    total,
                }
            }
            None => HintReveal::Exhausted { total },
        }
    }

    /// Forget every completion, score and statistic, and point at the first
    /// level.
    ///
    /// The active environment stays as it is.
    pub fn reset_progress(&mut self) {
        self.completed.clear();
        self.scores.clear();
        self.stats.clear();
        self.current_index = 0;
        self.hints_revealed = 0;
        self.level_started_at = None;
        self.leave_all_complete();
        info!(profile = %self.profile, "progress reset");
        self.persist();
    }

    async fn setup_environment(&mut self, level: &Level) {
        let Some(setup) = &level.setup else {
            debug!(level_id = %level.id, "level has no setup, leaving the surface as is");
            return;
        };
        if let Err(e) = self.try_setup(level, setup).await {
            warn!(level_id = %level.id, error = %e, "level environment setup failed");
        }
    }

    async fn try_setup(&mut self, level: &Level, setup: &LevelSetup) -> Result<(), SurfaceError> {
        let dir = self
            .config
            .scratch_dir
            .clone()
            .unwrap_or_else(|| self.surface.temp_dir());
        let path = scratch_path(&dir, &self.config.scratch_prefix, level, setup);

        self.surface.write_file(&path, &setup.initial_content)?;
        self.scratch = Some(ScratchFile::new(path.clone()));

        let document = self.surface.open_document(&path, &setup.file_type).await?;
        if let Some(scratch) = self.scratch.as_mut() {
            scratch.document = Some(document.clone());
        }
        self.surface.show_document(&document).await?;

        if let Some(position) = setup.initial_selection {
            self.surface.set_cursor(&document, position).await?;
            self.surface.reveal(&document, position).await?;
        }
        self.surface.show_status(&format!("Task: {}", level.title));
        debug!(level_id = %level.id, path = %path.display(), "level environment ready");
        Ok(())
    }

    async fn teardown_environment(&mut self) {
        if let Err(e) = self
            .surface
            .execute_command(CLOSE_ALL_EDITORS_COMMAND)
            .await
        {
            warn!(error = %e, "failed to close editors");
        }

        let Some(scratch) = self.scratch.take() else {
            return;
        };
        match self.surface.delete_file(&scratch.path) {
            Ok(()) => debug!(path = %scratch.path.display(), "scratch file removed"),
            Err(e) => warn!(
                path = %scratch.path.display(),
                error = %e,
                "failed to clean up scratch file"
            ),
        }
    }

    fn clamp_index(&mut self) {
        let count = self.catalog.count_for(self.profile);
        if self.current_index >= count {
            debug!(
                index = self.current_index,
                count,
                profile = %self.profile,
                "current index out of range, resetting to 0"
            );
            self.current_index = 0;
        }
    }

    fn current_level_id(&self) -> Option<String> {
        self.catalog
            .level_for(self.profile, self.current_index)
            .map(|l| l.id.clone())
    }

    /// A finished profile stops being finished once the session points at
    /// a level again.
    fn leave_all_complete(&mut self) {
        if self.phase == SessionPhase::AllComplete {
            self.enter(SessionPhase::Idle);
        }
    }

    fn enter(&mut self, phase: SessionPhase) {
        if phase != self.phase {
            let previous = std::mem::replace(&mut self.phase, phase.clone());
            self.history.record(previous, phase);
        }
    }

    fn emit_current(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        self.clamp_index();
        if let Some(level) = catalog.level_for(self.profile, self.current_index) {
            self.events.emit(level);
        }
    }

    fn persist(&mut self) {
        let record = ProgressRecord {
            last_active_profile: self.profile,
            completed_levels: self.completed.clone(),
            last_level_id: self.current_level_id().unwrap_or_default(),
            scores: self.scores.clone(),
            stats: self.stats.clone(),
            updated_at: Some(Utc::now()),
        };
        if let Err(e) = self.store.set(&self.config.progress_key, &record) {
            self.report_persistence_failure("save", &e);
        }
    }

    fn report_persistence_failure(&mut self, operation: &str, error: &ProgressError) {
        if self.persistence_warned {
            debug!(operation, error = %error, "progress store still unavailable");
        } else {
            warn!(
                operation,
                error = %error,
                "progress store unavailable, continuing with in-memory progress only"
            );
            self.persistence_warned = true;
        }
    }
}

impl fmt::Debug for LevelManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelManager")
            .field("profile", &self.profile)
            .field("current_index", &self.current_index)
            .field("completed", &self.completed)
            .field("phase", &self.phase)
            .field("scratch", &self.scratch)
            .finish_non_exhaustive()
    }
}
