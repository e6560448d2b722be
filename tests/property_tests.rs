//! Property-based tests for catalog partitioning, session resumption and
//! trigger evaluation.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use keyforge::catalog::{Difficulty, Level, LevelCatalog, Position, Profile, Trigger, PROFILE_TAG};
use keyforge::core::{SessionPhase, StateHistory};
use keyforge::progress::{MemoryProgressStore, ProgressRecord};
use keyforge::surface::{ActiveEditor, DocumentId, DocumentSnapshot, RecordingSurface};
use keyforge::verifier::{content_matches, Observation};
use keyforge::{LevelManager, TrainerConfig};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

fn level(id: String, vim: bool) -> Level {
    let tags = if vim {
        [PROFILE_TAG.to_string()].into_iter().collect()
    } else {
        BTreeSet::new()
    };
    Level {
        title: id.clone(),
        id,
        description: String::new(),
        difficulty: Difficulty::Beginner,
        tags,
        setup: None,
        trigger: Trigger::Command {
            command_id: "noop".into(),
        },
        hints: Vec::new(),
    }
}

prop_compose! {
    /// A valid catalog: the first two levels pin one level per profile,
    /// the rest are assigned randomly.
    fn arbitrary_catalog()(flags in prop::collection::vec(any::<bool>(), 0..20)) -> LevelCatalog {
        let mut levels = vec![level("pin-a".into(), false), level("pin-b".into(), true)];
        levels.extend(
            flags
                .into_iter()
                .enumerate()
                .map(|(i, vim)| level(format!("level-{i}"), vim)),
        );
        LevelCatalog::new(levels).unwrap()
    }
}

fn profile_catalog(per_profile: usize) -> Arc<LevelCatalog> {
    let mut levels = Vec::new();
    for i in 0..per_profile {
        levels.push(level(format!("a{i}"), false));
        levels.push(level(format!("v{i}"), true));
    }
    Arc::new(LevelCatalog::new(levels).unwrap())
}

fn manager(catalog: Arc<LevelCatalog>, store: MemoryProgressStore) -> LevelManager {
    LevelManager::new(
        catalog,
        Arc::new(RecordingSurface::new(std::env::temp_dir())),
        Box::new(store),
        TrainerConfig::default(),
    )
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn snapshot(text: String, version: u64) -> DocumentSnapshot {
    DocumentSnapshot {
        document: DocumentId::new("file:///tmp/p.txt"),
        text,
        version,
    }
}

proptest! {
    #[test]
    fn every_level_is_in_exactly_one_profile(catalog in arbitrary_catalog()) {
        let vscode: Vec<&str> = catalog.levels_for(Profile::VsCode).iter().map(|l| l.id.as_str()).collect();
        let vim: Vec<&str> = catalog.levels_for(Profile::Vim).iter().map(|l| l.id.as_str()).collect();

        prop_assert_eq!(vscode.len() + vim.len(), catalog.len());
        for level in catalog.levels() {
            let in_vscode = vscode.contains(&level.id.as_str());
            let in_vim = vim.contains(&level.id.as_str());
            prop_assert!(in_vscode != in_vim);
        }
    }

    #[test]
    fn working_sets_keep_catalog_order(catalog in arbitrary_catalog()) {
        for profile in Profile::ALL {
            let expected: Vec<&str> = catalog
                .levels()
                .iter()
                .filter(|l| l.profile() == profile)
                .map(|l| l.id.as_str())
                .collect();
            let actual: Vec<&str> = catalog.levels_for(profile).iter().map(|l| l.id.as_str()).collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn out_of_range_index_is_clamped_to_zero(
        per_profile in 1usize..8,
        overshoot in 0usize..50,
    ) {
        let mut session = manager(profile_catalog(per_profile), MemoryProgressStore::new());
        session.set_current_index(per_profile + overshoot);

        let id = session.current_level().map(|l| l.id.clone());
        prop_assert_eq!(id.as_deref(), Some("a0"));
        prop_assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn restore_resumes_at_first_incomplete_level(
        completed in prop::collection::vec(any::<bool>(), 5),
        profile in prop_oneof![Just(Profile::VsCode), Just(Profile::Vim)],
    ) {
        let catalog = profile_catalog(5);
        let prefix = if profile == Profile::Vim { "v" } else { "a" };
        let record = ProgressRecord {
            last_active_profile: profile,
            completed_levels: completed
                .iter()
                .enumerate()
                .filter(|(_, done)| **done)
                .map(|(i, _)| format!("{prefix}{i}"))
                .collect(),
            last_level_id: format!("{prefix}4"),
            ..Default::default()
        };
        let store = MemoryProgressStore::with_record("keyforge.progress", record);
        let mut session = manager(catalog, store);

        block_on(session.restore_session(None, false));

        let expected = completed.iter().position(|done| !done).unwrap_or(0);
        prop_assert_eq!(session.current_index(), expected);
        prop_assert_eq!(session.phase(), &SessionPhase::Idle);
    }

    #[test]
    fn contained_target_always_matches(
        before in "[a-z \n]{0,12}",
        target in "[a-z \n]{0,12}",
        after in "[a-z \n]{0,12}",
    ) {
        let text = format!("{before}{target}{after}");
        prop_assert!(content_matches(&text, &target));

        let crlf = text.replace('\n', "\r\n");
        prop_assert!(content_matches(&crlf, &target));
        prop_assert!(content_matches(&text, &target.replace('\n', "\r\n")));
    }

    #[test]
    fn content_trigger_agrees_with_substring_search(
        text in "[ab\n]{0,10}",
        target in "[ab\n]{0,4}",
        version in 1u64..5,
        min_events in prop::option::of(1u64..5),
    ) {
        let trigger = Trigger::Content { match_content: target.clone(), min_events };
        let doc = snapshot(text.clone(), version);
        let fired = Observation::new(&doc, None, None).evaluate(&trigger);

        let gated = min_events.is_some_and(|min| version < min);
        prop_assert_eq!(fired, !gated && text.contains(&target));
    }

    #[test]
    fn selection_fires_only_on_exact_position(
        line in 0u32..5,
        character in 0u32..40,
        target_line in 0u32..5,
        target_character in 0u32..40,
    ) {
        let doc = snapshot(String::new(), 1);
        let active = ActiveEditor { document: doc.document.clone(), cursor: Position::new(line, character) };
        let trigger = Trigger::Selection { match_selection: Position::new(target_line, target_character) };

        let fired = Observation::new(&doc, None, Some(&active)).evaluate(&trigger);
        prop_assert_eq!(fired, line == target_line && character == target_character);
    }

    #[test]
    fn history_never_exceeds_capacity(
        capacity in 1usize..16,
        steps in prop::collection::vec(0usize..4, 0..40),
    ) {
        let phases = [
            SessionPhase::Idle,
            SessionPhase::Transitioning { from_level_id: None },
            SessionPhase::LevelActive { index: 0, level_id: "a0".into() },
            SessionPhase::AllComplete,
        ];
        let mut history = StateHistory::with_capacity(capacity);
        let mut current = SessionPhase::Idle;
        for step in &steps {
            let next = phases[*step].clone();
            history.record(current, next.clone());
            current = next;
        }

        prop_assert_eq!(history.len(), steps.len().min(capacity));
        if let Some(last) = history.last() {
            prop_assert_eq!(&last.to, &current);
        }
    }

    #[test]
    fn score_decreases_with_hints(hints in 0usize..10) {
        let config = TrainerConfig::default();
        prop_assert!(config.score_for(hints + 1) <= config.score_for(hints));
        prop_assert!(config.score_for(hints) <= config.base_score);
    }
}
