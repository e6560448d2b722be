//! Scripted Session
//!
//! This example plays the first levels of the built-in Vim profile against a
//! headless editing surface, feeding the verifier the events a user's
//! keystrokes would produce.
//!
//! Key concepts:
//! - Session restore and automatic level setup
//! - Event-driven verification with debounced advancement
//! - Hints and scoring
//! - Durable progress in a JSON file
//!
//! Run with: RUST_LOG=keyforge=debug cargo run --example scripted_session

use keyforge::catalog::{LevelCatalog, Position, Profile};
use keyforge::progress::JsonFileProgressStore;
use keyforge::session::HintReveal;
use keyforge::surface::RecordingSurface;
use keyforge::{LevelManager, TrainerConfig, Verdict, Verifier};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Scripted Vim Session ===\n");

    let workdir = std::env::temp_dir().join("keyforge-demo");
    std::fs::create_dir_all(&workdir)?;

    let config = TrainerConfig::from_toml_str("advance_delay_ms = 300")?;
    let surface = Arc::new(RecordingSurface::new(&workdir));
    let mut manager = LevelManager::new(
        Arc::new(LevelCatalog::builtin()?),
        surface.clone(),
        Box::new(JsonFileProgressStore::new(workdir.join("state"))),
        config,
    );
    manager.reset_progress();
    let _subscription = manager.subscribe(|level| {
        println!("-> {} ({})", level.title, level.id);
        println!("   {}", level.description);
    });
    manager.restore_session(Some(Profile::Vim), true).await;

    let session = Arc::new(Mutex::new(manager));
    let verifier = Verifier::new(Arc::clone(&session)).await;

    // Jump to the end of the line with `$`, after peeking at a hint.
    if let HintReveal::Hint { text, number, total } = session.lock().await.reveal_hint() {
        println!("   hint {number}/{total}: {text}");
    }
    for character in [10, 24] {
        let event = surface.move_cursor(Position::new(0, character))?;
        report(verifier.handle_event(event).await).await?;
    }

    // `dd` on the second line.
    let event = surface.edit("keep this line\nkeep this too")?;
    report(verifier.handle_event(event).await).await?;

    // `w` lands on the second word.
    let event = surface.move_cursor(Position::new(0, 6))?;
    report(verifier.handle_event(event).await).await?;

    let session = session.lock().await;
    let summary = session.progress_summary();
    println!(
        "\nProgress ({}): {}/{} levels, {} points",
        summary.profile.display_name(),
        summary.completed,
        summary.total,
        summary.total_score
    );
    println!("Phases visited: {}", session.history().len());

    Ok(())
}

async fn report(verdict: Verdict) -> Result<(), Box<dyn Error>> {
    match verdict {
        Verdict::Advancing(handle) => {
            let advance = handle.await?;
            println!("   completed, {advance:?}");
        }
        other => println!("   {other:?}"),
    }
    Ok(())
}
