#![allow(dead_code)]

// tests/common/mod.rs
use std::time::Duration;

use arena::domain::GameState;
use arena::{CreateGame, RegistrySettings, Session, SessionRegistry, SharedGateway, SharedSink};
use tempfile::TempDir;

// Logging is auto-installed for every test binary that declares `mod common;`
#[ctor::ctor]
fn init_logging() {
    arena_test_support::logging::init();
}

/// A registry writing session directories under a throwaway log root.
pub struct Harness {
    pub registry: SessionRegistry,
    pub log_root: TempDir,
}

pub fn harness(gateway: SharedGateway, sink: SharedSink) -> Harness {
    let log_root = tempfile::tempdir().expect("create temp log root");
    harness_in(log_root, gateway, sink)
}

pub fn harness_in(log_root: TempDir, gateway: SharedGateway, sink: SharedSink) -> Harness {
    let registry = SessionRegistry::new(
        RegistrySettings {
            default_threads: 3,
            werewolf_count: 1,
            log_root: log_root.path().to_path_buf(),
            seed: Some(20240611),
        },
        gateway,
        sink,
    )
    .expect("build registry");
    Harness { registry, log_root }
}

pub fn six_players(model: &str) -> CreateGame {
    CreateGame {
        villager_model: model.to_string(),
        werewolf_model: model.to_string(),
        player_count: 6,
        max_debate_turns: 1,
    }
}

pub async fn wait_idle(session: &Session) {
    tokio::time::timeout(Duration::from_secs(20), session.wait_idle())
        .await
        .expect("session should go idle");
}

/// Wait until at least `rounds` rounds have been published.
pub async fn wait_for_rounds(session: &Session, rounds: usize) {
    let mut rx = session.subscribe();
    tokio::time::timeout(
        Duration::from_secs(20),
        rx.wait_for(|state| state.rounds.len() >= rounds),
    )
    .await
    .expect("rounds should be published in time")
    .expect("snapshot channel open");
}

/// Round numbers are 1..=n with no gaps and the terminal markers never coexist.
pub fn assert_well_formed(state: &GameState) {
    let numbers: Vec<u32> = state.rounds.iter().map(|r| r.number).collect();
    let expected: Vec<u32> = (1..=state.rounds.len() as u32).collect();
    assert_eq!(numbers, expected, "rounds must be contiguous from 1");
    assert!(
        state.winner.is_none() || state.error_message.is_none(),
        "winner and error are mutually exclusive"
    );
    for round in &state.rounds {
        for name in round.referenced_names() {
            assert!(state.player(name).is_some(), "{name} is not a dealt player");
        }
    }
}
