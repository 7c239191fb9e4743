//! Runs the demo battle file shipped at the workspace root.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::path::PathBuf;

use battleground_arena::{Arena, BattleConfig};
use battleground_types::{Battlefield, Listener, ListenerError, Priority, Signal};

#[derive(Default)]
struct Counter {
    signals: usize,
    rounds: usize,
}

impl Listener for Counter {
    fn slots(&self) -> &[Priority] {
        &[1]
    }

    fn react(
        &mut self,
        _slot: usize,
        signal: &Signal,
        _field: &dyn Battlefield,
    ) -> Result<(), ListenerError> {
        self.signals += 1;
        if signal.name() == "RoundStart" {
            self.rounds += 1;
        }
        Ok(())
    }
}

fn demo() -> BattleConfig {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../battle.yaml");
    BattleConfig::from_file(&path).unwrap()
}

#[test]
fn demo_battle_runs_to_completion() {
    let config = demo();
    let mut arena = Arena::new(&config).unwrap();
    let mut counter = Counter::default();
    let outcome = arena.run(&mut [&mut counter]).unwrap();

    assert!(outcome.rounds >= 1);
    assert!(outcome.rounds <= config.max_rounds);
    assert_eq!(counter.rounds, usize::try_from(outcome.rounds).unwrap());
    assert_eq!(outcome.survivor, arena.field().survivor());
}

#[test]
fn demo_battle_is_reproducible() {
    let config = demo();
    let run = || {
        let mut arena = Arena::new(&config).unwrap();
        let mut counter = Counter::default();
        let outcome = arena.run(&mut [&mut counter]).unwrap();
        let health: Vec<_> = arena
            .field()
            .warriors()
            .into_iter()
            .map(|w| arena.field().health(w))
            .collect();
        (outcome, counter.signals, health)
    };
    assert_eq!(run(), run());
}
