//! Concurrency tests for the support team state machine.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use raidmind_squad::{SquadError, SupportTeam, SupportTeamConfig, TeamStateCell};
use raidmind_types::{Position, RaidType, SupportTeamState};

#[test]
fn one_hundred_racers_one_winner() {
    let cell = Arc::new(TeamStateCell::new());
    let successes = AtomicUsize::new(0);
    let failures = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..100 {
            let cell = Arc::clone(&cell);
            let (successes, failures) = (&successes, &failures);
            scope.spawn(move || {
                if cell.try_transition(SupportTeamState::Idle, SupportTeamState::Spawning) {
                    successes.fetch_add(1, Ordering::Relaxed);
                } else {
                    failures.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    assert_eq!(successes.load(Ordering::Relaxed), 1);
    assert_eq!(failures.load(Ordering::Relaxed), 99);
    assert_eq!(cell.load(), SupportTeamState::Spawning);
}

#[test]
fn concurrent_summons_spawn_one_team() {
    let team = Arc::new(SupportTeam::new(SupportTeamConfig::default(), RaidType::Pmc).unwrap());

    let results: Vec<Result<_, SquadError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let team = Arc::clone(&team);
                scope.spawn(move || team.summon(Position::default(), 0.0))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let granted = results.iter().filter(|r| r.is_ok()).count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, Err(SquadError::TeamActive { .. })))
        .count();
    assert_eq!(granted, 1);
    assert_eq!(refused, 31);
    assert_eq!(team.state(), SupportTeamState::Spawning);
}
