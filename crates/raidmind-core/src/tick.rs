//! One frame of the raid.
//!
//! [`run_frame`] evaluates every brain against the frame's snapshots and
//! then advances the support team:
//!
//! 1. **Agents** -- each brain ticks against its agent's snapshot. With
//!    `host.worker_threads > 1` the brains are split into contiguous chunks
//!    and evaluated on scoped threads; shared raid state is reached only
//!    through the session's thread-safe containers.
//! 2. **Team** -- the support team consumes the frame's team snapshot and
//!    the capacity gate learns whether a team spawn is in flight.
//!
//! Results come back in brain order regardless of the worker count. Each
//! worker draws from its own RNG seeded from the raid seed, the frame, and
//! the worker index, so a fixed seed and worker count replay identically.

use std::collections::HashMap;
use std::thread;

use rand::SeedableRng;
use rand::rngs::StdRng;
use raidmind_squad::{CapacityBudget, TeamSnapshot, TeamUpdate};
use raidmind_types::{ActionResult, AgentId, AgentSnapshot};
use tracing::{debug, error};

use crate::brain::{BotBrain, Collaborators};
use crate::session::RaidSession;

/// What the host observed at the start of a frame.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// The frame number.
    pub frame: u64,
    /// Game seconds since the raid started.
    pub now: f64,
    /// One snapshot per agent the host wants evaluated.
    pub agents: Vec<AgentSnapshot>,
    /// Player and support team status.
    pub team: TeamSnapshot,
}

/// Summary of a single frame's execution.
#[derive(Debug, Clone)]
pub struct FrameSummary {
    /// The frame that was executed.
    pub frame: u64,
    /// Game time of the frame.
    pub now: f64,
    /// One result per brain that had a snapshot, in brain order.
    pub results: Vec<ActionResult>,
    /// What the host should do with the support team.
    pub team: TeamUpdate,
    /// The ordinary-agent budget after the team update.
    pub budget: CapacityBudget,
}

/// Run one frame.
pub fn run_frame(
    session: &RaidSession,
    brains: &mut [BotBrain],
    input: &FrameInput,
    collaborators: Collaborators<'_>,
    seed: u64,
) -> FrameSummary {
    let snapshots: HashMap<AgentId, &AgentSnapshot> =
        input.agents.iter().map(|snapshot| (snapshot.id, snapshot)).collect();

    let workers = session.config().host.worker_threads.max(1);
    let results: Vec<ActionResult> = if workers == 1 || brains.len() < 2 {
        let mut rng = frame_rng(seed, input.frame, 0);
        tick_chunk(session, brains, &snapshots, input.now, collaborators, &mut rng)
    } else {
        let chunk_len = brains.len().div_ceil(workers);
        thread::scope(|scope| {
            let snapshots = &snapshots;
            let handles: Vec<_> = brains
                .chunks_mut(chunk_len)
                .enumerate()
                .map(|(worker, chunk)| {
                    scope.spawn(move || {
                        let mut rng = frame_rng(seed, input.frame, worker);
                        tick_chunk(session, chunk, snapshots, input.now, collaborators, &mut rng)
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        error!(frame = input.frame, "Frame worker panicked, its agents idle this frame");
                        Vec::new()
                    })
                })
                .collect()
        })
    };

    let team = session.team().update(input.now, &input.team);
    session.gate().set_team_spawning(session.team().is_spawning());
    let budget = session.gate().budget();

    debug!(
        frame = input.frame,
        agents = results.len(),
        team_state = ?team.state,
        effective_max = budget.effective_max,
        "Frame complete"
    );

    FrameSummary {
        frame: input.frame,
        now: input.now,
        results,
        team,
        budget,
    }
}

fn tick_chunk(
    session: &RaidSession,
    brains: &mut [BotBrain],
    snapshots: &HashMap<AgentId, &AgentSnapshot>,
    now: f64,
    collaborators: Collaborators<'_>,
    rng: &mut StdRng,
) -> Vec<ActionResult> {
    brains
        .iter_mut()
        .filter_map(|brain| {
            let snapshot = snapshots.get(&brain.agent_id())?;
            Some(brain.tick(session, collaborators, snapshot, now, &mut *rng))
        })
        .collect()
}

fn frame_rng(seed: u64, frame: u64, worker: usize) -> StdRng {
    let worker = u64::try_from(worker).unwrap_or(u64::MAX);
    let mixed = seed
        ^ frame.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ worker.wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    StdRng::seed_from_u64(mixed)
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn frame_rng_is_reproducible() {
        let a: u64 = frame_rng(42, 7, 1).random();
        let b: u64 = frame_rng(42, 7, 1).random();
        assert_eq!(a, b);
    }

    #[test]
    fn frame_rng_differs_per_worker_and_frame() {
        let base: u64 = frame_rng(42, 7, 0).random();
        let other_worker: u64 = frame_rng(42, 7, 1).random();
        let other_frame: u64 = frame_rng(42, 8, 0).random();
        assert_ne!(base, other_worker);
        assert_ne!(base, other_frame);
    }
}
