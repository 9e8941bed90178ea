//! Integration tests for raid-wide loot memory shared between agents.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use raidmind_brain::world::NoQuests;
use raidmind_brain::{
    BehaviorLayer, CombatAwareness, LayerContext, LootingConfig, LootingLayer, MovementTiers, Navigation, QueryError,
    RaidMemory, ScanFilter, WorldQuery,
};
use raidmind_types::{
    AgentClass, AgentId, AgentSnapshot, LootCategory, LootItem, PathStatus, Position, Target, TargetId,
};

/// A fixed set of crates in an open field.
struct Field {
    targets: Vec<Target>,
}

impl WorldQuery for Field {
    fn scan_nearby(&self, origin: &Position, radius: f64, filter: &ScanFilter) -> Result<Vec<Target>, QueryError> {
        Ok(self
            .targets
            .iter()
            .filter(|t| filter.accepts(t))
            .map(|t| Target {
                distance: origin.distance_to(&t.position),
                ..t.clone()
            })
            .filter(|t| t.distance <= radius)
            .collect())
    }
}

struct OpenField;

impl Navigation for OpenField {
    fn is_reachable(&self, _point: &Position) -> bool {
        true
    }

    fn path_to(&self, _from: &Position, _to: &Position) -> Result<PathStatus, QueryError> {
        Ok(PathStatus::Complete)
    }

    fn move_towards(&self, _agent: AgentId, _point: &Position, _speed_factor: f64) -> Result<(), QueryError> {
        Ok(())
    }
}

fn crate_at(handle: u64, value: f64, x: f64) -> Target {
    Target {
        id: TargetId::from_handle("container", handle),
        category: LootCategory::Container,
        value,
        position: Position::new(x, 0.0, 0.0),
        distance: 0.0,
        items: vec![LootItem {
            name: format!("item-{handle}"),
            price: value,
            width: 1,
            height: 2,
        }],
    }
}

fn agent() -> AgentSnapshot {
    let mut snapshot = AgentSnapshot::new(AgentId::new(), AgentClass::Scav, Position::default());
    snapshot.free_slots = 6;
    snapshot
}

fn claim(layer: &mut LootingLayer, field: &Field, agent: &AgentSnapshot, seed: u64) -> Option<TargetId> {
    let mut rng = StdRng::seed_from_u64(seed);
    let combat = CombatAwareness::Unavailable;
    let mut ctx = LayerContext {
        agent,
        now: 0.0,
        world: field,
        navigation: &OpenField,
        quests: &NoQuests,
        combat: &combat,
        calm_period_secs: 15.0,
        rng: &mut rng,
    };
    layer
        .is_active(&mut ctx)
        .then(|| layer.active_target().map(|t| t.id.clone()))
        .flatten()
}

#[test]
fn two_agents_never_share_a_target() {
    let memory = Arc::new(RaidMemory::default());
    let field = Field {
        targets: vec![crate_at(1, 20_000.0, 10.0), crate_at(2, 8_000.0, 10.0)],
    };
    let mut first = LootingLayer::new(LootingConfig::default(), MovementTiers::default(), Arc::clone(&memory)).unwrap();
    let mut second = LootingLayer::new(LootingConfig::default(), MovementTiers::default(), Arc::clone(&memory)).unwrap();

    let a = claim(&mut first, &field, &agent(), 1).unwrap();
    let b = claim(&mut second, &field, &agent(), 2).unwrap();
    assert_eq!(a, TargetId::from_handle("container", 1));
    assert_eq!(b, TargetId::from_handle("container", 2));
    assert_eq!(memory.loot_claimed.len(), 2);
}

#[test]
fn concurrent_agents_claim_each_target_once() {
    let memory = Arc::new(RaidMemory::default());
    let field = Field {
        targets: (0..8).map(|h| crate_at(h, 10_000.0, 5.0)).collect(),
    };

    let claims: Vec<Option<TargetId>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16_u64)
            .map(|seed| {
                let memory = Arc::clone(&memory);
                let field = &field;
                scope.spawn(move || {
                    let mut layer = LootingLayer::new(LootingConfig::default(), MovementTiers::default(), memory).unwrap();
                    claim(&mut layer, field, &agent(), seed)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut won: Vec<TargetId> = claims.into_iter().flatten().collect();
    assert_eq!(won.len(), 8);
    won.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    won.dedup();
    assert_eq!(won.len(), 8);
}

#[test]
fn raid_end_clear_frees_every_target() {
    let memory = Arc::new(RaidMemory::default());
    let field = Field {
        targets: vec![crate_at(1, 20_000.0, 10.0)],
    };
    let mut first = LootingLayer::new(LootingConfig::default(), MovementTiers::default(), Arc::clone(&memory)).unwrap();
    assert!(claim(&mut first, &field, &agent(), 1).is_some());

    let mut second = LootingLayer::new(LootingConfig::default(), MovementTiers::default(), Arc::clone(&memory)).unwrap();
    assert!(claim(&mut second, &field, &agent(), 2).is_none());

    memory.clear();
    let mut third = LootingLayer::new(LootingConfig::default(), MovementTiers::default(), Arc::clone(&memory)).unwrap();
    assert!(claim(&mut third, &field, &agent(), 3).is_some());
}
