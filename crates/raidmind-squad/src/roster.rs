//! Slot-indexed support team roster.
//!
//! Slots are fixed when the team is summoned: slot 0 is the medic, every
//! other slot a guard. The host fills a slot when it spawns the member.
//! While any member lives there is exactly one living medic; when the medic
//! dies the first living guard is promoted.

use raidmind_types::{AgentId, TeamRole};

use crate::error::SquadError;

/// One member slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterSlot {
    /// The member's current role.
    pub role: TeamRole,
    /// The spawned agent, once the host confirms it.
    pub agent: Option<AgentId>,
    /// Whether the member is alive.
    pub alive: bool,
}

impl RosterSlot {
    const fn is_living(&self) -> bool {
        self.agent.is_some() && self.alive
    }
}

/// The team's members, indexed by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    slots: Vec<RosterSlot>,
}

impl Roster {
    /// An unspawned roster of `size` slots.
    pub fn with_size(size: usize) -> Self {
        let slots = (0..size)
            .map(|index| RosterSlot {
                role: if index == 0 { TeamRole::Medic } else { TeamRole::Guard },
                agent: None,
                alive: false,
            })
            .collect();
        Self { slots }
    }

    /// All slots in order.
    pub fn slots(&self) -> &[RosterSlot] {
        &self.slots
    }

    /// Record that `agent` spawned into `slot`.
    pub fn assign(&mut self, slot: usize, agent: AgentId) -> Result<(), SquadError> {
        let entry = self.slots.get_mut(slot).ok_or(SquadError::UnknownSlot { slot })?;
        entry.agent = Some(agent);
        entry.alive = true;
        Ok(())
    }

    /// Whether every slot has a spawned member.
    pub fn is_fully_spawned(&self) -> bool {
        !self.slots.is_empty() && self.slots.iter().all(|s| s.agent.is_some())
    }

    /// Whether members spawned and all of them are dead.
    pub fn is_wiped(&self) -> bool {
        self.slots.iter().any(|s| s.agent.is_some()) && !self.slots.iter().any(RosterSlot::is_living)
    }

    /// Whether `agent` is a living member.
    pub fn contains_living(&self, agent: AgentId) -> bool {
        self.slots.iter().any(|s| s.is_living() && s.agent == Some(agent))
    }

    /// Agents of every living member.
    pub fn living_ids(&self) -> Vec<AgentId> {
        self.slots.iter().filter(|s| s.is_living()).filter_map(|s| s.agent).collect()
    }

    /// The living medic, if any.
    pub fn medic(&self) -> Option<AgentId> {
        self.slots
            .iter()
            .find(|s| s.is_living() && s.role == TeamRole::Medic)
            .and_then(|s| s.agent)
    }

    /// Mark `agent` dead. Returns its role if it was a living member.
    pub fn mark_dead(&mut self, agent: AgentId) -> Option<TeamRole> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.is_living() && s.agent == Some(agent))?;
        slot.alive = false;
        Some(slot.role)
    }

    /// Hand the medic role to the first living guard.
    ///
    /// Returns the promoted agent, or `None` when no guard survives. Dead
    /// medics are demoted so the roster holds one medic at most.
    pub fn promote_medic(&mut self) -> Option<AgentId> {
        for slot in &mut self.slots {
            if slot.role == TeamRole::Medic && !slot.is_living() {
                slot.role = TeamRole::Guard;
            }
        }
        if let Some(medic) = self.medic() {
            return Some(medic);
        }
        let guard = self
            .slots
            .iter_mut()
            .find(|s| s.is_living() && s.role == TeamRole::Guard)?;
        guard.role = TeamRole::Medic;
        guard.agent
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the roster has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn spawned(size: usize) -> (Roster, Vec<AgentId>) {
        let mut roster = Roster::with_size(size);
        let ids: Vec<AgentId> = (0..size).map(|_| AgentId::new()).collect();
        for (slot, id) in ids.iter().enumerate() {
            roster.assign(slot, *id).unwrap();
        }
        (roster, ids)
    }

    #[test]
    fn slot_zero_is_the_medic() {
        let roster = Roster::with_size(4);
        assert_eq!(roster.len(), 4);
        assert_eq!(roster.slots().first().unwrap().role, TeamRole::Medic);
        assert!(roster.slots().iter().skip(1).all(|s| s.role == TeamRole::Guard));
        assert!(!roster.is_fully_spawned());
    }

    #[test]
    fn assign_out_of_range_fails() {
        let mut roster = Roster::with_size(2);
        assert!(matches!(
            roster.assign(5, AgentId::new()),
            Err(SquadError::UnknownSlot { slot: 5 })
        ));
    }

    #[test]
    fn medic_death_promotes_first_living_guard() {
        let (mut roster, ids) = spawned(4);
        let medic = *ids.first().unwrap();
        let second = *ids.get(1).unwrap();
        let third = *ids.get(2).unwrap();

        roster.mark_dead(second);
        assert_eq!(roster.mark_dead(medic), Some(TeamRole::Medic));
        assert_eq!(roster.promote_medic(), Some(third));
        assert_eq!(roster.medic(), Some(third));
        let medics = roster.slots().iter().filter(|s| s.role == TeamRole::Medic).count();
        assert_eq!(medics, 1);
    }

    #[test]
    fn dead_members_are_reported_once() {
        let (mut roster, ids) = spawned(2);
        let guard = *ids.get(1).unwrap();
        assert_eq!(roster.mark_dead(guard), Some(TeamRole::Guard));
        assert_eq!(roster.mark_dead(guard), None);
        assert_eq!(roster.mark_dead(AgentId::new()), None);
    }

    #[test]
    fn wipe_detection() {
        let (mut roster, ids) = spawned(2);
        assert!(!roster.is_wiped());
        for id in &ids {
            roster.mark_dead(*id);
        }
        assert!(roster.is_wiped());
        assert!(roster.promote_medic().is_none());
        assert!(roster.living_ids().is_empty());
        assert!(!Roster::with_size(3).is_wiped());
    }
}
