//! Navigation proxy - the path-following service NPCs drive
//!
//! The core only issues destinations and speeds and reads back progress.
//! Pathfinding itself belongs to the host engine.

pub mod straight_line;

pub use straight_line::StraightLineNavigator;

use glam::Vec3;

use crate::core::types::{same_point, NpcId};

/// Path-following agent service consumed by the behavior core
pub trait NavigationService {
    /// Create (or reset) the agent for an NPC standing at `position`
    fn register(&mut self, npc: NpcId, position: Vec3);

    /// Drop the agent for an NPC
    fn remove(&mut self, npc: NpcId);

    /// Whether an agent exists for this NPC and can take orders
    fn is_ready(&self, npc: NpcId) -> bool;

    /// Current agent position
    fn position(&self, npc: NpcId) -> Option<Vec3>;

    /// Destination currently being followed
    fn destination(&self, npc: NpcId) -> Option<Vec3>;

    /// Start following a path to `destination`
    fn set_destination(&mut self, npc: NpcId, destination: Vec3);

    /// Path length left to the destination (infinite while unknown)
    fn remaining_distance(&self, npc: NpcId) -> f32;

    /// Whether the current path reaches its destination
    fn path_complete(&self, npc: NpcId) -> bool;

    fn velocity(&self, npc: NpcId) -> Vec3;

    fn set_speed(&mut self, npc: NpcId, speed: f32);

    /// Enable or disable the agent (disabled agents neither move nor plan)
    fn set_enabled(&mut self, npc: NpcId, enabled: bool);

    /// Move agents along their paths. Hosts that step agents themselves
    /// keep the default no-op.
    fn advance(&mut self, _dt: f32) {}
}

/// Set a destination unless the agent already heads there
///
/// Re-requesting the same point would make the host replan every tick.
/// Returns whether a new path was requested.
pub fn request_destination<N: NavigationService + ?Sized>(
    nav: &mut N,
    npc: NpcId,
    destination: Vec3,
) -> bool {
    if let Some(current) = nav.destination(npc) {
        if same_point(current, destination) {
            return false;
        }
    }
    nav.set_destination(npc, destination);
    true
}

/// Stop where the agent stands
pub fn halt<N: NavigationService + ?Sized>(nav: &mut N, npc: NpcId) {
    if let Some(position) = nav.position(npc) {
        request_destination(nav, npc, position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_destination_is_not_replanned() {
        let mut nav = StraightLineNavigator::new();
        let id = NpcId(1);
        nav.register(id, Vec3::ZERO);

        assert!(request_destination(&mut nav, id, Vec3::new(4.0, 0.0, 4.0)));
        assert!(!request_destination(&mut nav, id, Vec3::new(4.0, 0.0, 4.000_001)));
        assert_eq!(nav.replan_count(id), 1);

        assert!(request_destination(&mut nav, id, Vec3::new(5.0, 0.0, 4.0)));
        assert_eq!(nav.replan_count(id), 2);
    }

    #[test]
    fn test_halt_targets_current_position() {
        let mut nav = StraightLineNavigator::new();
        let id = NpcId(1);
        nav.register(id, Vec3::X);
        nav.set_speed(id, 1.0);
        nav.set_destination(id, Vec3::new(10.0, 0.0, 0.0));

        halt(&mut nav, id);
        assert_eq!(nav.destination(id), Some(Vec3::X));
        assert_eq!(nav.remaining_distance(id), 0.0);
    }
}
