//! Alertness bands per archetype
//!
//! The behavior state is never stored independently of alertness; it is
//! looked up from these tables every tick.

use serde::{Deserialize, Serialize};

use crate::npc::archetype::Archetype;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuardBehavior {
    Patrol,
    Investigate,
    Attack,
    Alert,
}

/// Shared by nobles and drunkards; only the thresholds differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VictimBehavior {
    Wander,
    Wary,
    Flee,
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlayerBehavior {
    Wander,
    Investigate,
    Search,
}

/// Behavior state of any NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "state")]
pub enum BehaviorState {
    Guard(GuardBehavior),
    Victim(VictimBehavior),
    Slayer(SlayerBehavior),
}

impl BehaviorState {
    /// Highest band: spreads the alarm every tick
    pub fn is_alert_band(&self) -> bool {
        matches!(
            self,
            BehaviorState::Guard(GuardBehavior::Alert) | BehaviorState::Victim(VictimBehavior::Alert)
        )
    }

    /// States in which the attack cooldown runs
    pub fn can_attack(&self) -> bool {
        matches!(
            self,
            BehaviorState::Guard(GuardBehavior::Attack)
                | BehaviorState::Guard(GuardBehavior::Alert)
                | BehaviorState::Slayer(SlayerBehavior::Search)
        )
    }

    /// States that move at fast speed (locomotion blend doubles)
    pub fn is_hurried(&self) -> bool {
        self.can_attack() || matches!(self, BehaviorState::Victim(VictimBehavior::Alert))
    }
}

/// Look up the behavior state for an alertness level
pub fn state_for(archetype: Archetype, alertness: u8) -> BehaviorState {
    match archetype {
        Archetype::Guard => BehaviorState::Guard(match alertness {
            0..=3 => GuardBehavior::Patrol,
            4..=5 => GuardBehavior::Investigate,
            6..=7 => GuardBehavior::Attack,
            _ => GuardBehavior::Alert,
        }),
        Archetype::Noble => BehaviorState::Victim(match alertness {
            0..=1 => VictimBehavior::Wander,
            2..=4 => VictimBehavior::Wary,
            5..=7 => VictimBehavior::Flee,
            _ => VictimBehavior::Alert,
        }),
        Archetype::Drunkard => BehaviorState::Victim(match alertness {
            0..=3 => VictimBehavior::Wander,
            4..=5 => VictimBehavior::Wary,
            6 => VictimBehavior::Flee,
            _ => VictimBehavior::Alert,
        }),
        Archetype::Slayer => BehaviorState::Slayer(match alertness {
            0..=2 => SlayerBehavior::Wander,
            3..=5 => SlayerBehavior::Investigate,
            _ => SlayerBehavior::Search,
        }),
    }
}
