//! NPC archetype and objective goal definitions

use serde::{Deserialize, Serialize};

/// Behavioural family of an NPC, selecting its state table and policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Patrols a waypoint loop, attacks the player
    Guard,
    /// Wealthy townsfolk, wanders near home and flees early
    Noble,
    /// Slow to notice, flees late
    Drunkard,
    /// Hunts the player around the town; cannot be grappled
    Slayer,
}

impl Archetype {
    /// All archetypes
    pub fn all() -> &'static [Archetype] {
        &[
            Archetype::Guard,
            Archetype::Noble,
            Archetype::Drunkard,
            Archetype::Slayer,
        ]
    }

    /// Victims flee to a home instead of fighting
    pub fn is_victim(&self) -> bool {
        matches!(self, Archetype::Noble | Archetype::Drunkard)
    }

    /// Whether the highest alert band raises nearby NPCs
    pub fn raises_alarm(&self) -> bool {
        !matches!(self, Archetype::Slayer)
    }

    pub fn can_be_grappled(&self) -> bool {
        !matches!(self, Archetype::Slayer)
    }

    /// The slayer shrugs off hypnosis
    pub fn can_be_hypnotised(&self) -> bool {
        !matches!(self, Archetype::Slayer)
    }

    /// Objective goal this archetype satisfies when consumed
    pub fn default_goal(&self) -> Goal {
        match self {
            Archetype::Guard => Goal::Guard,
            Archetype::Noble => Goal::Noble,
            Archetype::Drunkard => Goal::Drunkard,
            Archetype::Slayer => Goal::Slayer,
        }
    }
}

/// Entry on a night's objective list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Noble,
    Drunkard,
    Guard,
    Slayer,
    /// A specific noble; only satisfied by the mayor, not by other nobles
    Mayor,
}

impl Goal {
    /// Upgrade-progress points earned by consuming this goal
    pub fn consumption_points(&self) -> u32 {
        match self {
            Goal::Guard => 2,
            _ => 1,
        }
    }
}
