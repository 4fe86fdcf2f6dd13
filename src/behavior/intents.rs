//! Presentation intents
//!
//! The core never plays animations or sounds. It records what happened and
//! the presentation layer decides how to show it.

use serde::{Deserialize, Serialize};

use crate::core::types::NpcId;
use crate::player::PlayerEffect;

/// Cue for the animation / audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// "!" bark when the player is first noticed
    AlertCue,
    AttackCue,
    Moving(bool),
    /// Local-frame velocity for the locomotion blend tree
    Locomotion { x: f32, y: f32 },
    Confused(bool),
    Grappled(bool),
    Damaged,
    Died,
    /// Disappear into home
    Hide,
    /// Come back out
    Reveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NpcIntent {
    pub npc: NpcId,
    pub intent: Intent,
}

/// Everything produced while running NPCs, drained once per tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outbox {
    pub intents: Vec<NpcIntent>,
    pub effects: Vec<PlayerEffect>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, npc: NpcId, intent: Intent) {
        self.intents.push(NpcIntent { npc, intent });
    }

    /// Record a player effect; a cloak can only be revealed once per tick
    pub fn effect(&mut self, effect: PlayerEffect) {
        if effect == PlayerEffect::RevealCloak && self.effects.contains(&effect) {
            return;
        }
        self.effects.push(effect);
    }

    /// Intents for one NPC, in emission order
    pub fn intents_for(&self, npc: NpcId) -> impl Iterator<Item = Intent> + '_ {
        self.intents
            .iter()
            .filter(move |i| i.npc == npc)
            .map(|i| i.intent)
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty() && self.effects.is_empty()
    }

    pub fn take(&mut self) -> Outbox {
        std::mem::take(self)
    }
}
