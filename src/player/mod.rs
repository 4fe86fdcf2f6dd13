//! The player as the NPC core perceives it
//!
//! The core never mutates the player. Anything an NPC does to the player is
//! returned as a [`PlayerEffect`] for the owner of the player state to apply.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Read-only snapshot of the player for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Vec3,
    pub forward: Vec3,
    /// Cloak ability active: the player body is invisible to NPCs
    pub cloaked: bool,
    /// Position of the shadow decoy, if one is out
    pub decoy: Option<Vec3>,
    pub sprinting: bool,
    /// Standing in a lit area
    pub in_light: bool,
}

impl PlayerView {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            forward: Vec3::Z,
            cloaked: false,
            decoy: None,
            sprinting: false,
            in_light: false,
        }
    }

    pub fn shadow_active(&self) -> bool {
        self.decoy.is_some()
    }
}

/// Something an NPC did to the player this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerEffect {
    /// Force the cloak off
    RevealCloak,
    /// Destroy the shadow decoy
    DestroyDecoy,
    /// Deal damage to the player
    Damage(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_active_follows_decoy() {
        let mut player = PlayerView::at(Vec3::ZERO);
        assert!(!player.shadow_active());
        player.decoy = Some(Vec3::X);
        assert!(player.shadow_active());
    }
}
