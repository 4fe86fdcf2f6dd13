//! Night rosters loaded from TOML
//!
//! ```toml
//! [[nights]]
//! objectives = ["noble", "guard"]
//!
//! [[nights.npcs]]
//! archetype = "guard"
//! position = [0.0, 0.0, 0.0]
//! waypoints = [[10.0, 0.0, 0.0], [10.0, 0.0, 10.0]]
//!
//! [[nights.npcs]]
//! archetype = "noble"
//! goal = "mayor"
//! position = [5.0, 0.0, 5.0]
//! home = [8.0, 0.0, 5.0]
//! ```

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::error::{NocturneError, Result};
use crate::core::types::NpcId;
use crate::npc::archetype::{Archetype, Goal};
use crate::npc::{ArchetypeMemory, Npc};
use crate::spatial::occlusion::Obstacle;

fn default_forward() -> Vec3 {
    Vec3::Z
}

fn default_true() -> bool {
    true
}

/// One NPC placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcSpawn {
    pub archetype: Archetype,
    pub position: Vec3,
    #[serde(default = "default_forward")]
    pub forward: Vec3,
    /// Objective entry; defaults to the archetype's own
    #[serde(default)]
    pub goal: Option<Goal>,
    /// Patrol loop (guards)
    #[serde(default)]
    pub waypoints: Vec<Vec3>,
    /// Where to hide (victims); defaults to the spawn position
    #[serde(default)]
    pub home: Option<Vec3>,
    /// Tutorial drunkards run home but stay outside
    #[serde(default = "default_true")]
    pub can_hide: bool,
}

impl NpcSpawn {
    pub fn new(archetype: Archetype, position: Vec3) -> Self {
        Self {
            archetype,
            position,
            forward: default_forward(),
            goal: None,
            waypoints: Vec::new(),
            home: None,
            can_hide: true,
        }
    }

    /// Build the (uninitialized) NPC for this placement
    pub fn build(&self, id: NpcId) -> Npc {
        let forward = self.forward.try_normalize().unwrap_or(Vec3::Z);
        let mut npc = Npc::new(id, self.archetype, self.position, forward);
        npc.goal = self.goal.unwrap_or_else(|| self.archetype.default_goal());

        match &mut npc.memory {
            ArchetypeMemory::Guard(memory) => memory.waypoints = self.waypoints.clone(),
            ArchetypeMemory::Victim(memory) => {
                memory.home = self.home.unwrap_or(self.position);
                memory.can_hide = self.can_hide;
            }
            ArchetypeMemory::Slayer(_) => {}
        }
        npc
    }
}

/// Everything placed for one night
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NightPlan {
    #[serde(default)]
    pub objectives: Vec<Goal>,
    #[serde(default)]
    pub npcs: Vec<NpcSpawn>,
    /// Solid boxes for the headless scene
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub nights: Vec<NightPlan>,
}

impl Roster {
    pub fn new(nights: Vec<NightPlan>) -> Self {
        Self { nights }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn night(&self, index: usize) -> Result<&NightPlan> {
        self.nights.get(index).ok_or(NocturneError::NightOutOfRange {
            index,
            nights: self.nights.len(),
        })
    }

    /// Objective lists of every night, in order
    pub fn objective_lists(&self) -> Vec<Vec<Goal>> {
        self.nights.iter().map(|n| n.objectives.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOWN: &str = r#"
        [[nights]]
        objectives = ["noble", "mayor"]

        [[nights.npcs]]
        archetype = "guard"
        position = [0.0, 0.0, 0.0]
        waypoints = [[10.0, 0.0, 0.0], [10.0, 0.0, 10.0]]

        [[nights.npcs]]
        archetype = "noble"
        goal = "mayor"
        position = [5.0, 0.0, 5.0]
        home = [8.0, 0.0, 5.0]

        [[nights.npcs]]
        archetype = "drunkard"
        position = [1.0, 0.0, 1.0]
        can_hide = false

        [[nights.obstacles]]
        min = [-1.0, 0.0, 3.0]
        max = [1.0, 3.0, 4.0]

        [[nights]]
        objectives = ["slayer"]
    "#;

    #[test]
    fn test_parse_town() {
        let roster = Roster::from_toml_str(TOWN).unwrap();
        assert_eq!(roster.nights.len(), 2);

        let night = roster.night(0).unwrap();
        assert_eq!(night.objectives, vec![Goal::Noble, Goal::Mayor]);
        assert_eq!(night.npcs.len(), 3);
        assert_eq!(night.npcs[0].waypoints.len(), 2);
        assert_eq!(night.npcs[0].forward, Vec3::Z);
        assert_eq!(night.obstacles.len(), 1);
        assert!(roster.night(1).unwrap().npcs.is_empty());
    }

    #[test]
    fn test_build_applies_placement() {
        let roster = Roster::from_toml_str(TOWN).unwrap();
        let night = roster.night(0).unwrap();

        let mayor = night.npcs[1].build(NpcId(2));
        assert_eq!(mayor.goal, Goal::Mayor);
        assert_eq!(mayor.home(), Some(Vec3::new(8.0, 0.0, 5.0)));
        assert!(!mayor.is_initialized());

        let drunkard = night.npcs[2].build(NpcId(3));
        assert_eq!(drunkard.goal, Goal::Drunkard);
        assert_eq!(drunkard.home(), Some(Vec3::new(1.0, 0.0, 1.0)));
        match drunkard.memory {
            ArchetypeMemory::Victim(memory) => assert!(!memory.can_hide),
            _ => panic!("drunkard should have victim memory"),
        }
    }

    #[test]
    fn test_night_out_of_range() {
        let roster = Roster::default();
        assert!(matches!(
            roster.night(0),
            Err(NocturneError::NightOutOfRange { index: 0, nights: 0 })
        ));
    }
}
