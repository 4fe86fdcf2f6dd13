//! NPC state
//!
//! One [`Npc`] per roster entry. The common perception and suspicion state
//! lives on the struct; archetype-specific memory (patrol route, home, ring
//! segment) lives in [`ArchetypeMemory`].

pub mod archetype;
pub mod disturbance;

pub use archetype::{Archetype, Goal};
pub use disturbance::DisturbanceMemory;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::behavior::state::{state_for, BehaviorState};
use crate::core::config::{ArchetypeProfile, SimulationConfig};
use crate::core::types::NpcId;
use crate::perception::alertness::{AlertnessParams, AlertnessTracker};
use crate::perception::visibility::{Observer, TargetKind, ViewFrustum};

/// Patrol route and attack timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardMemory {
    pub waypoints: Vec<Vec3>,
    /// Index of the waypoint to head for next
    pub next_waypoint: usize,
    pub attack_cooldown: f32,
}

/// Home and hiding state of nobles and drunkards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VictimMemory {
    pub home: Vec3,
    pub hide_timer: f32,
    /// Tutorial drunkards run home but never go inside
    pub can_hide: bool,
}

/// Ring progress and attack timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlayerMemory {
    pub segment: u32,
    pub attack_cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArchetypeMemory {
    Guard(GuardMemory),
    Victim(VictimMemory),
    Slayer(SlayerMemory),
}

impl ArchetypeMemory {
    /// Empty memory for an archetype; victims default to `position` as home
    pub fn for_archetype(archetype: Archetype, position: Vec3) -> Self {
        match archetype {
            Archetype::Guard => ArchetypeMemory::Guard(GuardMemory {
                waypoints: Vec::new(),
                next_waypoint: 0,
                attack_cooldown: 0.0,
            }),
            Archetype::Noble | Archetype::Drunkard => ArchetypeMemory::Victim(VictimMemory {
                home: position,
                hide_timer: 0.0,
                can_hide: true,
            }),
            Archetype::Slayer => ArchetypeMemory::Slayer(SlayerMemory {
                segment: 0,
                attack_cooldown: 0.0,
            }),
        }
    }

    pub fn attack_cooldown(&self) -> f32 {
        match self {
            ArchetypeMemory::Guard(g) => g.attack_cooldown,
            ArchetypeMemory::Slayer(s) => s.attack_cooldown,
            ArchetypeMemory::Victim(_) => 0.0,
        }
    }

    pub fn attack_cooldown_mut(&mut self) -> Option<&mut f32> {
        match self {
            ArchetypeMemory::Guard(g) => Some(&mut g.attack_cooldown),
            ArchetypeMemory::Slayer(s) => Some(&mut s.attack_cooldown),
            ArchetypeMemory::Victim(_) => None,
        }
    }

    pub fn hide_timer(&self) -> f32 {
        match self {
            ArchetypeMemory::Victim(v) => v.hide_timer,
            _ => 0.0,
        }
    }

    /// Next patrol waypoint (guards) or ring segment (slayer)
    pub fn route_progress(&self) -> usize {
        match self {
            ArchetypeMemory::Guard(g) => g.next_waypoint,
            ArchetypeMemory::Slayer(s) => s.segment as usize,
            ArchetypeMemory::Victim(_) => 0,
        }
    }
}

/// A townsperson, guard or slayer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: NpcId,
    pub archetype: Archetype,
    /// Objective entry this NPC satisfies when consumed
    pub goal: Goal,
    pub position: Vec3,
    pub forward: Vec3,
    pub health: i32,
    pub max_health: i32,
    pub alert: AlertnessTracker,
    pub disturbance: DisturbanceMemory,
    /// Far range used to weigh detections
    pub vision_range: f32,
    pub alert_range: f32,
    pub behavior_state: BehaviorState,
    pub memory: ArchetypeMemory,
    pub profile: ArchetypeProfile,

    pub grappled: bool,
    pub hypnotised: bool,
    pub fleeing: bool,
    pub in_home: bool,
    /// Target seen this tick
    pub player_visible: bool,
    /// Target seen the tick before
    pub was_visible: bool,
    /// Which body was seen this tick
    pub detected: Option<TargetKind>,
    /// Last reported moving flag
    pub moving: bool,

    initialized: bool,
}

impl Npc {
    /// Create an uninitialized NPC; it does nothing until [`init`](Self::init)
    pub fn new(id: NpcId, archetype: Archetype, position: Vec3, forward: Vec3) -> Self {
        let profile = ArchetypeProfile::default();
        Self {
            id,
            archetype,
            goal: archetype.default_goal(),
            position,
            forward,
            health: profile.max_health,
            max_health: profile.max_health,
            alert: AlertnessTracker::new(profile.min_calm_down, profile.base_passive_vision_range),
            disturbance: DisturbanceMemory::new(),
            vision_range: 0.0,
            alert_range: profile.alert_range,
            behavior_state: state_for(archetype, 0),
            memory: ArchetypeMemory::for_archetype(archetype, position),
            profile,
            grappled: false,
            hypnotised: false,
            fleeing: false,
            in_home: false,
            player_visible: false,
            was_visible: false,
            detected: None,
            moving: false,
            initialized: false,
        }
    }

    /// Apply the archetype's defaults and reset all dynamic state
    pub fn init(&mut self, config: &SimulationConfig) {
        let profile = *config.profiles.get(self.archetype);
        self.profile = profile;
        self.max_health = profile.max_health;
        self.health = profile.max_health;
        self.alert = AlertnessTracker::new(profile.min_calm_down, profile.base_passive_vision_range);
        self.disturbance = DisturbanceMemory::new();
        self.vision_range = config.observer_max_range;
        self.alert_range = profile.alert_range;
        self.behavior_state = state_for(self.archetype, 0);

        match &mut self.memory {
            ArchetypeMemory::Guard(g) => {
                g.next_waypoint = 0;
                g.attack_cooldown = 0.0;
            }
            ArchetypeMemory::Victim(v) => v.hide_timer = 0.0,
            ArchetypeMemory::Slayer(s) => {
                s.segment = 0;
                s.attack_cooldown = 0.0;
            }
        }

        self.grappled = false;
        self.hypnotised = false;
        self.fleeing = false;
        self.in_home = false;
        self.player_visible = false;
        self.was_visible = false;
        self.detected = None;
        self.moving = false;
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn alertness(&self) -> u8 {
        self.alert.alertness()
    }

    /// Frozen NPCs neither move nor run their policy
    pub fn is_frozen(&self) -> bool {
        self.grappled || self.hypnotised
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Force an alertness level and keep the behavior state in step
    pub fn set_alertness(&mut self, level: u8) {
        self.alert.set_alertness(level);
        self.behavior_state = state_for(self.archetype, self.alert.alertness());
    }

    pub fn alertness_params(&self, config: &SimulationConfig) -> AlertnessParams {
        AlertnessParams::from_config(config, &self.profile)
    }

    pub fn observer(&self, config: &SimulationConfig) -> Observer {
        Observer {
            position: self.position,
            forward: self.forward,
            passive_vision_range: self.alert.passive_vision_range(),
            frustum: ViewFrustum::from_config(config),
            eye_height: config.eye_height,
        }
    }

    /// Subtract health; returns true when this blow killed the NPC
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health -= amount;
        self.is_dead()
    }

    pub fn home(&self) -> Option<Vec3> {
        match &self.memory {
            ArchetypeMemory::Victim(v) => Some(v.home),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> NpcSnapshot {
        NpcSnapshot {
            id: self.id,
            position: self.position,
            forward: self.forward,
            health: self.health,
            alertness: self.alert.alertness(),
            alert_counter: self.alert.alert_counter(),
            disturbance: self.disturbance.raw(),
            behavior_state: self.behavior_state,
            passive_vision_range: self.alert.passive_vision_range(),
            detected: self.detected,
            was_visible: self.was_visible,
            grappled: self.grappled,
            hypnotised: self.hypnotised,
            fleeing: self.fleeing,
            in_home: self.in_home,
            moving: self.moving,
            attack_cooldown: self.memory.attack_cooldown(),
            hide_timer: self.memory.hide_timer(),
            route_progress: self.memory.route_progress(),
        }
    }

    /// Restore the dynamic state captured by [`snapshot`](Self::snapshot)
    pub fn restore(&mut self, snapshot: &NpcSnapshot) {
        self.position = snapshot.position;
        self.forward = snapshot.forward;
        self.health = snapshot.health;
        self.alert.restore(snapshot.alertness, snapshot.alert_counter);
        self.alert.set_passive_vision_range(snapshot.passive_vision_range);
        self.disturbance = DisturbanceMemory::new();
        if let Some(point) = snapshot.disturbance {
            self.disturbance.set(point);
        }
        self.behavior_state = state_for(self.archetype, self.alert.alertness());
        self.detected = snapshot.detected;
        self.player_visible = snapshot.detected.is_some();
        self.was_visible = snapshot.was_visible;
        self.grappled = snapshot.grappled;
        self.hypnotised = snapshot.hypnotised;
        self.fleeing = snapshot.fleeing;
        self.in_home = snapshot.in_home;
        self.moving = snapshot.moving;
        match &mut self.memory {
            ArchetypeMemory::Guard(g) => {
                g.attack_cooldown = snapshot.attack_cooldown;
                g.next_waypoint = snapshot.route_progress;
            }
            ArchetypeMemory::Victim(v) => v.hide_timer = snapshot.hide_timer,
            ArchetypeMemory::Slayer(s) => {
                s.attack_cooldown = snapshot.attack_cooldown;
                s.segment = snapshot.route_progress as u32;
            }
        }
    }
}

/// Serializable capture of an NPC's dynamic state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcSnapshot {
    pub id: NpcId,
    pub position: Vec3,
    pub forward: Vec3,
    pub health: i32,
    pub alertness: u8,
    pub alert_counter: f32,
    pub disturbance: Option<Vec3>,
    pub behavior_state: BehaviorState,
    /// Near-field radius; doubled after a sprinting sighting
    pub passive_vision_range: f32,
    pub detected: Option<TargetKind>,
    pub was_visible: bool,
    pub grappled: bool,
    pub hypnotised: bool,
    pub fleeing: bool,
    pub in_home: bool,
    pub moving: bool,
    pub attack_cooldown: f32,
    pub hide_timer: f32,
    /// Guard waypoint index or slayer ring segment
    pub route_progress: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::state::{GuardBehavior, VictimBehavior};

    fn guard() -> Npc {
        let mut npc = Npc::new(NpcId(1), Archetype::Guard, Vec3::ZERO, Vec3::Z);
        npc.init(&SimulationConfig::default());
        npc
    }

    #[test]
    fn test_new_npc_is_uninitialized() {
        let npc = Npc::new(NpcId(1), Archetype::Noble, Vec3::ZERO, Vec3::Z);
        assert!(!npc.is_initialized());
        assert_eq!(npc.home(), Some(Vec3::ZERO));
    }

    #[test]
    fn test_init_applies_profile() {
        let mut config = SimulationConfig::default();
        config.profiles.drunkard.min_calm_down = 5;
        config.profiles.drunkard.max_health = 4;

        let mut npc = Npc::new(NpcId(2), Archetype::Drunkard, Vec3::ZERO, Vec3::Z);
        npc.init(&config);

        assert!(npc.is_initialized());
        assert_eq!(npc.health, 4);
        assert_eq!(npc.alert.min_calm_down(), 5);
        assert_eq!(npc.vision_range, config.observer_max_range);
        assert_eq!(npc.behavior_state, BehaviorState::Victim(VictimBehavior::Wander));
    }

    #[test]
    fn test_damage_kills_once() {
        let mut npc = guard();
        assert!(!npc.take_damage(1));
        assert!(npc.take_damage(1));
        assert!(!npc.take_damage(1));
        assert!(npc.is_dead());
    }

    #[test]
    fn test_set_alertness_updates_state() {
        let mut npc = guard();
        npc.set_alertness(9);
        assert_eq!(npc.behavior_state, BehaviorState::Guard(GuardBehavior::Alert));
        npc.set_alertness(42);
        assert_eq!(npc.alertness(), 9);
    }

    #[test]
    fn test_frozen_flags() {
        let mut npc = guard();
        assert!(!npc.is_frozen());
        npc.hypnotised = true;
        assert!(npc.is_frozen());
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let mut npc = guard();
        npc.alert.restore(6, 0.25);
        npc.behavior_state = state_for(Archetype::Guard, 6);
        npc.disturbance.set(Vec3::new(3.0, 0.0, 4.0));
        if let Some(cooldown) = npc.memory.attack_cooldown_mut() {
            *cooldown = 1.5;
        }

        let snapshot = npc.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: NpcSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);

        let mut fresh = guard();
        fresh.restore(&parsed);
        assert_eq!(fresh.snapshot(), snapshot);
        assert_eq!(fresh.behavior_state, BehaviorState::Guard(GuardBehavior::Attack));
    }

    #[test]
    fn test_restore_into_fresh_npc_keeps_perception_state() {
        use crate::perception::alertness::Sighting;
        use crate::perception::visibility::is_target_visible;
        use crate::player::PlayerView;
        use crate::spatial::occlusion::{Raycaster, StaticScene};

        let config = SimulationConfig::default();
        let mut seen = guard();
        if let ArchetypeMemory::Guard(g) = &mut seen.memory {
            g.waypoints = vec![Vec3::ZERO, Vec3::X, Vec3::Z];
            g.next_waypoint = 2;
        }
        let params = seen.alertness_params(&config);
        seen.alert.update(
            Some(Sighting {
                distance: 4.0,
                in_light: false,
                sprinting: true,
            }),
            &params,
            0.1,
        );
        seen.was_visible = true;
        seen.detected = Some(TargetKind::Player);
        seen.player_visible = true;
        seen.moving = true;

        let json = serde_json::to_string(&seen.snapshot()).unwrap();
        let parsed: NpcSnapshot = serde_json::from_str(&json).unwrap();

        let mut fresh = guard();
        if let ArchetypeMemory::Guard(g) = &mut fresh.memory {
            g.waypoints = vec![Vec3::ZERO, Vec3::X, Vec3::Z];
        }
        fresh.restore(&parsed);
        assert_eq!(fresh, seen);

        // The doubled near field still covers a player just behind
        let player = PlayerView::at(Vec3::new(0.0, 0.0, -2.5));
        let mut scene = StaticScene::new();
        scene.sync_player(&player);
        let observer = fresh.observer(&config);
        assert_eq!(observer.passive_vision_range, 6.0);
        assert!(is_target_visible(&observer, &player, &scene).is_some());
    }

    #[test]
    fn test_snapshot_carries_slayer_segment() {
        let mut slayer = Npc::new(NpcId(3), Archetype::Slayer, Vec3::ZERO, Vec3::Z);
        slayer.init(&SimulationConfig::default());
        if let ArchetypeMemory::Slayer(s) = &mut slayer.memory {
            s.segment = 5;
        }

        let mut fresh = Npc::new(NpcId(3), Archetype::Slayer, Vec3::ZERO, Vec3::Z);
        fresh.init(&SimulationConfig::default());
        fresh.restore(&slayer.snapshot());
        assert_eq!(fresh.memory.route_progress(), 5);
    }
}
