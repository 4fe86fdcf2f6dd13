//! Straight-line navigation agents for headless runs and tests
//!
//! Agents walk directly at their destination; every path is complete.

use ahash::AHashMap;
use glam::Vec3;

use crate::core::types::{same_point, NpcId};
use crate::navigation::NavigationService;

#[derive(Debug, Clone)]
struct Agent {
    position: Vec3,
    destination: Option<Vec3>,
    speed: f32,
    velocity: Vec3,
    enabled: bool,
    /// Number of times a new path was requested
    replans: u32,
}

/// Navigation service that moves agents in straight lines
#[derive(Debug, Clone, Default)]
pub struct StraightLineNavigator {
    agents: AHashMap<NpcId, Agent>,
}

impl StraightLineNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move an agent without planning
    pub fn teleport(&mut self, npc: NpcId, position: Vec3) {
        if let Some(agent) = self.agents.get_mut(&npc) {
            agent.position = position;
        }
    }

    /// How many paths have been requested for an agent
    pub fn replan_count(&self, npc: NpcId) -> u32 {
        self.agents.get(&npc).map(|a| a.replans).unwrap_or(0)
    }

    pub fn speed(&self, npc: NpcId) -> Option<f32> {
        self.agents.get(&npc).map(|a| a.speed)
    }

    pub fn is_enabled(&self, npc: NpcId) -> bool {
        self.agents.get(&npc).map(|a| a.enabled).unwrap_or(false)
    }
}

impl NavigationService for StraightLineNavigator {
    fn register(&mut self, npc: NpcId, position: Vec3) {
        self.agents.insert(
            npc,
            Agent {
                position,
                destination: None,
                speed: 0.0,
                velocity: Vec3::ZERO,
                enabled: true,
                replans: 0,
            },
        );
    }

    fn remove(&mut self, npc: NpcId) {
        self.agents.remove(&npc);
    }

    fn is_ready(&self, npc: NpcId) -> bool {
        self.agents.contains_key(&npc)
    }

    fn position(&self, npc: NpcId) -> Option<Vec3> {
        self.agents.get(&npc).map(|a| a.position)
    }

    fn destination(&self, npc: NpcId) -> Option<Vec3> {
        self.agents.get(&npc).and_then(|a| a.destination)
    }

    fn set_destination(&mut self, npc: NpcId, destination: Vec3) {
        let Some(agent) = self.agents.get_mut(&npc) else {
            return;
        };
        if !agent.enabled {
            tracing::warn!("Ignoring destination for disabled agent {:?}", npc);
            return;
        }
        agent.destination = Some(destination);
        agent.replans += 1;
    }

    fn remaining_distance(&self, npc: NpcId) -> f32 {
        match self.agents.get(&npc) {
            Some(agent) if agent.enabled => agent
                .destination
                .map(|d| agent.position.distance(d))
                .unwrap_or(0.0),
            _ => f32::INFINITY,
        }
    }

    fn path_complete(&self, npc: NpcId) -> bool {
        self.agents
            .get(&npc)
            .map(|a| a.enabled && a.destination.is_some())
            .unwrap_or(false)
    }

    fn velocity(&self, npc: NpcId) -> Vec3 {
        self.agents.get(&npc).map(|a| a.velocity).unwrap_or(Vec3::ZERO)
    }

    fn set_speed(&mut self, npc: NpcId, speed: f32) {
        if let Some(agent) = self.agents.get_mut(&npc) {
            agent.speed = speed.max(0.0);
        }
    }

    fn set_enabled(&mut self, npc: NpcId, enabled: bool) {
        if let Some(agent) = self.agents.get_mut(&npc) {
            agent.enabled = enabled;
            if !enabled {
                agent.velocity = Vec3::ZERO;
            }
        }
    }

    fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for agent in self.agents.values_mut() {
            agent.velocity = Vec3::ZERO;
            if !agent.enabled {
                continue;
            }
            let Some(destination) = agent.destination else {
                continue;
            };
            if same_point(agent.position, destination) {
                continue;
            }

            let to_target = destination - agent.position;
            let step = agent.speed * dt;
            let previous = agent.position;
            if step >= to_target.length() {
                agent.position = destination;
            } else {
                agent.position += to_target.normalize_or_zero() * step;
            }
            agent.velocity = (agent.position - previous) / dt;
        }
    }
}
