//! Alarm spreading between NPCs
//!
//! An NPC in its alert band raises the suspicion counter of everyone within
//! its alert range. Boosts collected during a tick are held back and applied
//! together at the start of the next one, so roster order never decides who
//! hears an alarm first.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::NpcId;
use crate::spatial::sparse_hash::SparseHashGrid;

/// Counter boost owed to one NPC
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertBoost {
    pub target: NpcId,
    pub source: NpcId,
    pub amount: f32,
}

/// Neighbour index plus the boosts waiting for the next tick
pub struct AlertPropagation {
    grid: SparseHashGrid,
    pending: Vec<AlertBoost>,
}

impl AlertPropagation {
    pub fn new(cell_size: f32) -> Self {
        Self {
            grid: SparseHashGrid::new(cell_size),
            pending: Vec::new(),
        }
    }

    /// Re-index listener positions for this tick
    pub fn rebuild_index(&mut self, listeners: impl Iterator<Item = (NpcId, Vec3)>) {
        self.grid.rebuild(listeners);
    }

    /// Queue a boost for every indexed NPC within `alert_range` of `position`
    ///
    /// Returns how many listeners were reached.
    pub fn broadcast(
        &mut self,
        source: NpcId,
        position: Vec3,
        alert_range: f32,
        increase_rate: f32,
        dt: f32,
    ) -> usize {
        let amount = increase_rate * dt;
        let before = self.pending.len();

        for target in self.grid.query_radius(position, alert_range) {
            if target == source {
                continue;
            }
            self.pending.push(AlertBoost {
                target,
                source,
                amount,
            });
        }

        let reached = self.pending.len() - before;
        if reached > 0 {
            tracing::trace!("{:?} alerted {} neighbours", source, reached);
        }
        reached
    }

    /// Boosts queued since the last drain, in queue order
    pub fn drain(&mut self) -> Vec<AlertBoost> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[AlertBoost] {
        &self.pending
    }

    /// Forget queued boosts and the index (night change)
    pub fn reset(&mut self) {
        self.pending.clear();
        self.grid.clear();
    }
}
