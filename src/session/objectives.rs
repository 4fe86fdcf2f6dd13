//! Per-night consumption objectives and upgrade points
//!
//! Each night has a list of goals. Consuming an NPC strikes the first
//! matching entry. Every consumption also feeds upgrade progress (guards
//! count double), and clearing a night's list is worth a point of its own.

use serde::{Deserialize, Serialize};

use crate::core::error::{NocturneError, Result};
use crate::npc::archetype::Goal;

/// What a consumption report changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionOutcome {
    /// A goal on tonight's list was struck
    pub matched: bool,
    /// Upgrade points earned by this report
    pub upgrades_earned: u32,
    /// Tonight's list became empty with this report
    pub night_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objectives {
    /// Untouched lists, used to restart a night
    original: Vec<Vec<Goal>>,
    remaining: Vec<Goal>,
    night: usize,
    consumptions_per_upgrade: u32,
    progress: u32,
    upgrade_points: u32,
    consumed: u32,
}

impl Objectives {
    pub fn new(nights: Vec<Vec<Goal>>, consumptions_per_upgrade: u32) -> Self {
        let remaining = nights.first().cloned().unwrap_or_default();
        Self {
            original: nights,
            remaining,
            night: 0,
            consumptions_per_upgrade: consumptions_per_upgrade.max(1),
            progress: 0,
            upgrade_points: 0,
            consumed: 0,
        }
    }

    pub fn nights(&self) -> usize {
        self.original.len()
    }

    /// Load the list for a night
    pub fn begin(&mut self, night: usize) -> Result<()> {
        let list = self
            .original
            .get(night)
            .ok_or(NocturneError::NightOutOfRange {
                index: night,
                nights: self.original.len(),
            })?;
        self.remaining = list.clone();
        self.night = night;
        Ok(())
    }

    /// Put tonight's list back the way it started
    pub fn restart_night(&mut self) -> Result<()> {
        self.begin(self.night)
    }

    pub fn night(&self) -> usize {
        self.night
    }

    pub fn remaining(&self) -> &[Goal] {
        &self.remaining
    }

    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn upgrade_points(&self) -> u32 {
        self.upgrade_points
    }

    /// Total consumption points earned across nights
    pub fn consumed(&self) -> u32 {
        self.consumed
    }

    /// Spend an upgrade point; false when none are left
    pub fn spend_upgrade(&mut self) -> bool {
        if self.upgrade_points == 0 {
            return false;
        }
        self.upgrade_points -= 1;
        true
    }

    /// Record a consumed NPC
    pub fn report_consumed(&mut self, goal: Goal) -> ConsumptionOutcome {
        let points = goal.consumption_points();
        self.consumed += points;
        self.progress += points;

        let mut upgrades_earned = 0;
        while self.progress >= self.consumptions_per_upgrade {
            self.progress -= self.consumptions_per_upgrade;
            upgrades_earned += 1;
        }

        let was_complete = self.is_complete();
        let matched = match self.remaining.iter().position(|g| *g == goal) {
            Some(index) => {
                self.remaining.remove(index);
                true
            }
            None => false,
        };

        let night_complete = matched && !was_complete && self.is_complete();
        if night_complete {
            upgrades_earned += 1;
            tracing::info!("Night {} objectives complete", self.night);
        }

        self.upgrade_points += upgrades_earned;
        ConsumptionOutcome {
            matched,
            upgrades_earned,
            night_complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_goal_is_struck() {
        let mut objectives = Objectives::new(vec![vec![Goal::Noble, Goal::Noble, Goal::Guard]], 5);

        let outcome = objectives.report_consumed(Goal::Noble);
        assert!(outcome.matched);
        assert_eq!(objectives.remaining(), &[Goal::Noble, Goal::Guard]);

        let outcome = objectives.report_consumed(Goal::Drunkard);
        assert!(!outcome.matched);
        assert_eq!(objectives.remaining().len(), 2);
    }

    #[test]
    fn test_mayor_only_satisfied_by_mayor() {
        let mut objectives = Objectives::new(vec![vec![Goal::Mayor]], 5);
        assert!(!objectives.report_consumed(Goal::Noble).matched);
        assert!(objectives.report_consumed(Goal::Mayor).matched);
    }

    #[test]
    fn test_upgrade_every_five_points_guards_double() {
        let mut objectives = Objectives::new(vec![vec![]], 5);
        objectives.report_consumed(Goal::Guard);
        objectives.report_consumed(Goal::Guard);
        assert_eq!(objectives.upgrade_points(), 0);

        let outcome = objectives.report_consumed(Goal::Drunkard);
        assert_eq!(outcome.upgrades_earned, 1);
        assert_eq!(objectives.upgrade_points(), 1);
        assert_eq!(objectives.consumed(), 5);
    }

    #[test]
    fn test_clearing_list_earns_point_once() {
        let mut objectives = Objectives::new(vec![vec![Goal::Drunkard]], 5);
        let outcome = objectives.report_consumed(Goal::Drunkard);
        assert!(outcome.night_complete);
        assert_eq!(objectives.upgrade_points(), 1);

        let outcome = objectives.report_consumed(Goal::Drunkard);
        assert!(!outcome.night_complete);
        assert_eq!(objectives.upgrade_points(), 1);
    }

    #[test]
    fn test_restart_restores_list() {
        let mut objectives = Objectives::new(vec![vec![Goal::Noble], vec![Goal::Slayer]], 5);
        objectives.begin(1).unwrap();
        objectives.report_consumed(Goal::Slayer);
        assert!(objectives.is_complete());

        objectives.restart_night().unwrap();
        assert_eq!(objectives.remaining(), &[Goal::Slayer]);
    }

    #[test]
    fn test_night_out_of_range() {
        let mut objectives = Objectives::new(vec![vec![Goal::Noble]], 5);
        assert!(matches!(
            objectives.begin(3),
            Err(NocturneError::NightOutOfRange { index: 3, nights: 1 })
        ));
    }

    #[test]
    fn test_spend_upgrade() {
        let mut objectives = Objectives::new(vec![vec![Goal::Noble]], 5);
        assert!(!objectives.spend_upgrade());
        objectives.report_consumed(Goal::Noble);
        assert!(objectives.spend_upgrade());
        assert_eq!(objectives.upgrade_points(), 0);
    }
}
