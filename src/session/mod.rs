//! Night session - owns the roster and runs the per-tick pipeline
//!
//! Tick order:
//! 1. Apply alarm boosts queued during the previous tick
//! 2. For each NPC in roster order: perceive, integrate alertness, pick the
//!    band, run its policy, queue alarm boosts
//! 3. Step the navigation service and the night clock
//!
//! The session is single-threaded and owns its rng, so a seed plus the same
//! sequence of player snapshots replays exactly.

pub mod clock;
pub mod objectives;
pub mod roster;

pub use clock::NightClock;
pub use objectives::{ConsumptionOutcome, Objectives};
pub use roster::{NightPlan, NpcSpawn, Roster};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::behavior::intents::{Intent, NpcIntent, Outbox};
use crate::behavior::state::state_for;
use crate::behavior::{on_transition, report_locomotion, run_policy, victim, PolicyContext};
use crate::core::config::SimulationConfig;
use crate::core::error::{NocturneError, Result};
use crate::core::types::{flatten, NpcId, Tick};
use crate::navigation::{halt, NavigationService};
use crate::npc::{Npc, NpcSnapshot};
use crate::perception::alertness::{Sighting, MAX_ALERTNESS};
use crate::perception::propagation::AlertPropagation;
use crate::perception::visibility::is_target_visible;
use crate::player::{PlayerEffect, PlayerView};
use crate::spatial::occlusion::Raycaster;

/// Everything that happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: Tick,
    pub intents: Vec<NpcIntent>,
    pub effects: Vec<PlayerEffect>,
    /// NPCs that raised the alarm this tick
    pub alarms: Vec<NpcId>,
    /// The night ended on this tick
    pub sunrise: bool,
}

/// Outcome of damaging an NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub died: bool,
    pub consumption: Option<ConsumptionOutcome>,
}

/// Mean roster alertness, rounded down
pub fn town_awareness(npcs: &[Npc]) -> u8 {
    if npcs.is_empty() {
        return 0;
    }
    let total: u32 = npcs.iter().map(|n| n.alertness() as u32).sum();
    (total / npcs.len() as u32).min(MAX_ALERTNESS as u32) as u8
}

pub struct NightSession<N: NavigationService, R: Raycaster> {
    config: SimulationConfig,
    roster: Roster,
    nav: N,
    raycaster: R,
    npcs: Vec<Npc>,
    player: Option<PlayerView>,
    rng: ChaCha8Rng,
    propagation: AlertPropagation,
    objectives: Objectives,
    clock: NightClock,
    tick: Tick,
    next_id: u32,
    /// Intents and effects produced outside a tick (damage, grapples)
    outbox: Outbox,
}

impl<N: NavigationService, R: Raycaster> NightSession<N, R> {
    pub fn new(
        config: SimulationConfig,
        roster: Roster,
        nav: N,
        raycaster: R,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        let objectives = Objectives::new(roster.objective_lists(), config.consumptions_per_upgrade);
        Ok(Self {
            propagation: AlertPropagation::new(config.grid_cell_size),
            clock: NightClock::new(config.night_length),
            config,
            roster,
            nav,
            raycaster,
            npcs: Vec::new(),
            player: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            objectives,
            tick: 0,
            next_id: 1,
            outbox: Outbox::new(),
        })
    }

    // === LIFECYCLE ===

    /// Replace the roster with a night's placements and initialize everyone
    pub fn begin_night(&mut self, night: usize) -> Result<()> {
        let plan = self.roster.night(night)?.clone();
        self.objectives.begin(night)?;

        self.clear_roster();
        for spawn in &plan.npcs {
            self.spawn_npc(spawn);
        }
        self.clock.reset();
        self.tick = 0;

        tracing::info!(
            "Night {} begins: {} NPCs, {} objectives",
            night,
            self.npcs.len(),
            self.objectives.remaining().len()
        );
        Ok(())
    }

    /// Start the current night over with its original objectives
    pub fn restart_night(&mut self) -> Result<()> {
        self.begin_night(self.objectives.night())
    }

    /// Place, initialize and register one NPC
    pub fn spawn_npc(&mut self, spawn: &NpcSpawn) -> NpcId {
        let id = self.allocate_id();
        let mut npc = spawn.build(id);
        npc.init(&self.config);
        self.nav.register(id, npc.position);
        self.npcs.push(npc);
        id
    }

    /// Add an NPC as-is; it acts only once initialized and registered
    pub fn insert_npc(&mut self, npc: Npc) {
        self.next_id = self.next_id.max(npc.id.0 + 1);
        self.npcs.push(npc);
    }

    fn allocate_id(&mut self) -> NpcId {
        let id = NpcId(self.next_id);
        self.next_id += 1;
        id
    }

    fn clear_roster(&mut self) {
        for npc in self.npcs.drain(..) {
            self.nav.remove(npc.id);
        }
        self.propagation.reset();
        self.outbox = Outbox::new();
    }

    // === PLAYER ===

    /// Set the player snapshot used by the next tick
    pub fn set_player(&mut self, player: PlayerView) {
        self.raycaster.sync_player(&player);
        self.player = Some(player);
    }

    /// Forget the player; ticks are skipped until a new snapshot arrives
    pub fn clear_player(&mut self) {
        self.player = None;
    }

    pub fn player(&self) -> Option<&PlayerView> {
        self.player.as_ref()
    }

    // === TICK ===

    pub fn tick(&mut self, dt: f32) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };
        let mut out = self.outbox.take();

        let Some(player) = self.player else {
            tracing::trace!("Tick {} skipped: no player", self.tick);
            report.intents = out.intents;
            report.effects = out.effects;
            return report;
        };

        self.apply_pending_boosts();
        self.propagation.rebuild_index(
            self.npcs
                .iter()
                .filter(|n| n.is_initialized() && !n.in_home)
                .map(|n| (n.id, n.position)),
        );

        let ctx = PolicyContext {
            config: &self.config,
            player: &player,
            dt,
        };

        for npc in self.npcs.iter_mut() {
            if !npc.is_initialized() {
                tracing::trace!("{:?} skipped: not initialized", npc.id);
                continue;
            }
            if !self.nav.is_ready(npc.id) {
                tracing::trace!("{:?} skipped: navigation not ready", npc.id);
                continue;
            }

            let raised = step_npc(
                npc,
                &mut self.nav,
                &self.raycaster,
                &ctx,
                &mut self.rng,
                &mut out,
            );
            if raised {
                self.propagation.broadcast(
                    npc.id,
                    npc.position,
                    npc.alert_range,
                    npc.profile.alertness_increase,
                    dt,
                );
                report.alarms.push(npc.id);
            }
        }

        self.nav.advance(dt);
        for npc in self.npcs.iter_mut() {
            if npc.is_initialized() && !npc.in_home {
                report_locomotion(npc, self.nav.velocity(npc.id), &mut out);
            }
        }

        if self.clock.advance(dt) {
            tracing::info!("Sunrise after {} ticks", self.tick);
            report.sunrise = true;
        }

        report.intents = out.intents;
        report.effects = out.effects;
        report
    }

    fn apply_pending_boosts(&mut self) {
        for boost in self.propagation.drain() {
            if let Some(npc) = self.npcs.iter_mut().find(|n| n.id == boost.target) {
                if npc.in_home {
                    continue;
                }
                npc.alert.boost(boost.amount);
            }
        }
    }

    // === INTERACTIONS ===

    fn npc_index(&self, id: NpcId) -> Result<usize> {
        self.npcs
            .iter()
            .position(|n| n.id == id)
            .ok_or(NocturneError::NpcNotFound(id))
    }

    /// Deal damage; a killed NPC is reported to the objectives and removed
    pub fn damage_npc(&mut self, id: NpcId, amount: i32) -> Result<DamageOutcome> {
        let index = self.npc_index(id)?;
        let npc = &mut self.npcs[index];

        if npc.max_health > 1 {
            self.outbox.push(id, Intent::Damaged);
        }
        if !npc.take_damage(amount) {
            return Ok(DamageOutcome {
                died: false,
                consumption: None,
            });
        }

        halt(&mut self.nav, id);
        self.nav.set_enabled(id, false);
        self.outbox.push(id, Intent::Died);

        let goal = npc.goal;
        let archetype = npc.archetype;
        self.npcs.remove(index);
        self.nav.remove(id);

        let outcome = self.objectives.report_consumed(goal);
        tracing::info!("{:?} ({:?}) consumed as {:?}", id, archetype, goal);
        Ok(DamageOutcome {
            died: true,
            consumption: Some(outcome),
        })
    }

    pub fn grapple(&mut self, id: NpcId) -> Result<()> {
        let index = self.npc_index(id)?;
        let npc = &mut self.npcs[index];
        if !npc.archetype.can_be_grappled() {
            return Err(NocturneError::NotGrappleable(id));
        }
        npc.grappled = true;
        self.nav.set_speed(id, 0.0);
        self.outbox.push(id, Intent::Grappled(true));
        Ok(())
    }

    /// Let go: the NPC is fully alarmed and knows where the player is
    pub fn release_grapple(&mut self, id: NpcId) -> Result<()> {
        let index = self.npc_index(id)?;
        let player = self.player.map(|p| p.position);
        let npc = &mut self.npcs[index];

        npc.grappled = false;
        npc.set_alertness(MAX_ALERTNESS);
        if let Some(position) = player {
            npc.disturbance.set(position);
        }
        self.outbox.push(id, Intent::Grappled(false));
        Ok(())
    }

    pub fn hypnotise(&mut self, id: NpcId) -> Result<()> {
        let index = self.npc_index(id)?;
        if !self.npcs[index].archetype.can_be_hypnotised() {
            return Err(NocturneError::NotHypnotisable(id));
        }
        self.npcs[index].hypnotised = true;
        self.nav.set_speed(id, 0.0);
        Ok(())
    }

    pub fn release_hypnosis(&mut self, id: NpcId) -> Result<()> {
        let index = self.npc_index(id)?;
        self.npcs[index].hypnotised = false;
        Ok(())
    }

    // === STATE ===

    pub fn snapshot(&self, id: NpcId) -> Result<NpcSnapshot> {
        let index = self.npc_index(id)?;
        Ok(self.npcs[index].snapshot())
    }

    /// Put an NPC back into a captured state
    ///
    /// Agent state inside the navigation service is not part of a snapshot.
    pub fn restore(&mut self, snapshot: &NpcSnapshot) -> Result<()> {
        let index = self.npc_index(snapshot.id)?;
        self.npcs[index].restore(snapshot);
        Ok(())
    }

    pub fn town_awareness(&self) -> u8 {
        town_awareness(&self.npcs)
    }

    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    pub fn npc_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.npcs.iter_mut().find(|n| n.id == id)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn objectives(&self) -> &Objectives {
        &self.objectives
    }

    pub fn objectives_mut(&mut self) -> &mut Objectives {
        &mut self.objectives
    }

    pub fn clock(&self) -> &NightClock {
        &self.clock
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn nav(&self) -> &N {
        &self.nav
    }

    pub fn nav_mut(&mut self) -> &mut N {
        &mut self.nav
    }

    pub fn raycaster(&self) -> &R {
        &self.raycaster
    }

    pub fn raycaster_mut(&mut self) -> &mut R {
        &mut self.raycaster
    }
}

/// Run one NPC's pipeline; returns true when it raised the alarm
fn step_npc<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    nav: &mut N,
    raycaster: &dyn Raycaster,
    ctx: &PolicyContext,
    rng: &mut ChaCha8Rng,
    out: &mut Outbox,
) -> bool {
    if npc.in_home {
        victim::tick_hiding(npc, nav, ctx.dt, out);
        return false;
    }

    if let Some(position) = nav.position(npc.id) {
        npc.position = position;
    }
    let heading = flatten(nav.velocity(npc.id));
    if heading.length_squared() > 1e-6 {
        npc.forward = heading.normalize();
    }

    // Perception
    let detection = is_target_visible(&npc.observer(ctx.config), ctx.player, raycaster);
    npc.was_visible = npc.player_visible;
    npc.player_visible = detection.is_some();
    npc.detected = detection.map(|seen| seen.target);
    if let Some(seen) = detection {
        npc.disturbance.set(seen.point);
    }

    // Suspicion
    let sighting = detection.map(|seen| Sighting {
        distance: npc.position.distance(seen.point),
        in_light: ctx.player.in_light,
        sprinting: ctx.player.sprinting,
    });
    let params = npc.alertness_params(ctx.config);
    let alertness = npc.alert.update(sighting, &params, ctx.dt);

    let previous = npc.behavior_state;
    npc.behavior_state = state_for(npc.archetype, alertness);
    if npc.behavior_state != previous {
        on_transition(npc, previous, npc.behavior_state, out);
    }

    if ctx.player.cloaked
        && npc.position.distance(ctx.player.position) <= ctx.config.cloak_reveal_radius
    {
        tracing::debug!("{:?} walked into the cloaked player", npc.id);
        out.effect(PlayerEffect::RevealCloak);
    }

    if npc.is_frozen() {
        nav.set_speed(npc.id, 0.0);
        return false;
    }

    run_policy(npc, nav, ctx, rng, out);

    npc.behavior_state.is_alert_band() && npc.archetype.raises_alarm() && !npc.in_home
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::StraightLineNavigator;
    use crate::npc::Archetype;
    use crate::spatial::occlusion::StaticScene;
    use glam::Vec3;

    fn session_with(spawns: Vec<NpcSpawn>) -> NightSession<StraightLineNavigator, StaticScene> {
        let roster = Roster::new(vec![NightPlan {
            objectives: vec![crate::npc::Goal::Guard],
            npcs: spawns,
            obstacles: Vec::new(),
        }]);
        let mut session = NightSession::new(
            SimulationConfig::default(),
            roster,
            StraightLineNavigator::new(),
            StaticScene::new(),
            42,
        )
        .unwrap();
        session.begin_night(0).unwrap();
        session
    }

    #[test]
    fn test_begin_night_out_of_range() {
        let mut session = session_with(vec![]);
        assert!(matches!(
            session.begin_night(4),
            Err(NocturneError::NightOutOfRange { index: 4, nights: 1 })
        ));
    }

    #[test]
    fn test_tick_without_player_changes_nothing() {
        let mut session = session_with(vec![NpcSpawn::new(Archetype::Guard, Vec3::ZERO)]);
        let before = session.npcs()[0].snapshot();

        let report = session.tick(0.1);
        assert!(report.intents.is_empty());
        assert_eq!(session.npcs()[0].snapshot(), before);
    }

    #[test]
    fn test_uninitialized_npc_never_acts() {
        let mut session = session_with(vec![]);
        let npc = Npc::new(NpcId(9), Archetype::Guard, Vec3::ZERO, Vec3::Z);
        session.nav_mut().register(NpcId(9), Vec3::ZERO);
        session.insert_npc(npc);
        session.set_player(PlayerView::at(Vec3::new(0.0, 0.0, 1.0)));

        for _ in 0..20 {
            session.tick(0.5);
        }
        let npc = session.npc(NpcId(9)).unwrap();
        assert_eq!(npc.alertness(), 0);
        assert_eq!(npc.alert.alert_counter(), 0.0);
    }

    #[test]
    fn test_unregistered_npc_is_skipped() {
        let mut session = session_with(vec![]);
        let mut npc = Npc::new(NpcId(9), Archetype::Noble, Vec3::ZERO, Vec3::Z);
        npc.init(&SimulationConfig::default());
        session.insert_npc(npc);
        session.set_player(PlayerView::at(Vec3::new(0.0, 0.0, 1.0)));

        session.tick(0.5);
        assert_eq!(session.npc(NpcId(9)).unwrap().alert.alert_counter(), 0.0);
    }

    #[test]
    fn test_cloaked_player_revealed_at_point_blank() {
        let mut session = session_with(vec![NpcSpawn::new(Archetype::Noble, Vec3::ZERO)]);
        let mut player = PlayerView::at(Vec3::new(0.0, 0.0, 1.0));
        player.cloaked = true;
        session.set_player(player);

        let report = session.tick(0.1);
        assert_eq!(report.effects, vec![PlayerEffect::RevealCloak]);
        // Cloaked player is not seen
        assert!(!session.npcs()[0].player_visible);
    }

    #[test]
    fn test_guard_death_reports_objective() {
        let mut session = session_with(vec![NpcSpawn::new(Archetype::Guard, Vec3::ZERO)]);
        let id = session.npcs()[0].id;

        let first = session.damage_npc(id, 1).unwrap();
        assert!(!first.died);
        let second = session.damage_npc(id, 1).unwrap();
        assert!(second.died);
        assert!(second.consumption.unwrap().night_complete);

        assert!(session.npc(id).is_none());
        assert!(!session.nav().is_ready(id));
        assert!(session.objectives().is_complete());
        assert!(matches!(
            session.damage_npc(id, 1),
            Err(NocturneError::NpcNotFound(_))
        ));

        session.set_player(PlayerView::at(Vec3::new(50.0, 0.0, 50.0)));
        let report = session.tick(0.1);
        let intents: Vec<_> = report.intents.iter().map(|i| i.intent).collect();
        assert_eq!(intents, vec![Intent::Damaged, Intent::Damaged, Intent::Died]);
    }

    #[test]
    fn test_slayer_cannot_be_grappled() {
        let mut session = session_with(vec![NpcSpawn::new(Archetype::Slayer, Vec3::ZERO)]);
        let id = session.npcs()[0].id;
        assert!(matches!(
            session.grapple(id),
            Err(NocturneError::NotGrappleable(_))
        ));
    }

    #[test]
    fn test_slayer_cannot_be_hypnotised() {
        let mut session = session_with(vec![NpcSpawn::new(Archetype::Slayer, Vec3::ZERO)]);
        let id = session.npcs()[0].id;
        assert!(matches!(
            session.hypnotise(id),
            Err(NocturneError::NotHypnotisable(_))
        ));
        assert!(!session.npc(id).unwrap().is_frozen());
    }

    #[test]
    fn test_grapple_freezes_and_release_alarms() {
        let mut session = session_with(vec![NpcSpawn::new(Archetype::Noble, Vec3::ZERO)]);
        let id = session.npcs()[0].id;
        let player = PlayerView::at(Vec3::new(30.0, 0.0, -30.0));
        session.set_player(player);

        session.grapple(id).unwrap();
        session.tick(0.5);
        assert_eq!(session.nav().position(id), Some(Vec3::ZERO));
        assert_eq!(session.nav().speed(id), Some(0.0));

        session.release_grapple(id).unwrap();
        let npc = session.npc(id).unwrap();
        assert!(!npc.grappled);
        assert_eq!(npc.alertness(), MAX_ALERTNESS);
        assert_eq!(npc.disturbance.raw(), Some(player.position));
    }

    #[test]
    fn test_town_awareness_is_floor_mean() {
        let mut session = session_with(vec![
            NpcSpawn::new(Archetype::Guard, Vec3::ZERO),
            NpcSpawn::new(Archetype::Noble, Vec3::new(50.0, 0.0, 0.0)),
        ]);
        assert_eq!(session.town_awareness(), 0);

        let ids: Vec<_> = session.npcs().iter().map(|n| n.id).collect();
        session.npc_mut(ids[0]).unwrap().set_alertness(9);
        session.npc_mut(ids[1]).unwrap().set_alertness(2);
        assert_eq!(session.town_awareness(), 5);
        assert_eq!(town_awareness(&[]), 0);
    }

    #[test]
    fn test_restart_night_restores_roster_and_objectives() {
        let mut session = session_with(vec![NpcSpawn::new(Archetype::Guard, Vec3::ZERO)]);
        let id = session.npcs()[0].id;
        session.damage_npc(id, 5).unwrap();
        assert!(session.npcs().is_empty());

        session.restart_night().unwrap();
        assert_eq!(session.npcs().len(), 1);
        assert_eq!(session.objectives().remaining(), &[crate::npc::Goal::Guard]);
    }
}
