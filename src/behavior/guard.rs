//! Guard policy

use rand_chacha::ChaCha8Rng;

use crate::behavior::attack::{investigate, pursue};
use crate::behavior::intents::Outbox;
use crate::behavior::state::GuardBehavior;
use crate::behavior::PolicyContext;
use crate::navigation::{request_destination, NavigationService};
use crate::npc::{ArchetypeMemory, Npc};

pub fn run<N: NavigationService + ?Sized>(
    npc: &mut Npc,
    band: GuardBehavior,
    nav: &mut N,
    ctx: &PolicyContext,
    rng: &mut ChaCha8Rng,
    out: &mut Outbox,
) {
    match band {
        GuardBehavior::Patrol => patrol(npc, nav, ctx),
        GuardBehavior::Investigate => investigate(npc, nav, ctx, out),
        // Alert moves like Attack; the alarm is raised by the session
        GuardBehavior::Attack | GuardBehavior::Alert => pursue(npc, nav, ctx, rng, out),
    }
}

/// Walk the waypoint loop
fn patrol<N: NavigationService + ?Sized>(npc: &mut Npc, nav: &mut N, ctx: &PolicyContext) {
    let id = npc.id;
    nav.set_speed(id, npc.profile.normal_speed);

    let ArchetypeMemory::Guard(memory) = &mut npc.memory else {
        return;
    };
    if memory.waypoints.is_empty() {
        return;
    }

    if nav.remaining_distance(id) <= ctx.config.arrival_distance {
        let count = memory.waypoints.len();
        let target = memory.waypoints[memory.next_waypoint % count];
        memory.next_waypoint = (memory.next_waypoint + 1) % count;
        request_destination(nav, id, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::NpcId;
    use crate::navigation::StraightLineNavigator;
    use crate::npc::Archetype;
    use crate::player::PlayerView;
    use glam::Vec3;
    use rand::SeedableRng;

    #[test]
    fn test_patrol_cycles_waypoints() {
        let config = SimulationConfig::default();
        let waypoints = vec![Vec3::new(5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 5.0)];
        let mut npc = Npc::new(NpcId(1), Archetype::Guard, Vec3::ZERO, Vec3::Z);
        if let ArchetypeMemory::Guard(memory) = &mut npc.memory {
            memory.waypoints = waypoints.clone();
        }
        npc.init(&config);

        let mut nav = StraightLineNavigator::new();
        nav.register(npc.id, Vec3::ZERO);
        let player = PlayerView::at(Vec3::new(100.0, 0.0, 100.0));
        let ctx = PolicyContext {
            config: &config,
            player: &player,
            dt: 1.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut out = Outbox::new();

        run(&mut npc, GuardBehavior::Patrol, &mut nav, &ctx, &mut rng, &mut out);
        assert_eq!(nav.destination(npc.id), Some(waypoints[0]));
        assert_eq!(nav.speed(npc.id), Some(npc.profile.normal_speed));

        // Far from the waypoint: keep going
        run(&mut npc, GuardBehavior::Patrol, &mut nav, &ctx, &mut rng, &mut out);
        assert_eq!(nav.destination(npc.id), Some(waypoints[0]));

        nav.teleport(npc.id, waypoints[0]);
        run(&mut npc, GuardBehavior::Patrol, &mut nav, &ctx, &mut rng, &mut out);
        assert_eq!(nav.destination(npc.id), Some(waypoints[1]));

        nav.teleport(npc.id, waypoints[1]);
        run(&mut npc, GuardBehavior::Patrol, &mut nav, &ctx, &mut rng, &mut out);
        assert_eq!(nav.destination(npc.id), Some(waypoints[0]));
    }
}
