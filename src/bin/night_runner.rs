//! Headless Night Runner
//!
//! Loads a town roster, walks a scripted player through it and prints a
//! summary of how the town reacted.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use nocturne::core::config::SimulationConfig;
use nocturne::core::error::Result;
use nocturne::navigation::StraightLineNavigator;
use nocturne::player::{PlayerEffect, PlayerView};
use nocturne::session::{NightSession, Roster};
use nocturne::spatial::occlusion::StaticScene;

/// Headless Night Runner - scripted player walk through a town
#[derive(Parser, Debug)]
#[command(name = "night_runner")]
#[command(about = "Run one night with a scripted player and print the town's reaction")]
struct Args {
    /// Roster file
    #[arg(long, default_value = "data/town.toml")]
    roster: PathBuf,

    /// Optional simulation config override
    #[arg(long)]
    config: Option<PathBuf>,

    /// Night index in the roster
    #[arg(long, default_value_t = 0)]
    night: usize,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Player path as x,z pairs; the player walks it back and forth
    #[arg(long, value_delimiter = ';', default_value = "0,-20;0,20")]
    path: Vec<String>,

    /// Player walking speed
    #[arg(long, default_value_t = 1.5)]
    speed: f32,

    /// Player sprints the whole way
    #[arg(long)]
    sprint: bool,

    /// Player walks lit streets
    #[arg(long)]
    lit: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

#[derive(Serialize)]
struct NpcSummary {
    id: u32,
    archetype: String,
    alertness: u8,
    state: String,
    in_home: bool,
}

#[derive(Serialize)]
struct NightSummary {
    seed: u64,
    ticks: u64,
    sunrise: bool,
    town_awareness: u8,
    peak_awareness: u8,
    alarms_raised: usize,
    damage_taken: i32,
    cloak_reveals: usize,
    decoys_destroyed: usize,
    npcs: Vec<NpcSummary>,
}

/// Back-and-forth walk along a polyline
struct ScriptedPlayer {
    points: Vec<Vec3>,
    target: usize,
    step: i64,
    position: Vec3,
}

impl ScriptedPlayer {
    fn new(points: Vec<Vec3>) -> Self {
        let position = points.first().copied().unwrap_or(Vec3::ZERO);
        Self {
            target: 1.min(points.len().saturating_sub(1)),
            points,
            step: 1,
            position,
        }
    }

    fn advance(&mut self, distance: f32) -> Vec3 {
        if self.points.len() < 2 {
            return Vec3::Z;
        }
        let goal = self.points[self.target];
        let to_goal = goal - self.position;
        let forward = to_goal.normalize_or_zero();

        if to_goal.length() <= distance {
            self.position = goal;
            let last = self.points.len() as i64 - 1;
            let next = self.target as i64 + self.step;
            if next < 0 || next > last {
                self.step = -self.step;
            }
            self.target = (self.target as i64 + self.step) as usize;
        } else {
            self.position += forward * distance;
        }
        forward
    }
}

fn parse_path(raw: &[String]) -> Vec<Vec3> {
    raw.iter()
        .filter_map(|pair| {
            let mut parts = pair.split(',').map(|p| p.trim().parse::<f32>());
            match (parts.next(), parts.next()) {
                (Some(Ok(x)), Some(Ok(z))) => Some(Vec3::new(x, 0.0, z)),
                _ => {
                    eprintln!("Warning: ignoring bad path point '{}'", pair);
                    None
                }
            }
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nocturne=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let roster = Roster::load(&args.roster)?;
    let scene = StaticScene::with_obstacles(roster.night(args.night)?.obstacles.clone());

    let mut session = NightSession::new(config, roster, StraightLineNavigator::new(), scene, seed)?;
    session.begin_night(args.night)?;

    let mut walker = ScriptedPlayer::new(parse_path(&args.path));
    let mut player = PlayerView::at(walker.position);
    player.sprinting = args.sprint;
    player.in_light = args.lit;
    let walk_speed = if args.sprint { args.speed * 2.0 } else { args.speed };

    let mut summary = NightSummary {
        seed,
        ticks: 0,
        sunrise: false,
        town_awareness: 0,
        peak_awareness: 0,
        alarms_raised: 0,
        damage_taken: 0,
        cloak_reveals: 0,
        decoys_destroyed: 0,
        npcs: Vec::new(),
    };

    for _ in 0..args.ticks {
        player.forward = walker.advance(walk_speed * args.dt);
        player.position = walker.position;
        session.set_player(player);

        let report = session.tick(args.dt);
        summary.ticks = report.tick;
        summary.alarms_raised += report.alarms.len();
        for effect in &report.effects {
            match effect {
                PlayerEffect::Damage(amount) => summary.damage_taken += amount,
                PlayerEffect::RevealCloak => summary.cloak_reveals += 1,
                PlayerEffect::DestroyDecoy => summary.decoys_destroyed += 1,
            }
        }
        summary.peak_awareness = summary.peak_awareness.max(session.town_awareness());

        if report.sunrise {
            summary.sunrise = true;
            break;
        }
    }

    summary.town_awareness = session.town_awareness();
    summary.npcs = session
        .npcs()
        .iter()
        .map(|npc| NpcSummary {
            id: npc.id.0,
            archetype: format!("{:?}", npc.archetype),
            alertness: npc.alertness(),
            state: format!("{:?}", npc.behavior_state),
            in_home: npc.in_home,
        })
        .collect();

    match args.format.as_str() {
        "text" => {
            println!("Night Summary");
            println!("=============");
            println!("Ticks: {} (sunrise: {})", summary.ticks, summary.sunrise);
            println!(
                "Town awareness: {} (peak {})",
                summary.town_awareness, summary.peak_awareness
            );
            println!("Alarms raised: {}", summary.alarms_raised);
            println!("Damage taken: {}", summary.damage_taken);
            println!();
            for npc in &summary.npcs {
                println!(
                    "  #{} {:<9} alertness={} state={}{}",
                    npc.id,
                    npc.archetype,
                    npc.alertness,
                    npc.state,
                    if npc.in_home { " (hiding)" } else { "" }
                );
            }
            println!();
            println!("Seed: {}", summary.seed);
        }
        other => {
            if other != "json" {
                eprintln!("Unknown format '{}', defaulting to json", other);
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
