//! Ready-made flocks.
//!
//! Each [`Scenario`] is a configuration preset plus an initial population.
//! They share one engine and differ only in constants, motion model and
//! pipeline:
//!
//! | Scenario | Motion | Special agents | Notes |
//! |----------|--------|----------------|-------|
//! | `Plain` | heading | none | classic boids |
//! | `LeaderFollow` | heading | stationary leader | leader weight 5 |
//! | `Drift` | velocity | drifting leader | max speed 4, 7 partners |
//! | `PredatorAvoid` | heading | falcon predator | center attraction, catch rule |
//! | `Factions` | heading | none | three teams, 180° field of view |

use crate::agent::{Agent, Role};
use crate::config::{FactionProfile, FlockConfig};
use crate::draw::palette;
use crate::kinematics::Motion;
use crate::pipeline::Pipeline;
use crate::rules::Rule;
use crate::simulation::Simulation;
use crate::Faction;
use clap::ValueEnum;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Follower count used by the runner when none is given.
pub const DEFAULT_AGENTS: u32 = 30;

/// Where leaders and predators start.
const SPECIAL_START: Vec2 = Vec2::new(500.0, 500.0);

/// Teams of the [`Scenario::Factions`] preset.
#[derive(Faction, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flight {
    #[rgb(0, 0, 255)]
    Blue,
    #[rgb(255, 255, 255)]
    White,
    #[rgb(255, 0, 255)]
    Purple,
}

/// Built-in flock presets.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// One faction, no leader, no predator.
    #[default]
    Plain,
    /// Followers gather around a heavy, keyboard-steered leader.
    LeaderFollow,
    /// Velocity-driven flock trailing an accelerating leader.
    Drift,
    /// Sparrows flee a falcon and get caught on contact.
    PredatorAvoid,
    /// Three teams that only align with their own.
    Factions,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Plain,
        Scenario::LeaderFollow,
        Scenario::Drift,
        Scenario::PredatorAvoid,
        Scenario::Factions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Plain => "plain",
            Scenario::LeaderFollow => "leader-follow",
            Scenario::Drift => "drift",
            Scenario::PredatorAvoid => "predator-avoid",
            Scenario::Factions => "factions",
        }
    }

    /// The preset's configuration.
    pub fn config(&self) -> FlockConfig {
        let heading = FlockConfig {
            motion: Motion::Heading,
            vision_distance: 150.0,
            min_neighbor_distance: 20.0,
            min_wall_distance: 20.0,
            leader_weight: 5.0,
            sep_force: 0.4,
            wall_sep_force: 0.2,
            align_force: 0.1,
            cohesive_force: 0.1,
            num_interaction_partners: 10,
            factions: vec![FactionProfile::new(0, 3.0, 4.0)
                .with_color(palette::RED)
                .with_size(10.0)],
            pipeline: Pipeline::standard(),
            ..FlockConfig::default()
        };

        let sparrows = FlockConfig {
            vision_distance: 300.0,
            min_neighbor_distance: 20.0,
            min_antagonist_distance: 200.0,
            min_wall_distance: 40.0,
            leader_weight: 10.0,
            sep_force: 2.0,
            wall_sep_force: 4.0,
            align_force: 0.5,
            cohesive_force: 0.5,
            center_attraction: 0.5,
            pipeline: Pipeline::standard().with_rule(Rule::CenterAttraction {
                when_isolated: false,
            }),
            ..heading.clone()
        };

        match self {
            Scenario::Plain | Scenario::LeaderFollow => heading,
            Scenario::Drift => FlockConfig {
                motion: Motion::Velocity { max_speed: 4.0 },
                min_neighbor_distance: 40.0,
                min_wall_distance: 40.0,
                leader_weight: 10.0,
                sep_force: 0.1,
                wall_sep_force: 5.0,
                align_force: 0.9,
                cohesive_force: 0.9,
                num_interaction_partners: 7,
                factions: vec![FactionProfile::new(0, 2.0, 4.0)
                    .with_color(palette::RED)
                    .with_size(10.0)],
                ..heading
            },
            Scenario::PredatorAvoid => FlockConfig {
                factions: vec![FactionProfile::new(0, 2.5, 5.0)
                    .with_color(palette::PURPLE)
                    .with_size(10.0)],
                predator_catch: true,
                ..sparrows
            },
            Scenario::Factions => FlockConfig {
                fov: PI,
                factions: FactionProfile::palette(
                    &[Flight::Blue, Flight::White, Flight::Purple],
                    2.5,
                    4.0,
                ),
                ..sparrows
            },
        }
    }

    /// The preset with `count` followers.
    pub fn simulation(&self, count: u32) -> Simulation {
        self.simulation_with(self.config(), count)
    }

    /// The preset's population under a different configuration.
    pub fn simulation_with(&self, config: FlockConfig, count: u32) -> Simulation {
        let sim = Simulation::new()
            .with_config(config.clone())
            .with_agent_count(count);

        match self {
            Scenario::Plain => sim,
            Scenario::LeaderFollow => sim.with_agent(
                Agent::new(SPECIAL_START, 0.0, 0.0)
                    .role(Role::Leader)
                    .color(palette::GREEN)
                    .size(20.0),
            ),
            Scenario::Drift => {
                let cap = config
                    .factions
                    .first()
                    .map_or(2.0, |profile| profile.speed);
                sim.with_spawner(move |ctx| {
                    let profile = ctx.profile;
                    Agent::with_velocity(ctx.random_in_world(), ctx.random_velocity(cap))
                        .faction(profile.id)
                        .color(profile.color)
                        .size(profile.size)
                })
                .with_agent(
                    Agent::with_velocity(SPECIAL_START, Vec2::new(2.0, 0.0))
                        .role(Role::Leader)
                        .color(palette::GREEN)
                        .size(20.0),
                )
            }
            Scenario::PredatorAvoid => sim.with_agent(
                Agent::new(SPECIAL_START, 0.0, 5.0)
                    .role(Role::Predator)
                    .color(palette::GREEN)
                    .size(30.0),
            ),
            Scenario::Factions => {
                let teams = config.factions;
                sim.with_spawner(move |ctx| {
                    let slot = ctx.index as usize % teams.len().max(1);
                    match teams.get(slot) {
                        Some(profile) => ctx.member(profile),
                        None => ctx.follower(),
                    }
                })
            }
        }
    }
}
