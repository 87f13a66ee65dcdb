//! # Murmur - decentralized flocking
//!
//! Boids that see only their neighbors and still move as one.
//!
//! Murmur runs the per-agent decision loop of a flocking simulation: each
//! agent picks its nearest visible neighbors, feeds them through an ordered
//! pipeline of steering rules, and turns a little. Rendering and input stay
//! outside; the crate hands out [`DrawRecord`]s and takes [`Command`]s.
//!
//! ## Quick Start
//!
//! ```ignore
//! use murmur::prelude::*;
//!
//! fn main() -> Result<(), FlockError> {
//!     let mut flock = Simulation::new()
//!         .with_agent_count(30)
//!         .with_rule(Rule::WallAvoidance)
//!         .with_rule(Rule::Separation)
//!         .with_rule(Rule::Alignment)
//!         .with_rule(Rule::Cohesion)
//!         .build()?;
//!
//!     flock.run((), |tick, records: &[DrawRecord]| {
//!         // draw records here
//!     }, Some(1_000))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Agents
//!
//! An [`Agent`] has a position, heading, speed and velocity, plus a
//! [`FactionId`] and a [`Role`]. Normal agents steer themselves. Leaders
//! weigh more in their teammates' averages; predators are fled from. Both
//! are steered by [`Command`]s instead of the pipeline.
//!
//! ### Motion
//!
//! [`Motion::Heading`] turns the heading by multiples of the turn rate at a
//! fixed speed. [`Motion::Velocity`] pushes the velocity directly and caps
//! each component.
//!
//! ### Rules
//!
//! Rules run in order every tick for every normal agent:
//!
//! ```ignore
//! .with_rule(Rule::WallAvoidance)      // Environment
//! .with_rule(Rule::PredatorAvoidance)
//! .with_rule(Rule::Separation)         // Neighbor rules
//! .with_rule(Rule::Alignment)
//! .with_rule(Rule::Cohesion)
//! ```
//!
//! Neighbor rules are skipped for agents that perceive nobody.
//!
//! ### Factions
//!
//! Use the [`Faction`] derive for team tags:
//!
//! ```ignore
//! #[derive(Faction, Clone, Copy, PartialEq)]
//! enum Team {
//!     #[rgb(255, 0, 255)]
//!     Sparrows,
//!     #[rgb(0, 0, 255)]
//!     Jays,
//! }
//!
//! let sparrow = Agent::new(pos, heading, 2.5).faction(Team::Sparrows);
//! ```
//!
//! Alignment and cohesion only consider teammates.
//!
//! ## Feature Overview
//!
//! | Category | Items |
//! |----------|-------|
//! | Environment | [`Rule::WallAvoidance`], [`Rule::PredatorAvoidance`], [`Rule::CenterAttraction`] |
//! | Flocking | [`Rule::Separation`], [`Rule::Alignment`], [`Rule::Cohesion`] |
//! | Custom | [`Rule::Custom`] with any [`Steer`] |
//! | Control | [`CommandQueue`], [`Script`] |
//! | Presets | [`Scenario`] |

// lets the derive's `::murmur::` paths resolve inside this crate
extern crate self as murmur;

pub mod agent;
pub mod average;
pub mod config;
pub mod control;
pub mod draw;
pub mod error;
pub mod kinematics;
pub mod logging;
pub mod neighbors;
pub mod pipeline;
pub mod rules;
pub mod scenario;
mod simulation;
mod spawn;
pub mod stats;
pub mod steering;
pub mod time;

pub use agent::{Agent, FactionId, Role};
pub use average::WeightedAverage;
pub use bytemuck;
pub use config::{FactionProfile, FlockConfig, WorldBounds};
pub use control::{Command, CommandQueue, Controller, ScheduledCommand, Script};
pub use draw::{DrawRecord, Renderer};
pub use error::{CommandParseError, ConfigError, FlockError};
pub use glam::Vec2;
pub use kinematics::{Motion, Pilot};
pub use murmur_derive::Faction;
pub use neighbors::{Neighbor, NeighborQuery, Neighborhood};
pub use pipeline::Pipeline;
pub use rules::{Rule, Steer, SteerContext};
pub use scenario::Scenario;
pub use simulation::{Flock, FlockState, Simulation, TickSummary};
pub use spawn::SpawnContext;
pub use stats::FlockStats;
pub use steering::Side;

/// Trait automatically implemented by `#[derive(Faction)]`.
///
/// Gives each variant of a faction enum a display color and a name. The
/// derive also provides the conversions to and from [`FactionId`].
///
/// # Example
///
/// ```ignore
/// #[derive(Faction, Clone, Copy, PartialEq)]
/// enum Team {
///     #[rgb(0, 255, 0)]
///     Falcons,
///     Doves,           // white
/// }
///
/// assert_eq!(Team::Falcons.color(), [0.0, 1.0, 0.0]);
/// assert_eq!(Team::COUNT, 2);
/// ```
pub trait FactionKind {
    /// Number of variants.
    const COUNT: u32;

    /// Draw color from `#[rgb]`, RGB in 0-1.
    fn color(&self) -> [f32; 3];

    /// Variant name.
    fn name(&self) -> &'static str;
}

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use murmur::prelude::*;
/// ```
///
/// This imports:
/// - [`Simulation`], [`Flock`] - the builder and the running flock
/// - [`Rule`], [`Steer`] - steering behaviors
/// - [`Agent`], [`Role`], [`FactionId`] - the population
/// - [`Faction`] - derive macro for faction enums
/// - [`Command`] and the controllers
/// - [`Vec2`] - glam vector type
pub mod prelude {
    pub use crate::agent::{Agent, FactionId, Role};
    pub use crate::config::{FactionProfile, FlockConfig, WorldBounds};
    pub use crate::control::{Command, CommandQueue, Controller, Script};
    pub use crate::draw::{palette, DrawRecord, Renderer};
    pub use crate::error::FlockError;
    pub use crate::kinematics::{Motion, Pilot};
    pub use crate::rules::{Rule, Steer, SteerContext};
    pub use crate::scenario::Scenario;
    pub use crate::simulation::{Flock, FlockState, Simulation, TickSummary};
    pub use crate::spawn::SpawnContext;
    pub use crate::stats::FlockStats;
    pub use crate::time::Time;
    pub use crate::FactionKind;
    pub use crate::Vec2;
    pub use murmur_derive::Faction;
}
