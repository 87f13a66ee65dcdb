//! Steering rules.
//!
//! Rules decide how an agent turns each tick. They are applied in order to
//! the agent's [`Pilot`], each one nudging the pending heading (or velocity)
//! by a fixed magnitude taken from the [`FlockConfig`].
//!
//! # Rule Categories
//!
//! - **Environment**: WallAvoidance, PredatorAvoidance, CenterAttraction
//! - **Flocking** (neighbor): Separation, Alignment, Cohesion
//! - **Custom**: any type implementing [`Steer`]
//!
//! # Neighbor Rules
//!
//! Rules marked "(neighbor)" read the agent's [`Neighborhood`]. When the
//! neighborhood is empty the pipeline skips them for that tick.
//!
//! ```ignore
//! Simulation::new()
//!     .with_rule(Rule::WallAvoidance)
//!     .with_rule(Rule::Separation)
//!     .with_rule(Rule::Alignment)
//!     .with_rule(Rule::Cohesion)
//! ```

use crate::agent::{Agent, Role};
use crate::average::WeightedAverage;
use crate::config::FlockConfig;
use crate::kinematics::Pilot;
use crate::neighbors::Neighborhood;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What a rule can see while steering one agent.
///
/// Everything here is read from the tick's snapshot, never from agents
/// already updated this tick.
#[derive(Clone, Copy)]
pub struct SteerContext<'a> {
    /// Index of the steered agent in `snapshot`.
    pub index: usize,
    pub snapshot: &'a [Agent],
    pub neighborhood: &'a Neighborhood,
    pub config: &'a FlockConfig,
}

impl<'a> SteerContext<'a> {
    /// The steered agent as it was at the start of the tick.
    #[inline]
    pub fn agent(&self) -> &'a Agent {
        &self.snapshot[self.index]
    }

    /// Interaction partners in the steered agent's faction.
    pub fn teammates(&self) -> impl Iterator<Item = &'a Agent> + 'a {
        let snapshot = self.snapshot;
        let faction = self.agent().faction;
        self.neighborhood
            .partners()
            .iter()
            .map(move |n| &snapshot[n.index])
            .filter(move |other| other.faction == faction)
    }

    /// Every predator other than the steered agent.
    pub fn predators(&self) -> impl Iterator<Item = &'a Agent> + 'a {
        let index = self.index;
        self.snapshot
            .iter()
            .enumerate()
            .filter(move |(i, other)| *i != index && other.role == Role::Predator)
            .map(|(_, other)| other)
    }

    #[inline]
    pub fn average(&self) -> WeightedAverage {
        WeightedAverage::new(self.config.leader_weight)
    }
}

/// A steering behavior.
///
/// Implement this to add behaviors beyond the built-in [`Rule`]s and add them
/// with `Rule::Custom`:
///
/// ```ignore
/// #[derive(Debug)]
/// struct Wobble;
///
/// impl Steer for Wobble {
///     fn steer(&self, _ctx: &SteerContext, pilot: &mut Pilot) {
///         pilot.turn_right(0.1);
///     }
/// }
///
/// Simulation::new().with_rule(Rule::Custom(Arc::new(Wobble)))
/// ```
pub trait Steer: fmt::Debug + Send + Sync {
    /// Whether this behavior reads the neighborhood. Such behaviors are
    /// skipped when the neighborhood is empty.
    fn requires_neighbors(&self) -> bool {
        false
    }

    /// Adjust the pending heading or velocity of `ctx.agent()`.
    fn steer(&self, ctx: &SteerContext<'_>, pilot: &mut Pilot);
}

/// Built-in steering behaviors.
///
/// Rules run in the order they are added. Magnitudes come from the flock's
/// [`FlockConfig`]; each rule only decides direction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Turn away from nearby walls.
    ///
    /// On each axis, an agent within `min_wall_distance` of an edge turns away
    /// from the closest point on that edge at `wall_sep_force`. Both axes can
    /// fire in the same tick when the agent is in a corner.
    WallAvoidance,

    /// Flee predators.
    ///
    /// Every predator closer than `min_antagonist_distance` turns the agent
    /// away at `sep_force`. Predators are never neighbors, so this rule
    /// scans the snapshot directly.
    PredatorAvoidance,

    /// Separation: turn away from crowding neighbors. (neighbor)
    ///
    /// Every perceived neighbor closer than `min_neighbor_distance` turns the
    /// agent away at `sep_force`. Uses the full in-range list, not only the
    /// capped interaction partners.
    Separation,

    /// Alignment: match teammates' heading. (neighbor)
    ///
    /// Computes the leader-weighted circular mean heading of same-faction
    /// partners and turns toward it at `align_force`, the shorter way round.
    /// Skipped when no partner shares the faction.
    Alignment,

    /// Cohesion: move toward teammates. (neighbor)
    ///
    /// Turns toward the leader-weighted mean position of same-faction
    /// partners at `cohesive_force`.
    Cohesion,

    /// Drift toward the world center at `center_attraction`.
    ///
    /// # Fields
    ///
    /// - `when_isolated` - Also apply when the agent perceives nobody.
    ///   When `false` this behaves as a neighbor rule.
    CenterAttraction {
        #[serde(default)]
        when_isolated: bool,
    },

    /// User-defined behavior.
    ///
    /// Custom rules have no JSON form and are skipped by serialization.
    #[serde(skip)]
    Custom(Arc<dyn Steer>),
}

impl Rule {
    /// Returns `true` if this rule reads the neighborhood.
    pub fn requires_neighbors(&self) -> bool {
        match self {
            Rule::Separation | Rule::Alignment | Rule::Cohesion => true,
            Rule::CenterAttraction { when_isolated } => !when_isolated,
            Rule::Custom(custom) => custom.requires_neighbors(),
            Rule::WallAvoidance | Rule::PredatorAvoidance => false,
        }
    }

    /// Apply this rule to one agent.
    pub fn steer(&self, ctx: &SteerContext<'_>, pilot: &mut Pilot) {
        let config = ctx.config;
        match self {
            Rule::WallAvoidance => {
                let world = &config.world;
                let margin = config.min_wall_distance;
                let Vec2 { x, y } = pilot.position;
                let force = config.wall_sep_force;

                if x < margin {
                    pilot.turn_away(Vec2::new(0.0, y), force);
                } else if x > world.width - margin {
                    pilot.turn_away(Vec2::new(world.width, y), force);
                }
                if y < margin {
                    pilot.turn_away(Vec2::new(x, 0.0), force);
                } else if y > world.height - margin {
                    pilot.turn_away(Vec2::new(x, world.height), force);
                }
            }

            Rule::PredatorAvoidance => {
                let agent = ctx.agent();
                for predator in ctx.predators() {
                    if agent.distance(predator) < config.min_antagonist_distance {
                        pilot.turn_away(predator.position, config.sep_force);
                    }
                }
            }

            Rule::Separation => {
                for neighbor in ctx.neighborhood.in_range() {
                    if neighbor.distance < config.min_neighbor_distance {
                        let other = &ctx.snapshot[neighbor.index];
                        pilot.turn_away(other.position, config.sep_force);
                    }
                }
            }

            Rule::Alignment => {
                if let Some(heading) = ctx.average().heading(ctx.teammates()) {
                    pilot.align_with(heading, config.align_force);
                }
            }

            Rule::Cohesion => {
                if let Some(center) = ctx.average().position(ctx.teammates()) {
                    pilot.turn_toward(center, config.cohesive_force);
                }
            }

            Rule::CenterAttraction { .. } => {
                pilot.turn_toward(config.world.center(), config.center_attraction);
            }

            Rule::Custom(custom) => custom.steer(ctx, pilot),
        }
    }
}

impl Steer for Rule {
    fn requires_neighbors(&self) -> bool {
        Rule::requires_neighbors(self)
    }

    fn steer(&self, ctx: &SteerContext<'_>, pilot: &mut Pilot) {
        Rule::steer(self, ctx, pilot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::FactionId;
    use crate::kinematics::{Motion, DEFAULT_TURN_RATE};
    use crate::neighbors::NeighborQuery;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn at(x: f32, y: f32, heading: f32) -> Agent {
        Agent::new(Vec2::new(x, y), heading, 2.0)
    }

    fn steer_one(rule: &Rule, snapshot: &[Agent], index: usize, config: &FlockConfig) -> Pilot {
        let neighborhood = NeighborQuery::from_config(config).neighborhood(index, snapshot);
        let ctx = SteerContext {
            index,
            snapshot,
            neighborhood: &neighborhood,
            config,
        };
        let agent = &snapshot[index];
        let mut pilot = Pilot::new(agent, config.motion_for(agent.faction), config.turn_rate);
        rule.steer(&ctx, &mut pilot);
        pilot
    }

    // ========== Environment Rules ==========

    #[test]
    fn test_wall_avoidance_left_edge() {
        let config = FlockConfig::default();
        let snapshot = [at(5.0, 400.0, PI - 0.1)];
        let pilot = steer_one(&Rule::WallAvoidance, &snapshot, 0, &config);

        let before = Vec2::from_angle(snapshot[0].heading).x;
        assert!(pilot.facing().x > before);
        assert_relative_eq!(
            (pilot.heading - snapshot[0].heading).abs(),
            config.wall_sep_force * DEFAULT_TURN_RATE,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_wall_avoidance_corner_fires_twice() {
        let config = FlockConfig::default();
        // facing up into the top-left corner: both walls turn it right
        let snapshot = [at(15.0, 15.0, 1.5 * PI)];
        let pilot = steer_one(&Rule::WallAvoidance, &snapshot, 0, &config);

        let single = config.wall_sep_force * DEFAULT_TURN_RATE;
        assert_relative_eq!(
            pilot.heading - snapshot[0].heading,
            2.0 * single,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_wall_avoidance_ignores_interior() {
        let config = FlockConfig::default();
        let snapshot = [at(500.0, 400.0, 1.0)];
        let pilot = steer_one(&Rule::WallAvoidance, &snapshot, 0, &config);
        assert_eq!(pilot.heading, 1.0);
    }

    #[test]
    fn test_predator_avoidance() {
        let config = FlockConfig::default();
        // predator directly below (screen right of an east-facing agent)
        let snapshot = [
            at(500.0, 400.0, 0.0),
            at(520.0, 450.0, PI).role(Role::Predator),
        ];
        let pilot = steer_one(&Rule::PredatorAvoidance, &snapshot, 0, &config);
        assert_relative_eq!(pilot.heading, -config.sep_force * DEFAULT_TURN_RATE);
    }

    #[test]
    fn test_predator_out_of_range_is_ignored() {
        let config = FlockConfig::default();
        let snapshot = [
            at(100.0, 400.0, 0.0),
            at(900.0, 400.0, PI).role(Role::Predator),
        ];
        let pilot = steer_one(&Rule::PredatorAvoidance, &snapshot, 0, &config);
        assert_eq!(pilot.heading, 0.0);
    }

    #[test]
    fn test_center_attraction() {
        let config = FlockConfig::default();
        // center (512, 400) is below an east-facing agent at the top
        let snapshot = [at(300.0, 100.0, 0.0)];
        let rule = Rule::CenterAttraction {
            when_isolated: true,
        };
        let pilot = steer_one(&rule, &snapshot, 0, &config);
        assert!(pilot.heading > 0.0);
    }

    // ========== Flocking Rules ==========

    #[test]
    fn test_separation_turns_both_apart() {
        let config = FlockConfig::default();
        let snapshot = [at(500.0, 400.0, 0.0), at(500.0, 410.0, 0.0)];

        let upper = steer_one(&Rule::Separation, &snapshot, 0, &config);
        let lower = steer_one(&Rule::Separation, &snapshot, 1, &config);

        // upper turns toward -y, lower toward +y
        assert!(upper.heading < 0.0);
        assert!(lower.heading > 0.0);
    }

    #[test]
    fn test_separation_uses_uncapped_list() {
        let config = FlockConfig {
            num_interaction_partners: 1,
            ..FlockConfig::default()
        };
        // both close neighbors sit below; only one is a partner
        let snapshot = [
            at(500.0, 400.0, 0.0),
            at(505.0, 410.0, 0.0),
            at(495.0, 412.0, 0.0),
        ];
        let pilot = steer_one(&Rule::Separation, &snapshot, 0, &config);
        assert_relative_eq!(
            pilot.heading,
            -2.0 * config.sep_force * DEFAULT_TURN_RATE,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_alignment_turns_toward_teammates() {
        let config = FlockConfig::default();
        let snapshot = [
            at(500.0, 400.0, 0.0),
            at(540.0, 400.0, 1.0),
            at(540.0, 440.0, 1.2),
        ];
        let pilot = steer_one(&Rule::Alignment, &snapshot, 0, &config);
        assert_relative_eq!(pilot.heading, config.align_force * DEFAULT_TURN_RATE);
    }

    #[test]
    fn test_alignment_ignores_other_factions() {
        let config = FlockConfig::default();
        let snapshot = [
            at(500.0, 400.0, 0.0),
            at(540.0, 400.0, 1.0).faction(FactionId(2)),
        ];
        let pilot = steer_one(&Rule::Alignment, &snapshot, 0, &config);
        assert_eq!(pilot.heading, 0.0);
    }

    #[test]
    fn test_cohesion_turns_toward_weighted_center() {
        let config = FlockConfig::default();
        // ordinary mate above, heavier leader below: the mean lies below
        let snapshot = [
            at(500.0, 400.0, 0.0),
            at(560.0, 360.0, 0.0),
            at(560.0, 430.0, 0.0).role(Role::Leader),
        ];
        let pilot = steer_one(&Rule::Cohesion, &snapshot, 0, &config);
        assert_relative_eq!(pilot.heading, config.cohesive_force * DEFAULT_TURN_RATE);
    }

    #[test]
    fn test_velocity_cohesion_pushes() {
        let config = FlockConfig {
            motion: Motion::Velocity { max_speed: 4.0 },
            ..FlockConfig::default()
        };
        let snapshot = [
            Agent::with_velocity(Vec2::new(500.0, 400.0), Vec2::ZERO),
            Agent::with_velocity(Vec2::new(600.0, 400.0), Vec2::ZERO),
        ];
        let pilot = steer_one(&Rule::Cohesion, &snapshot, 0, &config);
        assert_relative_eq!(pilot.velocity.x, config.cohesive_force);
        assert_relative_eq!(pilot.velocity.y, 0.0);
    }

    // ========== Custom Rules ==========

    #[derive(Debug)]
    struct Spin;

    impl Steer for Spin {
        fn steer(&self, _ctx: &SteerContext<'_>, pilot: &mut Pilot) {
            pilot.turn_right(1.0);
        }
    }

    #[test]
    fn test_custom_rule() {
        let config = FlockConfig::default();
        let snapshot = [at(500.0, 400.0, 0.0)];
        let rule = Rule::Custom(Arc::new(Spin));
        let pilot = steer_one(&rule, &snapshot, 0, &config);

        assert!(!rule.requires_neighbors());
        assert_relative_eq!(pilot.heading, DEFAULT_TURN_RATE);
    }

    // ========== Rule Properties ==========

    #[test]
    fn test_requires_neighbors() {
        for rule in [Rule::Separation, Rule::Alignment, Rule::Cohesion] {
            assert!(rule.requires_neighbors(), "{:?}", rule);
        }
        for rule in [Rule::WallAvoidance, Rule::PredatorAvoidance] {
            assert!(!rule.requires_neighbors(), "{:?}", rule);
        }
        assert!(Rule::CenterAttraction {
            when_isolated: false
        }
        .requires_neighbors());
        assert!(!Rule::CenterAttraction {
            when_isolated: true
        }
        .requires_neighbors());
    }

    #[test]
    fn test_rule_json_names() {
        let json = serde_json::to_string(&Rule::PredatorAvoidance).unwrap();
        assert_eq!(json, r#"{"rule":"predator_avoidance"}"#);

        let rule: Rule = serde_json::from_str(r#"{"rule":"center_attraction"}"#).unwrap();
        assert!(matches!(
            rule,
            Rule::CenterAttraction {
                when_isolated: false
            }
        ));
    }
}
