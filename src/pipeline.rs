//! The ordered list of steering rules run for every normal agent.

use crate::agent::Agent;
use crate::config::FlockConfig;
use crate::kinematics::Pilot;
use crate::neighbors::{NeighborQuery, Neighborhood};
use crate::rules::{Rule, SteerContext};
use serde::{Deserialize, Serialize};

/// Ordered steering rules.
///
/// Serialized as a plain JSON array of rules.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    rules: Vec<Rule>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Pipeline {
    /// An empty pipeline. Agents running it only integrate.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Wall avoidance, predator avoidance, separation, alignment, cohesion.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                Rule::WallAvoidance,
                Rule::PredatorAvoidance,
                Rule::Separation,
                Rule::Alignment,
                Rule::Cohesion,
            ],
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether any rule reads the neighborhood.
    pub fn requires_neighbors(&self) -> bool {
        self.rules.iter().any(Rule::requires_neighbors)
    }

    /// Run every rule for agent `index` against `snapshot` and return its
    /// pending state.
    ///
    /// The neighborhood is computed once, before the first rule. Neighbor
    /// rules are skipped when it is empty.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds for `snapshot`.
    pub fn run(
        &self,
        index: usize,
        snapshot: &[Agent],
        config: &FlockConfig,
        query: &NeighborQuery,
    ) -> Pilot {
        let agent = &snapshot[index];
        let mut pilot = Pilot::new(agent, config.motion_for(agent.faction), config.turn_rate);

        let neighborhood = if self.requires_neighbors() {
            query.neighborhood(index, snapshot)
        } else {
            Neighborhood::empty()
        };

        let ctx = SteerContext {
            index,
            snapshot,
            neighborhood: &neighborhood,
            config,
        };

        for rule in &self.rules {
            if rule.requires_neighbors() && neighborhood.is_empty() {
                continue;
            }
            rule.steer(&ctx, &mut pilot);
        }

        log::trace!(
            "agent {}: {} neighbors, heading {:.3} -> {:.3}",
            index,
            neighborhood.in_range().len(),
            agent.heading,
            pilot.heading
        );

        pilot
    }
}
