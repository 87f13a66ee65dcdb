//! Leader-weighted averages over a set of agents.
//!
//! Leaders count `leader_weight` times, everyone else once. Headings are
//! averaged as unit vectors (a circular mean) so that 350° and 10° average
//! to 0° rather than 180°.

use crate::agent::{Agent, Role};
use crate::kinematics::normalize_angle;
use glam::Vec2;

/// Weighted mean calculator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedAverage {
    pub leader_weight: f32,
}

impl WeightedAverage {
    pub fn new(leader_weight: f32) -> Self {
        Self { leader_weight }
    }

    /// Averaging weight of one agent.
    #[inline]
    pub fn weight(&self, agent: &Agent) -> f32 {
        match agent.role {
            Role::Leader => self.leader_weight,
            _ => 1.0,
        }
    }

    /// Weighted mean position, or `None` for an empty set.
    pub fn position<'a>(&self, agents: impl IntoIterator<Item = &'a Agent>) -> Option<Vec2> {
        let (sum, total) = agents
            .into_iter()
            .fold((Vec2::ZERO, 0.0), |(sum, total), agent| {
                let w = self.weight(agent);
                (sum + agent.position * w, total + w)
            });
        (total > 0.0).then(|| sum / total)
    }

    /// Weighted circular mean heading in `[0, 2π)`.
    ///
    /// `None` for an empty set or when the headings cancel out.
    pub fn heading<'a>(&self, agents: impl IntoIterator<Item = &'a Agent>) -> Option<f32> {
        let resultant = agents.into_iter().fold(Vec2::ZERO, |sum, agent| {
            sum + Vec2::from_angle(agent.heading) * self.weight(agent)
        });
        if resultant.length_squared() <= 1e-10 {
            return None;
        }
        Some(normalize_angle(resultant.y.atan2(resultant.x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn at(x: f32, y: f32) -> Agent {
        Agent::new(Vec2::new(x, y), 0.0, 1.0)
    }

    #[test]
    fn test_leader_counts_leader_weight_times() {
        // sum of weights is count + W - 1 = 3 + 10 - 1
        let agents = [
            at(0.0, 0.0),
            at(10.0, 0.0),
            at(0.0, 0.0).role(Role::Leader),
        ];
        let mean = WeightedAverage::new(10.0).position(&agents).unwrap();
        assert_relative_eq!(mean.x, 10.0 / 12.0, epsilon = 1e-5);
        assert_relative_eq!(mean.y, 0.0);
    }

    #[test]
    fn test_without_leader_is_plain_mean() {
        let agents = [at(0.0, 0.0), at(10.0, 20.0)];
        let mean = WeightedAverage::new(10.0).position(&agents).unwrap();
        assert_eq!(mean, Vec2::new(5.0, 10.0));
    }

    #[test]
    fn test_predators_weigh_one() {
        let predator = at(0.0, 0.0).role(Role::Predator);
        assert_eq!(WeightedAverage::new(10.0).weight(&predator), 1.0);
    }

    #[test]
    fn test_empty_set_has_no_mean() {
        let avg = WeightedAverage::new(5.0);
        let none: [Agent; 0] = [];
        assert!(avg.position(&none).is_none());
        assert!(avg.heading(&none).is_none());
    }

    #[test]
    fn test_equal_headings_average_to_themselves() {
        for heading in [0.0, 1.0, PI, 5.5] {
            let agents: Vec<_> = (0..4)
                .map(|i| Agent::new(Vec2::new(i as f32, 0.0), heading, 1.0))
                .collect();
            let mean = WeightedAverage::new(5.0).heading(&agents).unwrap();
            assert_relative_eq!(mean, heading, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_heading_mean_wraps() {
        let agents = [
            Agent::new(Vec2::ZERO, 0.1, 1.0),
            Agent::new(Vec2::ZERO, 2.0 * PI - 0.1, 1.0),
        ];
        let mean = WeightedAverage::new(5.0).heading(&agents).unwrap();
        assert!(mean < 1e-4 || mean > 2.0 * PI - 1e-4);
    }

    #[test]
    fn test_leader_pulls_heading() {
        let agents = [
            Agent::new(Vec2::ZERO, 0.0, 1.0),
            Agent::new(Vec2::ZERO, PI / 2.0, 1.0).role(Role::Leader),
        ];
        let mean = WeightedAverage::new(10.0).heading(&agents).unwrap();
        assert_relative_eq!(mean, 10.0f32.atan2(1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_opposite_headings_cancel() {
        let agents = [
            Agent::new(Vec2::ZERO, 0.0, 1.0),
            Agent::new(Vec2::ZERO, PI, 1.0),
        ];
        assert!(WeightedAverage::new(5.0).heading(&agents).is_none());
    }
}
