//! Neighbor perception.
//!
//! An agent perceives every other non-predator agent strictly closer than
//! `vision_distance` and inside its field of view. Perceived agents are
//! ranked by distance with a stable sort, so equal distances keep
//! population order.
//!
//! Two views of the same ranking are used by the steering rules:
//!
//! - [`Neighborhood::in_range`] - every perceived agent, for separation
//! - [`Neighborhood::partners`] - the closest `num_interaction_partners`,
//!   for alignment and cohesion
//!
//! The scan is a plain O(n) pass over the snapshot.

use crate::agent::{Agent, Role};
use crate::config::FlockConfig;
use crate::kinematics::normalize_angle;
use std::f32::consts::{PI, TAU};

/// A perceived agent: its index in the snapshot and its distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f32,
}

/// Perception parameters taken from a [`FlockConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeighborQuery {
    pub vision_distance: f32,
    pub fov: f32,
    pub limit: usize,
}

impl NeighborQuery {
    pub fn from_config(config: &FlockConfig) -> Self {
        Self {
            vision_distance: config.vision_distance,
            fov: config.fov,
            limit: config.num_interaction_partners,
        }
    }

    /// Field-of-view test from `observer` toward `target`.
    ///
    /// The bearing is compared with the observer's heading; the target is
    /// visible when the smaller angular difference is at most `fov / 2`.
    pub fn can_see(&self, observer: &Agent, target: &Agent) -> bool {
        if self.fov >= TAU {
            return true;
        }
        let offset = target.position - observer.position;
        let bearing = normalize_angle(offset.y.atan2(offset.x));
        let diff = (bearing - observer.heading).abs();
        let diff = if diff > PI { TAU - diff } else { diff };
        diff <= self.fov / 2.0
    }

    /// Rank candidates by distance, uncapped.
    pub fn scan<'a, I>(&self, observer: &Agent, candidates: I) -> Vec<Neighbor>
    where
        I: IntoIterator<Item = (usize, &'a Agent)>,
    {
        let mut found: Vec<Neighbor> = candidates
            .into_iter()
            .filter_map(|(index, other)| {
                let distance = observer.distance(other);
                (distance < self.vision_distance && self.can_see(observer, other))
                    .then_some(Neighbor { index, distance })
            })
            .collect();
        // sort_by is stable: ties keep candidate order
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        found
    }

    /// Rank candidates by distance and keep at most `limit`.
    pub fn query<'a, I>(&self, observer: &Agent, candidates: I) -> Vec<Neighbor>
    where
        I: IntoIterator<Item = (usize, &'a Agent)>,
    {
        let mut found = self.scan(observer, candidates);
        found.truncate(self.limit);
        found
    }

    /// Everything agent `index` perceives in `snapshot`, excluding itself and
    /// predators.
    pub fn neighborhood(&self, index: usize, snapshot: &[Agent]) -> Neighborhood {
        let Some(observer) = snapshot.get(index) else {
            return Neighborhood::empty();
        };
        let candidates = snapshot
            .iter()
            .enumerate()
            .filter(|(i, other)| *i != index && other.role != Role::Predator);
        Neighborhood {
            in_range: self.scan(observer, candidates),
            limit: self.limit,
        }
    }
}

/// The ranked neighbors of one agent for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Neighborhood {
    in_range: Vec<Neighbor>,
    limit: usize,
}

impl Neighborhood {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.in_range.is_empty()
    }

    /// Every perceived agent, nearest first.
    #[inline]
    pub fn in_range(&self) -> &[Neighbor] {
        &self.in_range
    }

    /// The nearest `num_interaction_partners` perceived agents.
    #[inline]
    pub fn partners(&self) -> &[Neighbor] {
        &self.in_range[..self.limit.min(self.in_range.len())]
    }
}
