//! The side test and the turn primitives built on it.
//!
//! Every directional decision in the pipeline ("turn toward P", "turn away
//! from P") goes through [`side_of`]: the sign of the 2D cross product of
//! the agent's facing with the offset to `P`. In screen coordinates (y
//! down) a negative sign puts `P` on the agent's left and a positive sign on
//! its right.
//!
//! Heading-driven pilots turn by a multiple of the turn rate. Velocity-driven
//! pilots are pushed along the unit offset instead.

use crate::kinematics::{normalize_angle, Motion, Pilot};
use glam::Vec2;
use std::f32::consts::TAU;

/// Which side of an agent's line of travel a point lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    /// Exactly on the line of travel (in front or behind).
    Ahead,
}

/// Side of the line through `origin` along `facing` that `point` lies on.
#[inline]
pub fn side_of(origin: Vec2, facing: Vec2, point: Vec2) -> Side {
    let cross = facing.perp_dot(point - origin);
    if cross < 0.0 {
        Side::Left
    } else if cross > 0.0 {
        Side::Right
    } else {
        Side::Ahead
    }
}

impl Pilot {
    /// Side of this pilot's line of travel that `point` lies on.
    #[inline]
    pub fn side(&self, point: Vec2) -> Side {
        side_of(self.position, self.facing(), point)
    }

    /// Steer toward `point` by `magnitude`.
    ///
    /// A point dead ahead needs no turn.
    pub fn turn_toward(&mut self, point: Vec2, magnitude: f32) {
        match self.motion() {
            Motion::Heading => match self.side(point) {
                Side::Left => self.turn_left(magnitude),
                Side::Right => self.turn_right(magnitude),
                Side::Ahead => {}
            },
            Motion::Velocity { .. } => {
                self.push((point - self.position).normalize_or_zero() * magnitude);
            }
        }
    }

    /// Steer away from `point` by `magnitude`.
    ///
    /// A point on the line of travel turns the pilot left.
    pub fn turn_away(&mut self, point: Vec2, magnitude: f32) {
        match self.motion() {
            Motion::Heading => match self.side(point) {
                Side::Left => self.turn_right(magnitude),
                Side::Right | Side::Ahead => self.turn_left(magnitude),
            },
            Motion::Velocity { .. } => {
                self.push((self.position - point).normalize_or_zero() * magnitude);
            }
        }
    }

    /// Steer toward `target` heading by `magnitude`.
    ///
    /// Heading-driven pilots turn the shorter way round and hold still when
    /// both ways are equal. Velocity-driven pilots are pushed along `target`.
    pub fn align_with(&mut self, target: f32, magnitude: f32) {
        match self.motion() {
            Motion::Heading => {
                let current = normalize_angle(self.heading);
                let right = (target - current).rem_euclid(TAU);
                let left = (current - target).rem_euclid(TAU);
                if right < left {
                    self.turn_right(magnitude);
                } else if left < right {
                    self.turn_left(magnitude);
                }
            }
            Motion::Velocity { .. } => {
                self.push(Vec2::from_angle(target) * magnitude);
            }
        }
    }
}
