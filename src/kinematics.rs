//! Agent motion: turning, pushing and the integration step.
//!
//! Two motion models share one code path, selected by [`Motion`]:
//!
//! - **Heading-driven**: steering rotates the heading in multiples of the
//!   turn rate and the velocity is recomputed as `speed · (cos, sin)(heading)`.
//! - **Velocity-driven**: steering pushes the velocity directly and each
//!   component is clamped to `[-max_speed, max_speed]`.
//!
//! During the compute phase steering writes into a [`Pilot`], the pending
//! state of one agent. The commit phase copies it back and calls
//! [`Agent::integrate`].
//!
//! Angles follow screen convention: y grows downward, so a positive turn
//! is clockwise on screen ("right").

use crate::agent::Agent;
use crate::config::WorldBounds;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Default angle turned per unit of steering magnitude.
pub const DEFAULT_TURN_RATE: f32 = PI / 16.0;

/// Motion model shared by every agent in a flock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Motion {
    /// Steering turns the heading; speed is fixed per agent.
    #[default]
    Heading,
    /// Steering pushes the velocity; components are clamped to `max_speed`.
    Velocity {
        /// Per-component speed cap.
        max_speed: f32,
    },
}

/// Wrap an angle into `[0, 2π)`. Non-finite input maps to 0.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative angles up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Clamp each velocity component to `[-max_speed, max_speed]`.
#[inline]
pub fn clamp_components(velocity: Vec2, max_speed: f32) -> Vec2 {
    velocity.clamp(Vec2::splat(-max_speed), Vec2::splat(max_speed))
}

/// Pending heading and velocity of one agent during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pilot {
    /// Position read from the snapshot. Steering never moves it.
    pub position: Vec2,
    /// Pending heading (may leave `[0, 2π)` until integration).
    pub heading: f32,
    /// Pending speed.
    pub speed: f32,
    /// Pending velocity.
    pub velocity: Vec2,
    motion: Motion,
    turn_rate: f32,
}

impl Pilot {
    /// Start from an agent's committed state.
    pub fn new(agent: &Agent, motion: Motion, turn_rate: f32) -> Self {
        Self {
            position: agent.position,
            heading: agent.heading,
            speed: agent.speed,
            velocity: agent.velocity,
            motion,
            turn_rate,
        }
    }

    /// The motion model this pilot steers with.
    #[inline]
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Direction used for side tests.
    ///
    /// Heading-driven agents always have a facing, even at zero speed.
    /// Velocity-driven agents face along their velocity, which may be zero.
    #[inline]
    pub fn facing(&self) -> Vec2 {
        match self.motion {
            Motion::Heading => Vec2::from_angle(self.heading),
            Motion::Velocity { .. } => self.velocity,
        }
    }

    /// Rotate by `delta` units of the turn rate. Positive turns right.
    pub fn turn(&mut self, delta: f32) {
        let angle = delta * self.turn_rate;
        self.heading += angle;
        match self.motion {
            Motion::Heading => {
                self.velocity = Vec2::from_angle(self.heading) * self.speed;
            }
            Motion::Velocity { .. } => {
                self.velocity = Vec2::from_angle(angle).rotate(self.velocity);
            }
        }
    }

    /// Turn left (counter-clockwise on screen) by `magnitude` units.
    #[inline]
    pub fn turn_left(&mut self, magnitude: f32) {
        self.turn(-magnitude);
    }

    /// Turn right (clockwise on screen) by `magnitude` units.
    #[inline]
    pub fn turn_right(&mut self, magnitude: f32) {
        self.turn(magnitude);
    }

    /// Add `delta` to the velocity.
    ///
    /// Velocity-driven: the sum is left unclamped until
    /// [`Agent::commit`], so the order of pushes does not matter. Heading-driven:
    /// speed is fixed, so the heading re-points along `velocity + delta`
    /// instead; a zero sum leaves the heading unchanged.
    pub fn push(&mut self, delta: Vec2) {
        match self.motion {
            Motion::Velocity { .. } => {
                self.velocity += delta;
            }
            Motion::Heading => {
                let target = self.velocity + delta;
                if target.length_squared() > f32::EPSILON {
                    self.heading = target.y.atan2(target.x);
                    self.velocity = Vec2::from_angle(self.heading) * self.speed;
                }
            }
        }
    }
}

impl Agent {
    /// Copy a pilot's pending heading and velocity into this agent.
    pub fn commit(&mut self, pilot: &Pilot) {
        self.heading = pilot.heading;
        self.speed = pilot.speed;
        self.velocity = match pilot.motion {
            Motion::Heading => pilot.velocity,
            Motion::Velocity { max_speed } => clamp_components(pilot.velocity, max_speed),
        };
    }

    /// Advance one tick: move by the velocity, clamp into the world and
    /// normalize the heading.
    ///
    /// Velocity-driven agents re-derive heading and speed from the velocity;
    /// a zero velocity keeps the previous heading.
    pub fn integrate(&mut self, motion: Motion, world: &WorldBounds) {
        self.position = world.clamp(self.position + self.velocity);

        if let Motion::Velocity { .. } = motion {
            self.speed = self.velocity.length();
            if self.speed > 0.0 {
                self.heading = self.velocity.y.atan2(self.velocity.x);
            }
        }
        self.heading = normalize_angle(self.heading);
    }
}
