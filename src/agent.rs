//! Agents and their identifying tags.
//!
//! An [`Agent`] is one boid: a position, a facing and a speed, plus the
//! tags that decide who it flocks with ([`FactionId`]) and how others treat
//! it ([`Role`]).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Team tag restricting alignment and cohesion to teammates.
///
/// Usually produced from an enum with `#[derive(Faction)]`:
///
/// ```ignore
/// let tag: FactionId = Team::Sparrows.into();
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FactionId(pub u32);

impl From<u32> for FactionId {
    fn from(value: u32) -> Self {
        FactionId(value)
    }
}

/// How an agent takes part in the flock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Runs the steering pipeline every tick.
    #[default]
    Normal,
    /// Counts `leader_weight` times in its teammates' averages.
    /// Steered by commands instead of the pipeline.
    Leader,
    /// Never a flocking neighbor; others flee it. Steered by commands.
    Predator,
}

impl Role {
    /// Whether agents with this role run the steering pipeline.
    #[inline]
    pub fn is_autonomous(self) -> bool {
        matches!(self, Role::Normal)
    }

    /// Whether agents with this role can receive steering commands.
    #[inline]
    pub fn is_controllable(self) -> bool {
        matches!(self, Role::Leader | Role::Predator)
    }
}

/// A single simulated boid.
///
/// `velocity` is kept in sync with `heading` and `speed` by the kinematics
/// (see [`Motion`](crate::Motion)); set it through the builder methods
/// rather than by hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    /// World position (screen convention, y grows downward).
    pub position: Vec2,
    /// Facing in radians, in `[0, 2π)` after every tick.
    pub heading: f32,
    /// Non-negative scalar speed.
    pub speed: f32,
    /// Displacement applied per tick.
    pub velocity: Vec2,
    /// Team tag.
    pub faction: FactionId,
    /// Normal, leader or predator.
    pub role: Role,
    /// Cleared when caught by a predator. Invisible agents still move and
    /// are still perceived.
    pub visible: bool,
    /// Draw color, RGB in 0-1.
    pub color: [f32; 3],
    /// Sprite width in world units.
    pub size: f32,
}

impl Agent {
    /// Create a normal, visible agent moving along `heading` at `speed`.
    pub fn new(position: Vec2, heading: f32, speed: f32) -> Self {
        let speed = speed.max(0.0);
        Self {
            position,
            heading: crate::kinematics::normalize_angle(heading),
            speed,
            velocity: Vec2::from_angle(heading) * speed,
            faction: FactionId::default(),
            role: Role::Normal,
            visible: true,
            color: [1.0, 1.0, 1.0],
            size: 10.0,
        }
    }

    /// Create an agent from an explicit velocity (velocity-driven motion).
    ///
    /// Heading follows the velocity; a zero velocity faces heading 0.
    pub fn with_velocity(position: Vec2, velocity: Vec2) -> Self {
        let heading = if velocity.length_squared() > 0.0 {
            velocity.y.atan2(velocity.x)
        } else {
            0.0
        };
        Self {
            velocity,
            ..Self::new(position, heading, velocity.length())
        }
    }

    /// Set the faction tag.
    pub fn faction(mut self, faction: impl Into<FactionId>) -> Self {
        self.faction = faction.into();
        self
    }

    /// Set the role.
    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set the draw color.
    pub fn color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    /// Set the sprite size.
    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Euclidean distance between two agents.
    #[inline]
    pub fn distance(&self, other: &Agent) -> f32 {
        self.position.distance(other.position)
    }

    /// Whether the two sprites overlap (distance below the sum of half sizes).
    pub fn is_touching(&self, other: &Agent) -> bool {
        self.distance(other) < self.size / 2.0 + other.size / 2.0
    }

    /// Unit direction of travel. A stationary agent points along its
    /// heading.
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.velocity
            .try_normalize()
            .unwrap_or_else(|| Vec2::from_angle(self.heading))
    }
}
