//! Flock configuration.
//!
//! Every tunable constant lives in one [`FlockConfig`] value handed to the
//! [`Simulation`](crate::Simulation) builder. There is no global state: two
//! flocks with different configurations can run side by side.
//!
//! Configurations can be written in code, taken from a
//! [`Scenario`](crate::Scenario) preset, or loaded from JSON:
//!
//! ```ignore
//! let config = FlockConfig::from_path("presets/drift.json")?;
//! ```
//!
//! Missing JSON fields fall back to [`FlockConfig::default`].

use crate::agent::FactionId;
use crate::error::ConfigError;
use crate::kinematics::{Motion, DEFAULT_TURN_RATE};
use crate::pipeline::Pipeline;
use crate::FactionKind;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::path::Path;

/// Rectangular world `[0, width] × [0, height]` with a clamp margin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
    /// Agents are clamped to `[margin, dimension - margin]` on both axes.
    pub margin: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 800.0,
            margin: 10.0,
        }
    }
}

impl WorldBounds {
    /// Clamp a position into the playable area.
    #[inline]
    pub fn clamp(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x.clamp(self.margin, self.width - self.margin),
            position.y.clamp(self.margin, self.height - self.margin),
        )
    }

    /// World center.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether a position lies inside the clamped area.
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= self.margin
            && position.x <= self.width - self.margin
            && position.y >= self.margin
            && position.y <= self.height - self.margin
    }
}

/// Per-faction spawn and motion settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactionProfile {
    pub id: FactionId,
    /// Initial speed of spawned members.
    pub speed: f32,
    /// Velocity component cap in velocity-driven motion.
    pub max_speed: f32,
    /// Draw color, RGB in 0-1.
    pub color: [f32; 3],
    /// Sprite width.
    pub size: f32,
}

impl FactionProfile {
    pub fn new(id: impl Into<FactionId>, speed: f32, max_speed: f32) -> Self {
        Self {
            id: id.into(),
            speed,
            max_speed,
            color: [1.0, 1.0, 1.0],
            size: 10.0,
        }
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// One profile per variant of a `#[derive(Faction)]` enum, colored from
    /// its `#[rgb]` attributes.
    pub fn palette<F>(variants: &[F], speed: f32, max_speed: f32) -> Vec<Self>
    where
        F: FactionKind + Copy + Into<FactionId>,
    {
        variants
            .iter()
            .map(|&variant| Self::new(variant, speed, max_speed).with_color(variant.color()))
            .collect()
    }
}

/// The tunable constant table shared by every agent in a flock.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    pub world: WorldBounds,
    pub motion: Motion,
    /// Neighbors must be strictly closer than this to be perceived.
    pub vision_distance: f32,
    /// Separation fires for in-range neighbors closer than this.
    pub min_neighbor_distance: f32,
    /// Wall avoidance fires within this distance of an edge.
    pub min_wall_distance: f32,
    /// Predator avoidance fires within this distance of a predator.
    pub min_antagonist_distance: f32,
    /// Weight of a leader in averages. Ordinary agents weigh 1.
    pub leader_weight: f32,
    /// Field of view in radians. `2π` is omnidirectional.
    pub fov: f32,
    pub sep_force: f32,
    pub wall_sep_force: f32,
    pub align_force: f32,
    pub cohesive_force: f32,
    pub center_attraction: f32,
    /// Cap on the alignment/cohesion neighbor set.
    pub num_interaction_partners: usize,
    /// Radians turned per unit of steering magnitude (heading-driven).
    pub turn_rate: f32,
    pub factions: Vec<FactionProfile>,
    /// Mark normal agents invisible when they touch a predator.
    pub predator_catch: bool,
    pub pipeline: Pipeline,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            world: WorldBounds::default(),
            motion: Motion::Heading,
            vision_distance: 150.0,
            min_neighbor_distance: 20.0,
            min_wall_distance: 40.0,
            min_antagonist_distance: 200.0,
            leader_weight: 5.0,
            fov: TAU,
            sep_force: 0.4,
            wall_sep_force: 0.2,
            align_force: 0.1,
            cohesive_force: 0.1,
            center_attraction: 0.5,
            num_interaction_partners: 10,
            turn_rate: DEFAULT_TURN_RATE,
            factions: vec![FactionProfile::new(0, 3.0, 4.0)],
            predator_catch: false,
            pipeline: Pipeline::standard(),
        }
    }
}

impl FlockConfig {
    /// Check every value against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if !(world.width > 0.0 && world.height > 0.0) {
            return Err(ConfigError::Invalid("world dimensions must be positive"));
        }
        if !(world.margin >= 0.0)
            || world.margin * 2.0 >= world.width
            || world.margin * 2.0 >= world.height
        {
            return Err(ConfigError::Invalid("margin leaves no room inside the world"));
        }

        let distances = [
            self.vision_distance,
            self.min_neighbor_distance,
            self.min_wall_distance,
            self.min_antagonist_distance,
        ];
        if distances.iter().any(|d| !(*d >= 0.0)) {
            return Err(ConfigError::Invalid("distances must be non-negative"));
        }

        let forces = [
            self.sep_force,
            self.wall_sep_force,
            self.align_force,
            self.cohesive_force,
            self.center_attraction,
        ];
        if forces.iter().any(|f| !(*f >= 0.0)) {
            return Err(ConfigError::Invalid("forces must be non-negative"));
        }

        if self.num_interaction_partners == 0 {
            return Err(ConfigError::Invalid("num_interaction_partners must be at least 1"));
        }
        if !(self.turn_rate > 0.0) {
            return Err(ConfigError::Invalid("turn_rate must be positive"));
        }
        if !(self.fov > 0.0 && self.fov <= TAU) {
            return Err(ConfigError::Invalid("fov must be in (0, 2π]"));
        }
        if !(self.leader_weight >= 1.0) {
            return Err(ConfigError::Invalid("leader_weight must be at least 1"));
        }
        if let Motion::Velocity { max_speed } = self.motion {
            if !(max_speed > 0.0) {
                return Err(ConfigError::Invalid("max_speed must be positive"));
            }
        }

        for profile in &self.factions {
            if !(profile.speed >= 0.0) {
                return Err(ConfigError::Invalid("faction speed must be non-negative"));
            }
            if !(profile.max_speed > 0.0) {
                return Err(ConfigError::Invalid("faction max_speed must be positive"));
            }
            if !(profile.size > 0.0) {
                return Err(ConfigError::Invalid("faction size must be positive"));
            }
        }

        Ok(())
    }

    /// Profile for a faction, if one is registered.
    pub fn profile(&self, faction: FactionId) -> Option<&FactionProfile> {
        self.factions.iter().find(|p| p.id == faction)
    }

    /// Motion model for members of `faction`.
    ///
    /// In velocity-driven motion a faction's `max_speed` replaces the global
    /// cap.
    pub fn motion_for(&self, faction: FactionId) -> Motion {
        match (self.motion, self.profile(faction)) {
            (Motion::Velocity { .. }, Some(profile)) => Motion::Velocity {
                max_speed: profile.max_speed,
            },
            (motion, _) => motion,
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FlockConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// Fails if the pipeline holds a custom rule, which has no JSON form.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
