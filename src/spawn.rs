//! Spawn context for agent initialization.
//!
//! Provides helper methods to reduce boilerplate when spawning agents.

use crate::agent::Agent;
use crate::config::{FactionProfile, WorldBounds};
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Distance from each wall kept clear when scattering agents.
pub const SPAWN_INSET: f32 = 200.0;

/// Context provided to spawner functions with helpers for common spawn patterns.
///
/// ```ignore
/// sim.with_spawner(|ctx| {
///     Agent::new(ctx.random_in_world(), ctx.random_heading(), 3.0)
///         .color(ctx.rainbow(0.8, 1.0))
/// })
/// ```
///
/// With a seed (see [`Simulation::with_seed`](crate::Simulation::with_seed))
/// every context draws from a reproducible stream.
pub struct SpawnContext {
    /// Index of the agent being spawned (0 to count-1).
    pub index: u32,
    /// Total number of agents being spawned.
    pub count: u32,
    pub world: WorldBounds,
    /// Profile of the first configured faction, used by [`follower`](Self::follower).
    pub profile: FactionProfile,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a spawn context for one agent.
    ///
    /// Without a seed the stream differs on every run.
    pub(crate) fn new(
        index: u32,
        count: u32,
        world: WorldBounds,
        profile: FactionProfile,
        seed: Option<u64>,
    ) -> Self {
        let base = seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });
        let seed = base ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);

        Self {
            index,
            count,
            world,
            profile,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Normalized progress through the spawn (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.index as f32 / self.count as f32
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Random heading in `[0, 2π)`.
    #[inline]
    pub fn random_heading(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    // ========== Position helpers ==========

    /// Random point in the rectangle `[min, max)`.
    pub fn random_in_rect(&mut self, min: Vec2, max: Vec2) -> Vec2 {
        Vec2::new(
            self.random_range(min.x, max.x),
            self.random_range(min.y, max.y),
        )
    }

    /// Random point at least [`SPAWN_INSET`] from every wall.
    ///
    /// Small worlds shrink the inset to a quarter of each dimension.
    pub fn random_in_world(&mut self) -> Vec2 {
        let inset = Vec2::new(
            SPAWN_INSET.min(self.world.width / 4.0),
            SPAWN_INSET.min(self.world.height / 4.0),
        );
        let size = Vec2::new(self.world.width, self.world.height);
        self.random_in_rect(inset, size - inset)
    }

    /// Random point uniformly distributed in a disk.
    pub fn random_in_disk(&mut self, center: Vec2, radius: f32) -> Vec2 {
        let r = radius * self.random().sqrt();
        center + Vec2::from_angle(self.random_heading()) * r
    }

    /// Point on a circle, spaced evenly by spawn index.
    pub fn circle_position(&self, center: Vec2, radius: f32) -> Vec2 {
        center + Vec2::from_angle(self.progress() * TAU) * radius
    }

    // ========== Velocity helpers ==========

    /// Random velocity with each component in `[-max_speed, max_speed)`.
    pub fn random_velocity(&mut self, max_speed: f32) -> Vec2 {
        Vec2::new(
            self.random_range(-max_speed, max_speed),
            self.random_range(-max_speed, max_speed),
        )
    }

    // ========== Agent helpers ==========

    /// A normal agent of the default faction, scattered in the world with a
    /// random heading at the faction's speed.
    pub fn follower(&mut self) -> Agent {
        let position = self.random_in_world();
        let heading = self.random_heading();
        let profile = self.profile;
        Agent::new(position, heading, profile.speed)
            .faction(profile.id)
            .color(profile.color)
            .size(profile.size)
    }

    /// Like [`follower`](Self::follower) but styled after `profile`.
    pub fn member(&mut self, profile: &FactionProfile) -> Agent {
        let position = self.random_in_world();
        let heading = self.random_heading();
        Agent::new(position, heading, profile.speed)
            .faction(profile.id)
            .color(profile.color)
            .size(profile.size)
    }

    // ========== Color helpers ==========

    /// Color from HSV (hue 0-1).
    pub fn hsv(&self, hue: f32, saturation: f32, value: f32) -> [f32; 3] {
        hsv_to_rgb(hue, saturation, value)
    }

    /// Hue spread across the spawn by index.
    pub fn rainbow(&self, saturation: f32, value: f32) -> [f32; 3] {
        hsv_to_rgb(self.progress(), saturation, value)
    }
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(index: u32, seed: Option<u64>) -> SpawnContext {
        SpawnContext::new(
            index,
            100,
            WorldBounds::default(),
            FactionProfile::new(3, 2.5, 4.0),
            seed,
        )
    }

    #[test]
    fn test_spawn_context_progress() {
        assert!((ctx(50, None).progress() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_random_in_world_keeps_inset() {
        let mut ctx = ctx(0, Some(7));
        for _ in 0..200 {
            let p = ctx.random_in_world();
            assert!(p.x >= 200.0 && p.x < 824.0);
            assert!(p.y >= 200.0 && p.y < 600.0);
        }
    }

    #[test]
    fn test_random_in_world_small_world() {
        let mut ctx = SpawnContext::new(
            0,
            1,
            WorldBounds {
                width: 100.0,
                height: 80.0,
                margin: 5.0,
            },
            FactionProfile::new(0, 1.0, 1.0),
            Some(1),
        );
        for _ in 0..50 {
            let p = ctx.random_in_world();
            assert!(p.x >= 25.0 && p.x < 75.0);
            assert!(p.y >= 20.0 && p.y < 60.0);
        }
    }

    #[test]
    fn test_seeded_contexts_repeat() {
        let mut a = ctx(4, Some(99));
        let mut b = ctx(4, Some(99));
        assert_eq!(a.random_heading(), b.random_heading());
        assert_eq!(a.random_in_world(), b.random_in_world());

        let mut c = ctx(5, Some(99));
        let mut d = ctx(4, Some(99));
        assert_ne!(c.random_in_world(), d.random_in_world());
    }

    #[test]
    fn test_follower_uses_profile() {
        let agent = ctx(0, Some(3)).follower();
        assert_eq!(agent.faction.0, 3);
        assert_eq!(agent.speed, 2.5);
        assert!((0.0..TAU).contains(&agent.heading));
    }

    #[test]
    fn test_random_in_disk() {
        let mut ctx = ctx(0, Some(11));
        let center = Vec2::new(500.0, 400.0);
        for _ in 0..100 {
            assert!(ctx.random_in_disk(center, 30.0).distance(center) <= 30.0 + 1e-3);
        }
    }

    #[test]
    fn test_random_range_empty() {
        assert_eq!(ctx(0, Some(1)).random_range(2.0, 2.0), 2.0);
    }

    #[test]
    fn test_hsv_to_rgb() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]);
        let green = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!(green[1] > 0.99 && green[0] < 0.01);
    }
}
