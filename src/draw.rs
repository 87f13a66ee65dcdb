//! Draw records handed to an external renderer after every tick.
//!
//! A [`DrawRecord`] is plain old data (`#[repr(C)]`, [`bytemuck::Pod`]), so a
//! renderer can upload a whole frame with `bytemuck::cast_slice` without
//! copying field by field.

use crate::agent::Agent;
use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Colors used by the bundled scenarios, RGB in 0-1.
pub mod palette {
    pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
    pub const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
    pub const RED: [f32; 3] = [1.0, 0.0, 0.0];
    pub const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
    pub const PURPLE: [f32; 3] = [1.0, 0.0, 1.0];
}

/// Read-only view of one agent for drawing.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DrawRecord {
    pub position: [f32; 2],
    /// Unit direction of travel, or the heading for a stationary agent.
    pub direction: [f32; 2],
    pub color: [f32; 3],
    pub size: f32,
    /// 1 when visible, 0 once caught.
    pub visible: u32,
}

impl DrawRecord {
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible != 0
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        Vec2::from_array(self.direction)
    }
}

impl From<&Agent> for DrawRecord {
    fn from(agent: &Agent) -> Self {
        Self {
            position: agent.position.to_array(),
            direction: agent.direction().to_array(),
            color: agent.color,
            size: agent.size,
            visible: u32::from(agent.visible),
        }
    }
}

/// Consumer of committed frames.
pub trait Renderer {
    fn draw(&mut self, tick: u64, records: &[DrawRecord]);
}

impl<F> Renderer for F
where
    F: FnMut(u64, &[DrawRecord]),
{
    fn draw(&mut self, tick: u64, records: &[DrawRecord]) {
        self(tick, records)
    }
}

/// A renderer that discards every frame (headless runs).
impl Renderer for () {
    fn draw(&mut self, _tick: u64, _records: &[DrawRecord]) {}
}
