//! Flock observables.
//!
//! [`FlockStats`] summarizes how ordered a flock is. Polarization is the
//! length of the mean unit heading: 1 when every agent points the same way,
//! near 0 for random headings. Circular heading variance is `1 - polarization`.

use crate::agent::Agent;
use crate::draw::DrawRecord;
use crate::kinematics::normalize_angle;
use glam::Vec2;
use std::fmt;

/// Snapshot statistics over a set of agents.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlockStats {
    pub count: usize,
    pub visible: usize,
    /// Mean position (zero for an empty set).
    pub centroid: Vec2,
    pub mean_speed: f32,
    /// Circular mean heading; `None` when headings cancel out.
    pub mean_heading: Option<f32>,
    /// Length of the mean unit heading, in `[0, 1]`.
    pub polarization: f32,
    /// `1 - polarization`, in `[0, 1]`.
    pub heading_variance: f32,
}

impl FlockStats {
    /// Measure a set of agents.
    pub fn measure<'a>(agents: impl IntoIterator<Item = &'a Agent>) -> Self {
        let mut acc = Accumulator::default();
        for agent in agents {
            acc.add(
                agent.position,
                Vec2::from_angle(agent.heading),
                agent.speed,
                agent.visible,
            );
        }
        acc.finish()
    }

    /// Measure committed draw records. Records carry no speed or role, so
    /// `mean_speed` is zero and leaders and predators are counted.
    pub fn from_records(records: &[DrawRecord]) -> Self {
        let mut acc = Accumulator::default();
        for record in records {
            acc.add(
                record.position(),
                record.direction(),
                0.0,
                record.is_visible(),
            );
        }
        acc.finish()
    }
}

impl fmt::Display for FlockStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} agents ({} visible), centroid ({:.1}, {:.1}), polarization {:.3}, heading variance {:.3}",
            self.count,
            self.visible,
            self.centroid.x,
            self.centroid.y,
            self.polarization,
            self.heading_variance
        )?;
        if let Some(heading) = self.mean_heading {
            write!(f, ", mean heading {:.3}", heading)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    visible: usize,
    position_sum: Vec2,
    speed_sum: f32,
    direction_sum: Vec2,
    directed: usize,
}

impl Accumulator {
    fn add(&mut self, position: Vec2, direction: Vec2, speed: f32, visible: bool) {
        self.count += 1;
        self.visible += usize::from(visible);
        self.position_sum += position;
        self.speed_sum += speed;
        if direction != Vec2::ZERO {
            self.direction_sum += direction;
            self.directed += 1;
        }
    }

    fn finish(self) -> FlockStats {
        if self.count == 0 {
            return FlockStats::default();
        }
        let n = self.count as f32;

        let (polarization, mean_heading) = if self.directed == 0 {
            (0.0, None)
        } else {
            let resultant = self.direction_sum / self.directed as f32;
            let length = resultant.length().min(1.0);
            let heading = (length > 1e-5).then(|| normalize_angle(resultant.y.atan2(resultant.x)));
            (length, heading)
        };

        FlockStats {
            count: self.count,
            visible: self.visible,
            centroid: self.position_sum / n,
            mean_speed: self.speed_sum / n,
            mean_heading,
            polarization,
            heading_variance: 1.0 - polarization,
        }
    }
}
