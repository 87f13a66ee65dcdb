//! Wall-clock timing for tick loops.
//!
//! Simulation ticks are unit steps; the core never looks at the clock. The
//! runner uses [`Time`] to pace ticks and report the achieved tick rate.
//!
//! # Example
//!
//! ```ignore
//! use murmur::time::Time;
//!
//! let mut time = Time::paced(Duration::from_millis(10));
//!
//! while flock.state() == FlockState::Running {
//!     flock.step()?;
//!     time.update();
//!     time.pace();
//! }
//! println!("{:.1} ticks/s", time.tps());
//! ```

use std::time::{Duration, Instant};

/// Tick-rate tracking and pacing.
#[derive(Debug)]
pub struct Time {
    /// When the timer was created.
    start: Instant,
    /// When the last tick finished.
    last_tick: Instant,
    /// Time between the last two ticks in seconds.
    delta_secs: f32,
    /// Total ticks since start.
    tick_count: u64,
    /// Measured ticks per second (updated periodically).
    tps: f32,
    /// Tick count at last rate update.
    tps_tick_count: u64,
    /// Time of last rate calculation.
    tps_update_time: Instant,
    /// How often to update the rate.
    tps_update_interval: Duration,
    /// Minimum wall time per tick; zero runs flat out.
    interval: Duration,
}

impl Time {
    /// Create an unpaced timer starting from now.
    pub fn new() -> Self {
        Self::paced(Duration::ZERO)
    }

    /// Create a timer that paces ticks to at least `interval` apart.
    pub fn paced(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            delta_secs: 0.0,
            tick_count: 0,
            tps: 0.0,
            tps_tick_count: 0,
            tps_update_time: now,
            tps_update_interval: Duration::from_millis(500),
            interval,
        }
    }

    /// Record a finished tick. Returns the time since the previous one.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_secs = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.tick_count += 1;

        let since = now.duration_since(self.tps_update_time);
        if since >= self.tps_update_interval {
            let ticks = self.tick_count - self.tps_tick_count;
            self.tps = ticks as f32 / since.as_secs_f32();
            self.tps_tick_count = self.tick_count;
            self.tps_update_time = now;
        }

        self.delta_secs
    }

    /// Sleep out the rest of the pacing interval since the last tick.
    pub fn pace(&self) {
        let busy = self.last_tick.elapsed();
        if let Some(rest) = self.interval.checked_sub(busy) {
            if !rest.is_zero() {
                std::thread::sleep(rest);
            }
        }
    }

    /// Total elapsed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Time between the last two ticks in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total ticks recorded.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.tick_count
    }

    /// Ticks per second, refreshed every half second.
    #[inline]
    pub fn tps(&self) -> f32 {
        self.tps
    }

    /// Average ticks per second since start.
    pub fn average_tps(&self) -> f32 {
        let secs = self.elapsed();
        if secs > 0.0 {
            self.tick_count as f32 / secs
        } else {
            0.0
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.ticks(), 0);
        assert_eq!(time.interval(), Duration::ZERO);
        assert_eq!(time.tps(), 0.0);
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let delta = time.update();

        assert!(delta > 0.0);
        assert!(time.elapsed() >= delta);
        assert_eq!(time.ticks(), 1);
    }

    #[test]
    fn test_pace_waits_for_interval() {
        let mut time = Time::paced(Duration::from_millis(20));
        time.update();
        let before = Instant::now();
        time.pace();
        assert!(before.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn test_unpaced_does_not_sleep() {
        let mut time = Time::new();
        time.update();
        let before = Instant::now();
        time.pace();
        assert!(before.elapsed() < Duration::from_millis(50));
    }
}
