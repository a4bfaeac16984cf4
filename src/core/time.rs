//! Frame timing and the day/night cycle

use std::time::Instant;

use crate::core::types::Vec3;

/// Tracks per-frame delta time and a resettable global clock
pub struct FrameTimer {
    start: Instant,
    last_frame: Instant,
    delta: f32,
    frame_count: u64,
    fps_timer: Instant,
    fps: f32,
    fps_frame_count: u32,
}

impl FrameTimer {
    /// Create a new frame timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta: 0.0,
            frame_count: 0,
            fps_timer: now,
            fps: 0.0,
            fps_frame_count: 0,
        }
    }

    /// Call once per frame to update timing
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;
        self.fps_frame_count += 1;

        // Update FPS every second
        let fps_elapsed = (now - self.fps_timer).as_secs_f32();
        if fps_elapsed >= 1.0 {
            self.fps = self.fps_frame_count as f32 / fps_elapsed;
            self.fps_frame_count = 0;
            self.fps_timer = now;
        }
    }

    /// Get delta time in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta
    }

    /// Seconds since start (or the last reset)
    pub fn elapsed_secs(&self) -> f32 {
        self.last_frame.duration_since(self.start).as_secs_f32()
    }

    /// Restart the global clock (the R key rewinds the whole animation)
    pub fn reset(&mut self) {
        self.start = self.last_frame;
    }

    /// Get current FPS (updated every second)
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Sun orbit driving the light position and the day/night scalar.
///
/// The sun circles the island once per `period` seconds, never dipping
/// below the horizon: its height is folded with an absolute value so the
/// shadow pass always has a light source above the scene.
#[derive(Clone, Copy, Debug)]
pub struct DayCycle {
    /// Length of a full day in seconds
    pub period: f32,
    /// Orbit radius in world units
    pub radius: f32,
}

impl DayCycle {
    pub fn new(period: f32) -> Self {
        Self {
            period,
            radius: 256.0,
        }
    }

    /// World-space light position at time `t` (seconds)
    pub fn light_position(&self, t: f32) -> Vec3 {
        let phase = t / self.period;
        Vec3::new(
            self.radius * phase.cos(),
            self.radius * phase.sin().abs(),
            (self.radius * phase.sin()).abs(),
        )
    }

    /// Day/night scalar in [0, 1]: 1 at noon, 0 at midnight
    pub fn time_of_day(&self, t: f32) -> f32 {
        ((t * std::f32::consts::PI / self.period).cos() + 1.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_stays_above_horizon() {
        let cycle = DayCycle::new(30.0);
        for i in 0..120 {
            let pos = cycle.light_position(i as f32);
            assert!(pos.y >= 0.0, "light dipped below horizon at t={}", i);
        }
    }

    #[test]
    fn test_time_of_day_range() {
        let cycle = DayCycle::new(30.0);
        assert!((cycle.time_of_day(0.0) - 1.0).abs() < 1e-5);
        // half a period later it is midnight
        assert!(cycle.time_of_day(30.0).abs() < 1e-5);
        for i in 0..100 {
            let v = cycle.time_of_day(i as f32 * 0.7);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_timer_reset_rewinds_elapsed() {
        let mut timer = FrameTimer::new();
        timer.tick();
        timer.reset();
        assert!(timer.elapsed_secs() < 0.1);
    }
}
