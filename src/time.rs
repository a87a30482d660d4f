//! Frame clock driving the simulation.
//!
//! [`FrameClock::advance`] is called once per redraw and yields a
//! [`FrameTick`]: elapsed seconds for the idle motion, the frame's delta and
//! a frame counter. With a fixed delta the clock ignores wall time entirely,
//! so runs are reproducible.
//!
//! # Example
//!
//! ```ignore
//! use ropeline::time::FrameClock;
//!
//! let mut clock = FrameClock::with_fixed_delta(1.0 / 60.0);
//! let tick = clock.advance().unwrap();
//! assert_eq!(tick.frame, 1);
//! ```

use std::time::{Duration, Instant};

/// Timing of a single simulation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds since the clock started, excluding pauses.
    pub elapsed: f32,
    /// Seconds since the previous tick.
    pub delta: f32,
    /// Ticks produced so far, this one included.
    pub frame: u64,
}

/// Clock producing one [`FrameTick`] per simulated frame.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    pause_elapsed: Duration,
    fixed_delta: Option<f32>,
}

impl FrameClock {
    /// Create a clock running on wall time, starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            pause_elapsed: Duration::ZERO,
            fixed_delta: None,
        }
    }

    /// Create a clock that advances by exactly `delta` seconds per tick.
    pub fn with_fixed_delta(delta: f32) -> Self {
        Self {
            fixed_delta: Some(delta),
            ..Self::new()
        }
    }

    /// Advance one frame. Returns `None` while paused.
    ///
    /// The first tick reports the time at which it was taken, so with a fixed
    /// delta the n-th tick has `elapsed = (n - 1) * delta`.
    pub fn advance(&mut self) -> Option<FrameTick> {
        let now = Instant::now();
        self.update_fps(now);

        if self.paused {
            self.delta_secs = 0.0;
            return None;
        }

        match self.fixed_delta {
            Some(delta) => {
                self.elapsed_secs = self.frame_count as f32 * delta;
                self.delta_secs = if self.frame_count == 0 { 0.0 } else { delta };
            }
            None => {
                self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
                let running = now.duration_since(self.start).saturating_sub(self.pause_elapsed);
                self.elapsed_secs = running.as_secs_f32();
            }
        }
        self.last_frame = now;
        self.frame_count += 1;

        Some(FrameTick {
            elapsed: self.elapsed_secs,
            delta: self.delta_secs,
            frame: self.frame_count,
        })
    }

    fn update_fps(&mut self, now: Instant) {
        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    /// Elapsed seconds at the last tick.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Delta of the last tick.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Ticks produced so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Simulated frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop producing ticks. Elapsed time stops with it.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert!(!clock.is_paused());
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_wall_clock_advances() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let tick = clock.advance().unwrap();

        assert!(tick.elapsed > 0.0);
        assert!(tick.delta > 0.0);
        assert_eq!(tick.frame, 1);
    }

    #[test]
    fn test_fixed_delta_is_deterministic() {
        let dt = 1.0 / 60.0;
        let mut clock = FrameClock::with_fixed_delta(dt);

        let first = clock.advance().unwrap();
        assert_eq!(first.elapsed, 0.0);
        assert_eq!(first.delta, 0.0);

        thread::sleep(Duration::from_millis(20));
        let second = clock.advance().unwrap();
        assert!((second.elapsed - dt).abs() < 1e-7);
        assert!((second.delta - dt).abs() < 1e-7);
        assert_eq!(second.frame, 2);
    }

    #[test]
    fn test_pause_stops_ticks() {
        let mut clock = FrameClock::with_fixed_delta(0.5);
        clock.advance();
        clock.advance();

        clock.pause();
        assert!(clock.advance().is_none());
        assert_eq!(clock.frame(), 2);
        assert_eq!(clock.delta(), 0.0);

        clock.toggle_pause();
        let tick = clock.advance().unwrap();
        assert_eq!(tick.frame, 3);
        assert_eq!(tick.elapsed, 1.0);
    }

    #[test]
    fn test_pause_excludes_wall_time() {
        let mut clock = FrameClock::new();
        clock.advance();
        clock.pause();
        thread::sleep(Duration::from_millis(50));
        clock.resume();
        let tick = clock.advance().unwrap();
        assert!(tick.elapsed < 0.045);
    }
}
