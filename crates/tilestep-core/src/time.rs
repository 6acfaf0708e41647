//! Time Management
//!
//! Fixed-step model supporting:
//! - A configurable simulation step with a per-frame update cap
//! - An accumulator that turns variable host frame times into whole ticks
//! - Tick-driven countdown timers (no wall clock, so replays stay exact)

use serde::{Deserialize, Serialize};

/// Fixed time step configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedTimeStep {
    /// Fixed timestep in seconds
    pub step: f64,
    /// Maximum number of fixed updates per frame (to prevent spiral of death)
    pub max_updates: u32,
}

impl Default for FixedTimeStep {
    fn default() -> Self {
        Self {
            step: 1.0 / 60.0, // 60 Hz
            max_updates: 8,
        }
    }
}

impl FixedTimeStep {
    /// Create a fixed time step with the given frequency
    pub fn from_hz(hz: f64) -> Self {
        Self {
            step: 1.0 / hz,
            ..Self::default()
        }
    }

    /// Create a fixed time step with the given step size
    pub fn from_step(step: f64) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    /// Set the maximum number of updates per frame
    pub fn with_max_updates(mut self, max: u32) -> Self {
        self.max_updates = max;
        self
    }

    /// Step length as f32
    pub fn step_f32(&self) -> f32 {
        self.step as f32
    }
}

/// Accumulates host frame time and hands out whole fixed steps
#[derive(Debug, Clone, Default)]
pub struct StepAccumulator {
    accumulated: f64,
    total_steps: u64,
}

impl StepAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add frame time, clamped to a sane range
    pub fn accumulate(&mut self, delta_time: f64) {
        self.accumulated += delta_time.clamp(0.0, 0.25);
    }

    /// Number of fixed steps to run now, capped by `max_updates`
    pub fn steps_due(&self, config: &FixedTimeStep) -> u32 {
        if config.step <= 0.0 {
            return 0;
        }
        ((self.accumulated / config.step) as u32).min(config.max_updates)
    }

    /// Consume time for `steps` fixed updates
    pub fn consume(&mut self, config: &FixedTimeStep, steps: u32) {
        self.accumulated = (self.accumulated - config.step * steps as f64).max(0.0);
        self.total_steps += steps as u64;
    }

    /// Interpolation factor for rendering between fixed updates
    pub fn interpolation(&self, config: &FixedTimeStep) -> f64 {
        if config.step <= 0.0 {
            return 0.0;
        }
        (self.accumulated / config.step).clamp(0.0, 1.0)
    }

    /// Steps consumed since creation
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }
}

/// A countdown driven by fixed ticks
///
/// A timer that was never started, or has run out, is complete.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    duration: f32,
    elapsed: f32,
    running: bool,
}

impl Timer {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            running: false,
        }
    }

    /// Start, or restart, the countdown
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.running = self.duration > 0.0;
    }

    /// Stop the countdown without firing
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.running = false;
    }

    pub fn is_complete(&self) -> bool {
        !self.running
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Normalized progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Advance by `dt`; returns true on the tick the timer runs out
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.running = false;
            return true;
        }
        false
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(0.0)
    }
}
