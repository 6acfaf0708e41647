//! World configuration
//!
//! Everything tunable about a simulation lives here and loads from JSON.
//! Per-body tuning (slide rules, jump timings) sits on the body descriptors.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tilestep_core::FixedTimeStep;

use crate::error::{PhysicsError, PhysicsResult};
use crate::material::MaterialLibrary;

/// How actors take turns consuming their whole units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// Every actor takes at most one unit per axis per round, rounds repeat
    /// until nobody has units left
    #[default]
    Interleaved,
    /// Each actor resolves all of its units before the next actor moves
    Sequential,
}

/// Physics world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed simulation step
    pub time_step: FixedTimeStep,
    /// World distance of one discrete movement unit
    pub step_size: f32,
    /// Vertical velocity lost per tick by a gravity actor of weight 1
    pub gravity: f32,
    /// Side length of a broad-phase grid cell
    pub cell_size: f32,
    /// Tiles gathered around a body beyond its own extent
    pub tile_range: i32,
    /// Bound on resolution iterations for one mover
    pub max_iterations: u32,
    pub schedule: ScheduleMode,
    pub materials: MaterialLibrary,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            time_step: FixedTimeStep::default(),
            step_size: 1.0 / 24.0,
            gravity: 0.25,
            cell_size: 3.0,
            tile_range: 2,
            max_iterations: 1000,
            schedule: ScheduleMode::default(),
            materials: MaterialLibrary::default(),
        }
    }
}

impl PhysicsConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> PhysicsResult<Self> {
        let config: PhysicsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> PhysicsResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> PhysicsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_step_size(mut self, step_size: f32) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_schedule(mut self, schedule: ScheduleMode) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_time_step(mut self, time_step: FixedTimeStep) -> Self {
        self.time_step = time_step;
        self
    }

    /// Seconds per tick
    pub fn dt(&self) -> f32 {
        self.time_step.step_f32()
    }

    /// Reject values the tick loop cannot work with
    pub fn validate(&self) -> PhysicsResult<()> {
        let invalid = |message: &str| Err(PhysicsError::InvalidConfig(message.to_string()));

        if !(self.step_size > 0.0 && self.step_size.is_finite()) {
            return invalid("step_size must be positive");
        }
        if !(self.cell_size > 0.0 && self.cell_size.is_finite()) {
            return invalid("cell_size must be positive");
        }
        if !(self.time_step.step > 0.0 && self.time_step.step.is_finite()) {
            return invalid("time_step.step must be positive");
        }
        if !self.gravity.is_finite() {
            return invalid("gravity must be finite");
        }
        if self.tile_range < 0 {
            return invalid("tile_range must not be negative");
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be at least 1");
        }
        Ok(())
    }
}
