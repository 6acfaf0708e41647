//! # Tilestep Core
//!
//! Foundation types shared by the tilestep crates:
//! - **Math**: glam re-exports, a 2D axis-aligned box, axis/direction helpers
//! - **Handles**: generational body ids and a slot allocator for them
//! - **Time**: fixed-step configuration and tick-driven timers

pub mod handle;
pub mod math;
pub mod time;

pub use handle::{BodyId, SlotMap};
pub use math::{Aabb, Axis, Direction, Directions, Vec2};
pub use time::{FixedTimeStep, StepAccumulator, Timer};
