//! # Tilestep Physics
//!
//! Deterministic fixed-step physics for tile-based 2D platformers.
//!
//! Bodies move in whole discrete steps and every collision test happens at an
//! exact lattice position, so a simulation replays identically from the same
//! inputs. The crate provides:
//! - **Geometry**: squares, circles and triangles with directional contact tests
//! - **Integrator**: fractional remainders split into unit steps, with interleaved
//!   and sequential schedules bounded by an iteration cap
//! - **Resolver**: per-unit advance, slide, push or block decisions
//! - **Sliding**: ledge, corner, round tile and slope conversion through
//!   configurable curves
//! - **Gravity and players**: grounding, friction, coyote time, banked and long
//!   jumps, wallplants
//! - **Levels**: tile layers stitched across neighbouring levels, with a
//!   per-level broad-phase grid
//! - **Solids**: moving platforms that carry riders and shove actors aside

pub mod body;
pub mod capability;
pub mod collider;
pub mod config;
pub mod contact;
pub mod curve;
pub mod error;
pub mod event;
pub mod geometry;
pub mod gravity;
pub mod grid;
pub mod ignore;
pub mod integrator;
pub mod level;
pub mod material;
pub mod player;
pub mod ray;
pub mod relation;
mod resolver;
pub mod slide;
mod solid;
pub mod world;

pub use body::{ActorSettings, Body, BodyDesc, BodyFeatures, BodyKind};
pub use capability::{Groundable, Movable, Pushable, Slideable};
pub use collider::{Collider, ColliderShape};
pub use config::{PhysicsConfig, ScheduleMode};
pub use contact::{Contact, Contacts};
pub use curve::{Curve, Keyframe};
pub use error::{PhysicsError, PhysicsResult};
pub use event::{Diagnostics, PhysicsEvent};
pub use geometry::{Circle, Edge, Shape, Square, Triangle};
pub use gravity::GravitySettings;
pub use level::{Compass, LevelSet, Tile, TileLayer, TileLegend, TileLevel, TileShape};
pub use material::{MaterialLibrary, PhysicsMaterial};
pub use player::{PlayerSettings, PlayerState};
pub use ray::{BodyMask, RaycastHit};
pub use relation::RelationTable;
pub use slide::{SlideRule, SlideSettings};
pub use world::World;
