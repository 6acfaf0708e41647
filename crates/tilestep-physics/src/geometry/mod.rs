//! Collision geometry
//!
//! World-space shapes and the pairwise predicates the resolver is built on:
//! - [`Edge`]: inset segments used for side tests, segment and circle crossings
//! - [`Square`], [`Circle`], [`Triangle`]: the three collider variants once placed
//! - [`Shape`]: the closed sum over the variants with exhaustive dispatch for
//!   `colliding`, directional `colliding_along` and `overlap_along`
//!
//! Every predicate is total. Degenerate input (zero-length edges, coincident
//! points, parallel lines) answers "no contact" rather than failing.

mod circle;
mod edge;
mod overlap;
mod shape;
mod square;
mod triangle;

pub use circle::{Circle, CircleProfile};
pub use edge::Edge;
pub use shape::Shape;
pub use square::Square;
pub use triangle::Triangle;

/// Inset applied to both ends of every edge
pub const EDGE_MARGIN: f32 = 0.035;

/// Gap under which two faces count as touching
pub const TOUCH_MARGIN: f32 = 0.0035;

/// Horizontal slack on a square's top face when moving up
pub const SQUARE_MARGIN_UP: f32 = 0.1;

/// Horizontal slack on a square's bottom face when moving down
pub const SQUARE_MARGIN_DOWN: f32 = 0.01;

/// Vertical slack on a square's side faces when moving sideways
pub const SQUARE_MARGIN_HORIZONTAL: f32 = 0.01;

/// Unsigned angle in degrees between two vectors; 0 when either is zero
pub(crate) fn angle_between(a: tilestep_core::Vec2, b: tilestep_core::Vec2) -> f32 {
    let denominator = a.length() * b.length();
    if denominator <= f32::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denominator).clamp(-1.0, 1.0).acos().to_degrees()
}
