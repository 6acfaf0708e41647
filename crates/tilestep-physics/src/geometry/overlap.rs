//! Penetration depth along an axis
//!
//! Each shape is sliced by lines parallel to the axis. At a perpendicular
//! coordinate `c` a convex shape covers one span `[min, max]` along the axis,
//! and the depth there is how far the remote span reaches past the local one.
//! The depth is concave in `c`, so its maximum sits either at a polygon
//! vertex, at the ends of the shared band, or at a stationary point of a
//! circle's arc. Only those candidates are evaluated.

use smallvec::SmallVec;
use tilestep_core::{Axis, Vec2};

use super::Shape;

type Candidates = SmallVec<[f32; 16]>;

/// Displacement the remote must travel along `axis` to clear `local` moving `sign`
pub(super) fn displacement(local: &Shape, axis: Axis, sign: f32, remote: &Shape) -> f32 {
    let across = axis.perpendicular();
    let (local_low, local_high) = cross_range(local, across);
    let (remote_low, remote_high) = cross_range(remote, across);
    let low = local_low.max(remote_low);
    let high = local_high.min(remote_high);
    if low > high {
        return 0.0;
    }

    let mut candidates = Candidates::new();
    candidates.push(low);
    candidates.push(high);
    add_shape_candidates(&mut candidates, local, axis);
    add_shape_candidates(&mut candidates, remote, axis);
    add_pair_candidates(&mut candidates, local, remote, axis);
    add_pair_candidates(&mut candidates, remote, local, axis);

    let mut depth = 0.0_f32;
    for c in candidates {
        if c < low || c > high {
            continue;
        }
        let (Some(local_span), Some(remote_span)) = (span(local, axis, c), span(remote, axis, c)) else {
            continue;
        };
        if local_span.1 <= remote_span.0 || remote_span.1 <= local_span.0 {
            continue;
        }
        let here = if sign > 0.0 {
            local_span.1 - remote_span.0
        } else {
            remote_span.1 - local_span.0
        };
        depth = depth.max(here);
    }

    if sign > 0.0 { depth } else { -depth }
}

fn cross_range(shape: &Shape, across: Axis) -> (f32, f32) {
    match across {
        Axis::Horizontal => (shape.left(), shape.right()),
        Axis::Vertical => (shape.bottom(), shape.top()),
    }
}

/// Polygon corners in winding order; empty for circles
fn vertices(shape: &Shape) -> SmallVec<[Vec2; 4]> {
    match shape {
        Shape::Square(square) => SmallVec::from_slice(&square.vertices()),
        Shape::Triangle(triangle) => SmallVec::from_slice(&triangle.points),
        Shape::Circle(_) => SmallVec::new(),
    }
}

fn add_shape_candidates(candidates: &mut Candidates, shape: &Shape, axis: Axis) {
    let across = axis.perpendicular();
    match shape {
        Shape::Circle(circle) => candidates.push(across.of(circle.position)),
        _ => candidates.extend(vertices(shape).iter().map(|&vertex| across.of(vertex))),
    }
}

/// Stationary points that only exist between a circle and another shape
fn add_pair_candidates(candidates: &mut Candidates, first: &Shape, second: &Shape, axis: Axis) {
    let Shape::Circle(circle) = first else {
        return;
    };
    let across = axis.perpendicular();
    let centre = across.of(circle.position);

    match second {
        Shape::Circle(other) => {
            let other_centre = across.of(other.position);
            let total = circle.radius + other.radius;
            if total > 0.0 {
                candidates.push(centre + circle.radius * (other_centre - centre) / total);
            }
        }
        _ => {
            let corners = vertices(second);
            for (index, &start) in corners.iter().enumerate() {
                let end = corners[(index + 1) % corners.len()];
                let run = across.of(end) - across.of(start);
                let rise = axis.of(end) - axis.of(start);
                if run == 0.0 || rise == 0.0 {
                    continue;
                }
                let slope = rise / run;
                let offset = slope * circle.radius / (1.0 + slope * slope).sqrt();
                candidates.push(centre + offset);
                candidates.push(centre - offset);
            }
        }
    }
}

/// The shape's extent along `axis` on the line where the perpendicular coordinate is `c`
fn span(shape: &Shape, axis: Axis, c: f32) -> Option<(f32, f32)> {
    let across = axis.perpendicular();
    match shape {
        Shape::Square(square) => {
            let (low, high) = cross_range(shape, across);
            if c < low || c > high {
                return None;
            }
            Some(match axis {
                Axis::Horizontal => (square.left(), square.right()),
                Axis::Vertical => (square.bottom(), square.top()),
            })
        }
        Shape::Circle(circle) => {
            let offset = c - across.of(circle.position);
            let squared = circle.radius * circle.radius - offset * offset;
            if squared < 0.0 {
                return None;
            }
            let half = squared.sqrt();
            let middle = axis.of(circle.position);
            Some((middle - half, middle + half))
        }
        Shape::Triangle(triangle) => {
            let mut low = f32::INFINITY;
            let mut high = f32::NEG_INFINITY;
            for index in 0..3 {
                let start = triangle.points[index];
                let end = triangle.points[(index + 1) % 3];
                let (s, e) = (across.of(start), across.of(end));
                if c < s.min(e) || c > s.max(e) {
                    continue;
                }
                if s == e {
                    for point in [start, end] {
                        low = low.min(axis.of(point));
                        high = high.max(axis.of(point));
                    }
                } else {
                    let t = (c - s) / (e - s);
                    let value = axis.of(start) + t * (axis.of(end) - axis.of(start));
                    low = low.min(value);
                    high = high.max(value);
                }
            }
            (low <= high).then_some((low, high))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Circle, Square, Triangle};
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn square(x: f32, y: f32, w: f32, h: f32) -> Shape {
        Shape::Square(Square::new(Vec2::new(x, y), Vec2::new(w, h)))
    }

    #[test]
    fn test_circle_into_square() {
        let circle = Shape::Circle(Circle::new(Vec2::ZERO, 0.5));
        let block = square(0.9, 0.0, 1.0, 1.0);
        assert!(approx(circle.overlap_horizontally(1.0, &block), 0.1));
        // moving the other way the square has to travel past the far side
        assert!(approx(circle.overlap_horizontally(-1.0, &block), -1.9));
    }

    #[test]
    fn test_square_square() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(0.75, 0.5, 1.0, 1.0);
        assert!(approx(a.overlap_horizontally(1.0, &b), 0.25));
        assert!(approx(a.overlap_vertically(1.0, &b), 0.5));
        assert!(approx(a.overlap_vertically(-1.0, &b), -1.5));
    }

    #[test]
    fn test_separated_shapes_have_no_overlap() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        assert_eq!(a.overlap_horizontally(1.0, &square(2.0, 0.0, 1.0, 1.0)), 0.0);
        assert_eq!(a.overlap_horizontally(1.0, &square(0.0, 2.0, 1.0, 1.0)), 0.0);
        assert_eq!(a.overlap_horizontally(1.0, &square(1.0, 0.0, 1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_circle_circle_offset() {
        let a = Shape::Circle(Circle::new(Vec2::ZERO, 1.0));
        let b = Shape::Circle(Circle::new(Vec2::new(1.5, 0.0), 1.0));
        assert!(approx(a.overlap_horizontally(1.0, &b), 0.5));

        // offset vertically: the deepest slice is between the centres
        let c = Shape::Circle(Circle::new(Vec2::new(1.0, 1.0), 1.0));
        let depth = a.overlap_horizontally(1.0, &c);
        let expected = 2.0 * (1.0_f32 - 0.25).sqrt() - 1.0;
        assert!(approx(depth, expected));
    }

    #[test]
    fn test_square_under_slope() {
        // slope rising to the right; the box is sunk 0.25 into it at its right side
        let slope = Shape::Triangle(Triangle::from_points(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
        ));
        let body = square(2.0, 2.75, 1.0, 1.0);
        assert!(approx(slope.overlap_vertically(1.0, &body), 0.25));
    }

    #[test]
    fn test_circle_on_slope() {
        let slope = Shape::Triangle(Triangle::from_points(
            Vec2::new(-4.0, -4.0),
            Vec2::new(4.0, -4.0),
            Vec2::new(4.0, 4.0),
        ));
        let ball = Shape::Circle(Circle::new(Vec2::new(0.0, 0.5), 1.0));
        // distance from centre to the line y = x is 0.5 / sqrt(2)
        let gap = 1.0 - 0.5 / 2.0_f32.sqrt();
        let expected = gap * 2.0_f32.sqrt();
        assert!(approx(slope.overlap_vertically(1.0, &ball), expected));
    }
}
