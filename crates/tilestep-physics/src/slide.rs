//! Sliding
//!
//! A blocked unit step may be turned into a perpendicular one instead: over a
//! low ledge, off a corner, along a slope or around a round tile. Moving
//! sideways tries up then down; moving vertically tries left then right.
//!
//! How much perpendicular motion a blocked unit buys depends on the remote
//! shape. A square ledge within `max_distance` converts one full unit. Circles
//! and triangles convert a fraction read from a curve keyed by how steep the
//! surface is at the point of contact.

use serde::{Deserialize, Serialize};
use tilestep_core::{Axis, BodyId, Direction, Directions, Vec2};

use crate::body::BodyFeatures;
use crate::contact::Contact;
use crate::curve::Curve;
use crate::geometry::{Circle, Shape, TOUCH_MARGIN, Triangle};
use crate::world::World;

/// Slides of at least this many units mark the body as sliding that way
pub const SLIDE_THRESHOLD: f32 = 0.1;

/// Steepness to converted amount, picked by the sign of the blocked move
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionCurves {
    pub positive: Curve,
    pub negative: Curve,
}

impl ConversionCurves {
    pub fn for_sign(&self, sign: f32) -> &Curve {
        if sign > 0.0 { &self.positive } else { &self.negative }
    }
}

/// Whether sliding off a shape cancels perpendicular motion against the slide
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetVelocity {
    pub square: bool,
    pub circle: bool,
    pub triangle: bool,
}

impl Default for ResetVelocity {
    fn default() -> Self {
        Self {
            square: true,
            circle: true,
            triangle: true,
        }
    }
}

impl ResetVelocity {
    pub fn applies_to(&self, shape: &Shape) -> bool {
        match shape {
            Shape::Square(_) => self.square,
            Shape::Circle(_) => self.circle,
            Shape::Triangle(_) => self.triangle,
        }
    }
}

/// Rule for sliding in one direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideRule {
    /// Allowed when the blocked move is negative (left or down)
    pub when_moving_negative: bool,
    /// Allowed when the blocked move is positive (right or up)
    pub when_moving_positive: bool,
    /// Tallest square ledge that can be slid over, in world units
    pub max_distance: f32,
    pub curves: ConversionCurves,
    pub reset_velocity: ResetVelocity,
}

impl Default for SlideRule {
    fn default() -> Self {
        Self {
            when_moving_negative: true,
            when_moving_positive: true,
            max_distance: 0.2,
            curves: ConversionCurves::default(),
            reset_velocity: ResetVelocity::default(),
        }
    }
}

impl SlideRule {
    pub fn disabled() -> Self {
        Self {
            when_moving_negative: false,
            when_moving_positive: false,
            ..Default::default()
        }
    }

    pub fn allows(&self, sign: f32) -> bool {
        if sign > 0.0 {
            self.when_moving_positive
        } else {
            self.when_moving_negative
        }
    }
}

/// Per-body slide tuning
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideSettings {
    pub up: SlideRule,
    pub down: SlideRule,
    pub left: SlideRule,
    pub right: SlideRule,
    /// Triangle faces at least this steep are never slid along
    pub triangle_gradient_limit: Option<f32>,
    /// Circle surfaces at least this steep are never slid along
    pub circle_gradient_limit: Option<f32>,
}

impl SlideSettings {
    pub fn rule(&self, direction: Direction) -> &SlideRule {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }
}

/// Directions tried when a move along `axis` is blocked, in order
pub fn slide_directions(axis: Axis) -> [Direction; 2] {
    match axis {
        Axis::Horizontal => [Direction::Up, Direction::Down],
        Axis::Vertical => [Direction::Left, Direction::Right],
    }
}

/// Units of perpendicular motion toward `toward` bought by a blocked move of
/// `sign` along `axis` against `remote`; `None` if this contact forbids it
pub fn slide_amount(
    settings: &SlideSettings,
    local: &Shape,
    remote: &Shape,
    axis: Axis,
    sign: f32,
    toward: Direction,
) -> Option<f32> {
    let rule = settings.rule(toward);
    let amount = match remote {
        Shape::Square(_) => ledge_amount(rule, local, remote, toward)?,
        Shape::Circle(circle) => round_amount(settings, rule, local, circle, axis, sign, toward)?,
        Shape::Triangle(triangle) => slope_amount(settings, rule, local, remote, triangle, axis, sign, toward)?,
    };
    (amount > 0.0).then_some(amount)
}

/// How far the remote reaches past the local body in `toward`
fn clearance(local: &Shape, remote: &Shape, toward: Direction) -> f32 {
    (remote.extent(toward) - local.extent(toward.opposite())) * toward.sign()
}

fn ledge_amount(rule: &SlideRule, local: &Shape, remote: &Shape, toward: Direction) -> Option<f32> {
    let clearance = clearance(local, remote, toward);
    (clearance >= -TOUCH_MARGIN && clearance <= rule.max_distance).then_some(1.0)
}

fn steepness(surface: Vec2, axis: Axis) -> f32 {
    let along = axis.of(surface).abs();
    let across = axis.perpendicular().of(surface).abs();
    if along <= f32::EPSILON { f32::INFINITY } else { across / along }
}

fn within_limit(limit: Option<f32>, steepness: f32) -> bool {
    limit.is_none_or(|limit| steepness < limit)
}

fn round_amount(
    settings: &SlideSettings,
    rule: &SlideRule,
    local: &Shape,
    circle: &Circle,
    axis: Axis,
    sign: f32,
    toward: Direction,
) -> Option<f32> {
    let across = toward.axis();
    let point = match local {
        Shape::Circle(own) => {
            let outward = (circle.position - own.position).normalize_or_zero();
            own.position + outward * (own.radius - TOUCH_MARGIN)
        }
        _ => {
            let mut corner = Vec2::ZERO;
            *axis.of_mut(&mut corner) = local.extent(Direction::from_axis(axis, sign));
            *across.of_mut(&mut corner) = local.extent(toward.opposite());
            corner
        }
    };

    let offset = (across.of(point) - across.of(circle.position)) * toward.sign();
    if offset < 0.0 {
        return None;
    }

    let normal = point - circle.position;
    let tangent = Vec2::new(-normal.y, normal.x);
    let steepness = steepness(tangent, axis);
    if !within_limit(settings.circle_gradient_limit, steepness) {
        return None;
    }
    Some(rule.curves.for_sign(sign).evaluate(steepness).clamp(0.0, 1.0))
}

#[allow(clippy::too_many_arguments)]
fn slope_amount(
    settings: &SlideSettings,
    rule: &SlideRule,
    local: &Shape,
    remote: &Shape,
    triangle: &Triangle,
    axis: Axis,
    sign: f32,
    toward: Direction,
) -> Option<f32> {
    let against = triangle.edges_facing(Direction::from_axis(axis, -sign));
    let beside = triangle.edges_facing(toward);
    let governing = against
        .iter()
        .filter(|edge| beside.iter().any(|other| other.same_as(edge)))
        .min_by(|a, b| a.distance_to(local.position()).total_cmp(&b.distance_to(local.position())));

    let Some(edge) = governing else {
        return ledge_amount(rule, local, remote, toward);
    };

    let steepness = steepness(edge.original_vector(), axis);
    if !within_limit(settings.triangle_gradient_limit, steepness) {
        return None;
    }

    let across = toward.axis();
    let foot = if across.of(edge.oa()) * toward.sign() <= across.of(edge.ob()) * toward.sign() {
        edge.oa()
    } else {
        edge.ob()
    };
    let clearance = (local.extent(toward.opposite()) - across.of(foot)) * toward.sign();
    if clearance < -TOUCH_MARGIN {
        return None;
    }
    Some(rule.curves.for_sign(sign).evaluate(steepness).clamp(0.0, 1.0))
}

impl World {
    /// Try to convert a blocked unit into a slide
    pub(crate) fn try_slide(&mut self, id: BodyId, axis: Axis, sign: f32, contacts: &[Contact]) -> bool {
        for toward in slide_directions(axis) {
            let Some(amount) = self.slide_candidate(id, axis, sign, toward, contacts, true) else {
                continue;
            };
            self.perform_slide(id, toward, amount.0, amount.1);
            return true;
        }
        false
    }

    /// Whether some slide would get past `contact` when moving `direction`
    pub(crate) fn slide_possible(&self, id: BodyId, direction: Direction, contact: &Contact) -> bool {
        let (axis, sign) = (direction.axis(), direction.sign());
        slide_directions(axis)
            .into_iter()
            .any(|toward| self.slide_candidate(id, axis, sign, toward, std::slice::from_ref(contact), false).is_some())
    }

    /// Amount and velocity reset for a slide toward `toward` past all contacts
    fn slide_candidate(
        &self,
        id: BodyId,
        axis: Axis,
        sign: f32,
        toward: Direction,
        contacts: &[Contact],
        check_sliding: bool,
    ) -> Option<(f32, bool)> {
        let body = self.bodies.get(id)?;
        if !body.has(BodyFeatures::SLIDE) || contacts.is_empty() {
            return None;
        }
        let rule = body.slide.rule(toward);
        if !rule.allows(sign) || !body.moveable.contains(toward.into()) {
            return None;
        }
        if check_sliding && body.sliding.intersects(Directions::along(axis)) {
            return None;
        }

        let mut amount = f32::INFINITY;
        let mut reset = false;
        for contact in contacts {
            let collider = body.colliders.get(contact.local_collider)?;
            if collider.slide_veto.contains(toward.into()) {
                return None;
            }
            let remote = self.bodies.get(contact.remote)?;
            let remote_shape = remote.colliders.get(contact.remote_collider)?.place(remote.position);
            let local_shape = collider.place(body.position);

            amount = amount.min(slide_amount(&body.slide, &local_shape, &remote_shape, axis, sign, toward)?);
            reset |= rule.reset_velocity.applies_to(&remote_shape);
        }
        (amount.is_finite() && amount > 0.0).then_some((amount, reset))
    }

    fn perform_slide(&mut self, id: BodyId, toward: Direction, amount: f32, reset: bool) {
        let Some(body) = self.bodies.get_mut(id) else {
            return;
        };
        let across = toward.axis();
        if reset {
            body.motion.clamp_to_sign(across, toward.sign());
            let velocity = across.of_mut(&mut body.velocity);
            if *velocity * toward.sign() < 0.0 {
                *velocity = 0.0;
            }
        }

        body.motion.add_remainder(across, (toward.sign() * amount) as f64);
        body.motion.split();

        if amount >= SLIDE_THRESHOLD {
            body.sliding.insert(toward.into());
            body.sliding.remove(toward.opposite().into());
        }

        self.diagnostics.slides += 1;
        log::trace!("Body {} slid {:?} by {} units", id, toward, amount);
    }
}
