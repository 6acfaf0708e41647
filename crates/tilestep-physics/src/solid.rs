//! Moving solids
//!
//! Solids travel their whole displacement without being stopped. After each
//! axis move, actors the solid now overlaps on its leading side are pushed
//! out of the way (squished if they cannot give way), and actors riding the
//! solid that were not pushed are carried the same distance.

use tilestep_core::{Axis, BodyId};

use crate::body::BodyKind;
use crate::integrator::OnBlock;
use crate::world::World;

/// Slack before rounding a push distance up to whole units
const PUSH_EPSILON: f32 = 1e-3;

impl World {
    /// Accumulate velocity and move a solid by whole units, x then y
    pub(crate) fn tick_solid(&mut self, id: BodyId) {
        let Some(body) = self.bodies.get_mut(id) else {
            return;
        };
        let velocity = body.velocity;
        body.motion.add_remainder(Axis::Horizontal, velocity.x as f64);
        body.motion.add_remainder(Axis::Vertical, velocity.y as f64);
        body.motion.split_nearest();
        let x = body.motion.take_all(Axis::Horizontal);
        let y = body.motion.take_all(Axis::Vertical);

        if x != 0.0 {
            self.move_solid(id, Axis::Horizontal, x as i64);
        }
        if y != 0.0 {
            self.move_solid(id, Axis::Vertical, y as i64);
        }
    }

    /// Move a solid `units` steps along `axis`, shoving and carrying actors
    pub fn move_solid(&mut self, id: BodyId, axis: Axis, units: i64) {
        let step = self.config.step_size;
        let sign = units.signum() as f32;
        let Some(body) = self.bodies.get_mut(id) else {
            return;
        };
        if body.kind != BodyKind::Solid || units == 0 {
            return;
        }
        body.position += axis.unit(units as f32 * step);
        self.update_membership(id);

        let riders: Vec<BodyId> = self.relations.attached_to(id).collect();
        let Some(solid) = self.bodies.get(id) else {
            return;
        };
        let solid_shapes = solid.shapes();

        let mut pushed: Vec<(BodyId, u32)> = Vec::new();
        for actor_id in self.nearby(id) {
            let Some(actor) = self.bodies.get(actor_id) else {
                continue;
            };
            let mut depth = 0.0_f32;
            for solid_shape in &solid_shapes {
                for actor_shape in &actor.shapes() {
                    if solid_shape.colliding_along(axis, sign, actor_shape) || solid_shape.colliding(actor_shape) {
                        depth = depth.max(solid_shape.overlap_along(axis, sign, actor_shape).abs());
                    }
                }
            }
            if depth > 0.0 {
                let units = (depth / step - PUSH_EPSILON).ceil().max(1.0) as u32;
                pushed.push((actor_id, units));
            }
        }

        for &(actor_id, push) in &pushed {
            log::trace!("Solid {} pushes {} by {} units", id, actor_id, push);
            self.displace(actor_id, axis, sign, push, OnBlock::Squish);
        }

        let carried = units.unsigned_abs().min(u32::MAX as u64) as u32;
        for rider in riders {
            let is_actor = self.bodies.get(rider).is_some_and(|body| body.kind == BodyKind::Actor);
            if is_actor && !pushed.iter().any(|&(actor_id, _)| actor_id == rider) {
                self.displace(rider, axis, sign, carried, OnBlock::Ignore);
            }
        }
    }
}
