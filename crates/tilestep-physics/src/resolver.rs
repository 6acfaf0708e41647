//! Unit-step resolution
//!
//! One whole unit of movement for one actor. The candidates come from the
//! broad phase, the narrow phase keeps the ones touching on the leading side,
//! and the outcome is one of advance, slide, push or block.

use ahash::AHashSet;
use tilestep_core::math::{clamp01, sign};
use tilestep_core::{Axis, BodyId, Direction, Directions, Vec2};

use crate::body::{BodyFeatures, BodyKind};
use crate::contact::{Contact, Contacts};
use crate::event::PhysicsEvent;
use crate::integrator::{OnBlock, StepOutcome};
use crate::world::World;

impl World {
    /// Contacts on the side leading a move, split into static ones (tiles and
    /// solids) and actors; one collider pair per remote body
    pub(crate) fn contacts_along(&self, id: BodyId, axis: Axis, sign: f32, candidates: &[BodyId]) -> (Contacts, Contacts) {
        let mut statics = Contacts::new();
        let mut actors = Contacts::new();
        let Some(body) = self.bodies.get(id) else {
            return (statics, actors);
        };
        let shapes = body.shapes();

        for &remote_id in candidates {
            let Some(remote) = self.bodies.get(remote_id) else {
                continue;
            };
            if remote_id == id {
                continue;
            }
            let remote_shapes = remote.shapes();
            let found = shapes.iter().enumerate().find_map(|(i, shape)| {
                remote_shapes
                    .iter()
                    .position(|remote_shape| shape.colliding_along(axis, sign, remote_shape))
                    .map(|j| Contact::new(id, i, remote_id, j))
            });

            if let Some(contact) = found {
                match remote.kind {
                    BodyKind::Actor => actors.push(contact),
                    BodyKind::Solid | BodyKind::Tile => statics.push(contact),
                }
            }
        }
        (statics, actors)
    }

    /// Resolve one unit of movement
    pub(crate) fn move_unit(&mut self, id: BodyId, axis: Axis, sign: f32, on_block: OnBlock) -> StepOutcome {
        self.update_membership(id);
        let nearby = self.nearby(id);
        let (statics, actors) = self.contacts_along(id, axis, sign, &nearby);
        let direction = Direction::from_axis(axis, sign);

        if !statics.is_empty() {
            if self.try_slide(id, axis, sign, &statics) {
                return StepOutcome::Slid;
            }
            self.block(id, axis, sign, &statics, on_block);
            return StepOutcome::Blocked;
        }

        if !actors.is_empty() {
            let can_push = self.bodies.get(id).is_some_and(|body| body.actor.can_push);
            if !can_push || actors.iter().any(|contact| !self.accepts_push(contact.remote, direction)) {
                if self.try_slide(id, axis, sign, &actors) {
                    return StepOutcome::Slid;
                }
                self.block(id, axis, sign, &actors, on_block);
                return StepOutcome::Blocked;
            }
            self.push(id, axis, sign, &actors);
            return StepOutcome::Pushed;
        }

        let step = self.config.step_size;
        if let Some(body) = self.bodies.get_mut(id) {
            body.position += axis.unit(sign * step);
        }
        self.diagnostics.steps += 1;
        StepOutcome::Advanced
    }

    /// Whether an actor would give way to a push in `direction`
    pub(crate) fn accepts_push(&self, id: BodyId, direction: Direction) -> bool {
        self.bodies.get(id).is_some_and(|body| {
            body.is_actor()
                && body.actor.pushable
                && !body.actor.immovable
                && !body.moving
                && body.moveable.contains(direction.into())
        })
    }

    /// Hand motion to the pushed actors and take some back as reaction
    ///
    /// Action is the mover's strength over the target's total weight, the
    /// reaction the target's weight over the mover's strength capped by the
    /// mover's speed on that axis. Velocities are untouched.
    fn push(&mut self, id: BodyId, axis: Axis, sign: f32, contacts: &[Contact]) {
        let Some((strength, speed)) = self
            .bodies
            .get(id)
            .map(|body| (body.actor.strength, axis.of(body.velocity).abs()))
        else {
            return;
        };

        for contact in contacts {
            let weight = self.total_weight(contact.remote);
            let action = if weight > 0.0 { clamp01(strength / weight) } else { 1.0 };
            let reaction = if strength > 0.0 { clamp01(weight / strength) } else { 1.0 }.min(speed);

            if let Some(target) = self.bodies.get_mut(contact.remote) {
                target.motion.add_remainder(axis, (sign * action) as f64);
            }
            if let Some(body) = self.bodies.get_mut(id) {
                body.motion.add_remainder(axis, (-sign * reaction) as f64);
            }
            log::trace!("Body {} pushed {} (action {}, reaction {})", id, contact.remote, action, reaction);
        }
        self.diagnostics.pushes += 1;
    }

    fn block(&mut self, id: BodyId, axis: Axis, sign: f32, contacts: &[Contact], on_block: OnBlock) {
        if let Some(body) = self.bodies.get_mut(id) {
            body.moveable.remove(Direction::from_axis(axis, sign).into());
            body.motion.clear_pending(axis);
        }
        self.diagnostics.blocks += 1;

        match on_block {
            OnBlock::Ignore => {}
            OnBlock::Squish => {
                if let Some(contact) = contacts.first() {
                    log::debug!("Body {} squished against {}", id, contact.remote);
                    self.events.push(PhysicsEvent::Squished {
                        body: id,
                        against: contact.remote,
                    });
                }
            }
            OnBlock::Respond => self.respond_to_block(id, axis, sign, contacts),
        }
    }

    fn respond_to_block(&mut self, id: BodyId, axis: Axis, sign: f32, contacts: &[Contact]) {
        let Some(features) = self.bodies.get(id).map(|body| body.features) else {
            return;
        };
        if features.contains(BodyFeatures::PLAYER) {
            let handled = match axis {
                Axis::Horizontal => self.try_wallplant(id, sign, contacts),
                Axis::Vertical => sign < 0.0 && self.try_banked_landing(id, contacts),
            };
            if handled {
                return;
            }
        }
        if features.contains(BodyFeatures::GRAVITY) {
            self.bounce(id, axis, contacts);
        }
    }

    /// Reflect velocity off the blocking contacts
    ///
    /// Elasticity compounds the body's surface with every contact that is not
    /// its ground. Landing re-runs the ground scan first so the floor counts
    /// as ground rather than as a bouncing contact.
    pub(crate) fn bounce(&mut self, id: BodyId, axis: Axis, contacts: &[Contact]) {
        let Some(body) = self.bodies.get(id) else {
            return;
        };
        let velocity = axis.of(body.velocity);
        let direction = sign(velocity);

        if axis == Axis::Vertical {
            if body.sliding.intersects(Directions::VERTICAL) {
                if let Some(body) = self.bodies.get_mut(id) {
                    body.velocity = Vec2::ZERO;
                }
            }
            if direction < 0.0 {
                self.update_grounded(id);
            }
        }

        let ground = self.bodies.get(id).and_then(|body| body.ground).map(|contact| contact.remote);
        let mut elasticity = self.surface(id).elasticity();
        for contact in contacts {
            if Some(contact.remote) == ground {
                continue;
            }
            if let Some(remote) = self.bodies.get(contact.remote) {
                elasticity *= remote.material.elasticity();
            }
        }

        if let Some(body) = self.bodies.get_mut(id) {
            let component = axis.of_mut(&mut body.velocity);
            let reflected = (*component * elasticity).abs();
            match axis {
                Axis::Horizontal => *component += -direction * reflected,
                Axis::Vertical => *component = -direction * reflected,
            }
        }
    }

    /// Recompute which directions the actor could move one unit in
    ///
    /// A direction is closed by any static contact that cannot be slid past,
    /// or by an actor contact that is immovable or itself closed that way.
    pub(crate) fn update_moveable(&mut self, id: BodyId) {
        let nearby = self.nearby(id);
        let mut moveable = Directions::all();

        for direction in [Direction::Right, Direction::Left, Direction::Up, Direction::Down] {
            let (statics, actors) = self.contacts_along(id, direction.axis(), direction.sign(), &nearby);
            let closed_by_static = statics.iter().any(|contact| !self.slide_possible(id, direction, contact));
            let closed_by_actor = actors.iter().any(|contact| {
                let stuck = self.bodies.get(contact.remote).is_none_or(|remote| {
                    remote.actor.immovable || !remote.moveable.contains(direction.into())
                });
                stuck && !self.slide_possible(id, direction, contact)
            });
            if closed_by_static || closed_by_actor {
                moveable.remove(direction.into());
            }
        }

        if let Some(body) = self.bodies.get_mut(id) {
            body.moveable = moveable;
        }
    }

    /// Own weight plus everything resting on the body, transitively
    pub fn total_weight(&self, id: BodyId) -> f32 {
        let mut visited = AHashSet::new();
        self.weight_of(id, &mut visited)
    }

    fn weight_of(&self, id: BodyId, visited: &mut AHashSet<BodyId>) -> f32 {
        if !visited.insert(id) {
            return 0.0;
        }
        let Some(body) = self.bodies.get(id) else {
            return 0.0;
        };
        let mut weight = body.actor.weight;
        let riders: Vec<BodyId> = self.relations.attached_to(id).collect();
        for rider in riders {
            let rests_here = self
                .bodies
                .get(rider)
                .is_some_and(|other| other.is_actor() && other.ground.is_some_and(|ground| ground.remote == id));
            if rests_here {
                weight += self.weight_of(rider, visited);
            }
        }
        weight
    }
}
