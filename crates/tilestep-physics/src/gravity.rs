//! Gravity, grounding and friction
//!
//! A gravity actor accelerates downward unless it rests on something, scans
//! below its ground collider each tick to track what it stands on, loses speed
//! to friction against its surface, and inherits the motion of an actor it
//! stands on.

use serde::{Deserialize, Serialize};
use tilestep_core::math::{clamp01, sign};
use tilestep_core::{BodyId, Directions, Vec2};

use crate::body::{BodyFeatures, BodyKind};
use crate::contact::Contact;
use crate::error::{PhysicsError, PhysicsResult};
use crate::event::PhysicsEvent;
use crate::material::PhysicsMaterial;
use crate::world::World;

/// Per-body gravity tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravitySettings {
    /// Multiplier on the world's gravity
    pub scale: f32,
    /// Track ground contact; off leaves the body permanently airborne
    pub ground_enabled: bool,
}

impl Default for GravitySettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            ground_enabled: true,
        }
    }
}

impl World {
    /// Accelerate downward by weight times the world's gravity
    ///
    /// Skipped while sliding up a step and while resting on ground that closes
    /// the way down.
    pub(crate) fn apply_gravity(&mut self, id: BodyId) {
        let gravity = self.config.gravity;
        let Some(body) = self.bodies.get_mut(id) else {
            return;
        };
        let resting = body.ground.is_some() && !body.moveable.contains(Directions::DOWN);
        if body.sliding.contains(Directions::UP) || resting {
            return;
        }
        body.velocity.y -= body.actor.weight * body.gravity.scale * gravity;
    }

    /// Contacts under the ground collider, in candidate order
    ///
    /// A remote with several colliders under the foot reports its last one.
    fn ground_contacts(&self, id: BodyId) -> Vec<Contact> {
        let Some(body) = self.bodies.get(id) else {
            return Vec::new();
        };
        let Some(foot) = body.ground_shape() else {
            return Vec::new();
        };
        let mut contacts = Vec::new();
        for remote_id in self.nearby(id) {
            let Some(remote) = self.bodies.get(remote_id) else {
                continue;
            };
            let hit = remote
                .shapes()
                .iter()
                .rposition(|shape| foot.colliding_vertically(-1.0, shape));
            if let Some(j) = hit {
                contacts.push(Contact::new(id, body.ground_collider, remote_id, j));
            }
        }
        contacts
    }

    /// Track what the actor stands on
    ///
    /// Landing needs a non-rising velocity. Of several supports the last one
    /// found becomes the ground. Losing contact ungrounds, except while
    /// sliding up a step; players go through coyote time first.
    pub(crate) fn update_grounded(&mut self, id: BodyId) {
        if self.bodies.get(id).is_none_or(|body| !body.gravity.ground_enabled) {
            return;
        }
        let contacts = self.ground_contacts(id);
        let Some(body) = self.bodies.get(id) else {
            return;
        };
        let (current, falling, sliding_up, is_player) = (
            body.ground,
            body.velocity.y <= 0.0,
            body.sliding.contains(Directions::UP),
            body.has(BodyFeatures::PLAYER),
        );

        match current {
            None => {
                if let Some(&contact) = contacts.last() {
                    if falling {
                        self.ground(id, contact);
                    }
                }
            }
            Some(ground) => {
                if contacts.iter().any(|contact| contact.remote == ground.remote) {
                    if is_player {
                        self.cancel_coyote(id);
                    }
                } else if let Some(&contact) = contacts.last() {
                    self.switch_ground(id, ground, contact);
                } else if !sliding_up {
                    if is_player {
                        self.begin_coyote(id);
                    } else {
                        self.unground(id);
                    }
                }
            }
        }
    }

    /// Stand on `contact`, attaching to the remote body
    pub(crate) fn ground(&mut self, id: BodyId, contact: Contact) {
        if self.bodies.get(id).is_some_and(|body| body.ground.is_some()) {
            self.unground(id);
        }
        self.relations.attach(id, contact.remote);
        if let Some(body) = self.bodies.get_mut(id) {
            body.ground = Some(contact);
        }
        log::trace!("Body {} grounded on {}", id, contact.remote);
        self.events.push(PhysicsEvent::Grounded {
            body: id,
            ground: contact.remote,
        });

        if self.bodies.get(id).is_some_and(|body| body.has(BodyFeatures::PLAYER)) {
            self.player_landed(id);
        }
    }

    /// Move to a different ground without leaving the ground state
    fn switch_ground(&mut self, id: BodyId, old: Contact, new: Contact) {
        self.relations.detach(id, old.remote);
        self.relations.attach(id, new.remote);
        if let Some(body) = self.bodies.get_mut(id) {
            body.ground = Some(new);
        }
    }

    /// Leave the ground, detaching from it
    pub(crate) fn unground(&mut self, id: BodyId) {
        let Some(ground) = self.bodies.get_mut(id).and_then(|body| body.ground.take()) else {
            return;
        };
        self.relations.detach(id, ground.remote);
        log::trace!("Body {} left {}", id, ground.remote);
        self.events.push(PhysicsEvent::Ungrounded { body: id });

        if self.bodies.get(id).is_some_and(|body| body.has(BodyFeatures::PLAYER)) {
            self.player_left_ground(id);
        }
    }

    /// The body's material combined with its ground's, or the atmosphere
    pub fn surface(&self, id: BodyId) -> PhysicsMaterial {
        let Some(body) = self.bodies.get(id) else {
            return PhysicsMaterial::default();
        };
        let under = body
            .ground
            .and_then(|ground| self.bodies.get(ground.remote))
            .map(|remote| remote.material)
            .unwrap_or_else(|| self.config.materials.atmosphere());
        body.material * under
    }

    /// Slow down against the surface; never reverses direction
    pub(crate) fn apply_friction(&mut self, id: BodyId) {
        let mut friction = self.surface(id).friction();
        if let Some(player) = self.bodies.get(id).and_then(|body| body.player.as_ref()) {
            if player.crouched {
                friction *= player.settings.crouch_friction;
            }
        }
        let total_weight = self.total_weight(id);
        let Some(body) = self.bodies.get_mut(id) else {
            return;
        };
        let weight = body.actor.weight;

        let vx = body.velocity.x;
        body.velocity.x -= sign(vx) * (total_weight * friction * vx.abs()).clamp(0.0, vx.abs());
        let vy = body.velocity.y;
        body.velocity.y -= sign(vy) * (weight * friction * vy.abs()).clamp(0.0, vy.abs());
    }

    /// Carry along with an actor being stood on
    ///
    /// Each axis where the carrier is faster is pulled toward the carrier's
    /// velocity by the share of this body's weight the carrier can move.
    pub(crate) fn inherit_motion(&mut self, id: BodyId) {
        let Some(body) = self.bodies.get(id) else {
            return;
        };
        let Some(ground) = body.ground.and_then(|ground| self.bodies.get(ground.remote)) else {
            return;
        };
        if ground.kind != BodyKind::Actor {
            return;
        }
        let weight = body.actor.weight;
        let factor = if weight > 0.0 { clamp01(ground.actor.strength / weight) } else { 1.0 };
        let (carrier, own) = (ground.velocity, body.velocity);

        let mut velocity = own;
        if carrier.x.abs() > own.x.abs() {
            velocity.x += factor * (carrier.x - own.x);
        }
        if carrier.y > 0.0 && carrier.y > own.y {
            velocity.y += factor * (carrier.y - own.y);
        }
        if velocity != own {
            if let Some(body) = self.bodies.get_mut(id) {
                body.velocity = velocity;
            }
        }
    }

    /// Add an impulse in step units per tick; leaves the ground
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) -> PhysicsResult<()> {
        let features = self
            .bodies
            .get(id)
            .map(|body| body.features)
            .ok_or(PhysicsError::BodyNotFound(id))?;
        if features.contains(BodyFeatures::GRAVITY) {
            self.unground(id);
        }
        if let Some(player) = self.bodies.get_mut(id).and_then(|body| body.player.as_mut()) {
            player.can_initial_jump = false;
            player.can_long_jump = false;
        }
        if let Some(body) = self.bodies.get_mut(id) {
            body.velocity += impulse;
        }
        Ok(())
    }
}
