//! Player control
//!
//! Player actors are gravity actors driven by host input. On top of grounding
//! they add:
//! - walking with separate ground, air and jump-peak speeds
//! - an initial jump, a banked jump fired on landing and a held long jump
//! - coyote time before ungrounding
//! - crouching with a cooldown and a friction multiplier
//! - wallplants that slip down a wall and launch wall jumps
//!
//! Speeds are in step units per tick. Accelerations are per second and scaled
//! by the tick length.

use serde::{Deserialize, Serialize};
use tilestep_core::math::{clamp01, sign};
use tilestep_core::{Axis, BodyId, Directions, Timer, Vec2};

use crate::body::{BodyFeatures, BodyKind};
use crate::contact::Contact;
use crate::error::{PhysicsError, PhysicsResult};
use crate::event::PhysicsEvent;
use crate::world::World;

/// Player tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Inputs closer to zero than this count as no input
    pub input_threshold: f32,

    pub movement_speed: f32,
    pub movement_max: f32,
    pub air_speed: f32,
    pub air_max: f32,
    pub jump_peak_speed: f32,
    pub jump_peak_max: f32,
    /// Below this vertical speed an airborne player is at the jump peak
    pub jump_peak_threshold: f32,

    pub jump_speed: f32,
    /// Share of the walk input added horizontally when jumping
    pub jump_horizontal_fraction: f32,
    pub long_jump_speed: f32,
    pub long_jump_start: f32,
    pub long_jump_end: f32,
    pub jump_bank_time: f32,
    pub coyote_time: f32,

    pub crouch_cooldown: f32,
    pub crouch_friction: f32,

    /// Highest vertical speed at which a wall can be planted on
    pub wallplant_entry_speed: f32,
    pub wallplant_time: f32,
    pub wallplant_slip_speed: f32,
    pub wallplant_exit_time: f32,
    pub wallplant_exit_threshold: f32,
    pub wall_jump_horizontal: f32,
    pub wall_jump_vertical: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            input_threshold: 0.1,
            movement_speed: 60.0,
            movement_max: 4.0,
            air_speed: 30.0,
            air_max: 4.0,
            jump_peak_speed: 45.0,
            jump_peak_max: 5.0,
            jump_peak_threshold: 1.0,
            jump_speed: 6.0,
            jump_horizontal_fraction: 0.5,
            long_jump_speed: 30.0,
            long_jump_start: 0.0,
            long_jump_end: 0.25,
            jump_bank_time: 0.1,
            coyote_time: 0.1,
            crouch_cooldown: 0.2,
            crouch_friction: 4.0,
            wallplant_entry_speed: 1.0,
            wallplant_time: 1.0,
            wallplant_slip_speed: 3.0,
            wallplant_exit_time: 0.15,
            wallplant_exit_threshold: 0.5,
            wall_jump_horizontal: 4.0,
            wall_jump_vertical: 6.0,
        }
    }
}

/// Runtime player state
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub(crate) settings: PlayerSettings,
    pub(crate) input: f32,
    pub(crate) can_initial_jump: bool,
    pub(crate) can_long_jump: bool,
    pub(crate) long_jump_time: f32,
    pub(crate) can_wallplant: bool,
    /// Side of the planted wall: -1 left, 1 right, 0 none
    pub(crate) wallplant_side: f32,
    pub(crate) crouched: bool,
    pub(crate) coyote: Timer,
    pub(crate) jump_bank: Timer,
    pub(crate) crouch_cooldown: Timer,
    pub(crate) wallplant: Timer,
    pub(crate) wallplant_exit: Timer,
}

impl PlayerState {
    pub fn new(settings: PlayerSettings) -> Self {
        Self {
            coyote: Timer::new(settings.coyote_time),
            jump_bank: Timer::new(settings.jump_bank_time),
            crouch_cooldown: Timer::new(settings.crouch_cooldown),
            wallplant: Timer::new(settings.wallplant_time),
            wallplant_exit: Timer::new(settings.wallplant_exit_time),
            settings,
            input: 0.0,
            can_initial_jump: false,
            can_long_jump: false,
            long_jump_time: 0.0,
            can_wallplant: true,
            wallplant_side: 0.0,
            crouched: false,
        }
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn input(&self) -> f32 {
        self.input
    }

    pub fn can_jump(&self) -> bool {
        self.can_initial_jump
    }

    pub fn is_crouched(&self) -> bool {
        self.crouched
    }

    pub fn is_wallplanted(&self) -> bool {
        self.wallplant_side != 0.0
    }

    pub fn wallplant_side(&self) -> f32 {
        self.wallplant_side
    }

    pub fn is_jump_banked(&self) -> bool {
        self.jump_bank.is_running()
    }

    pub fn in_coyote_time(&self) -> bool {
        self.coyote.is_running()
    }

    fn unwallplant(&mut self) {
        self.wallplant_side = 0.0;
        self.wallplant.reset();
        self.wallplant_exit.reset();
    }
}

/// Exponential ease-out from 0 to 1
pub fn ease_out_expo(progress: f32) -> f32 {
    if progress >= 1.0 { 1.0 } else { 1.0 - 2.0_f32.powf(-10.0 * progress) }
}

impl World {
    fn player_mut(&mut self, id: BodyId) -> PhysicsResult<&mut PlayerState> {
        self.bodies
            .get_mut(id)
            .ok_or(PhysicsError::BodyNotFound(id))?
            .player
            .as_mut()
            .ok_or(PhysicsError::MissingFeature(id, "player"))
    }

    /// Traction scaled by how much of the load the player can move
    fn drive(&self, id: BodyId) -> f32 {
        let strength = self.bodies.get(id).map_or(0.0, |body| body.actor.strength);
        let total_weight = self.total_weight(id);
        let share = if total_weight > 0.0 { clamp01(strength / total_weight) } else { 1.0 };
        self.surface(id).traction() * share
    }

    /// Steer horizontally with `input` in [-1, 1]
    pub fn walk(&mut self, id: BodyId, input: f32) -> PhysicsResult<()> {
        let dt = self.config.dt();
        let drive = self.drive(id);
        let grounded = self.bodies.get(id).is_some_and(|body| body.ground.is_some());
        let player = self.player_mut(id)?;

        let mut input = input.clamp(-1.0, 1.0);
        if input.abs() < player.settings.input_threshold {
            input = 0.0;
        }
        player.input = input;

        if player.is_wallplanted() {
            let away = input != 0.0
                && sign(input) != player.wallplant_side
                && input.abs() >= player.settings.wallplant_exit_threshold;
            if !away {
                player.wallplant_exit.reset();
            } else if player.wallplant_exit.is_complete() {
                player.wallplant_exit.start();
            }
            return Ok(());
        }
        if input == 0.0 || (grounded && player.crouched) {
            return Ok(());
        }

        let settings = player.settings;
        let Some(body) = self.bodies.get_mut(id) else {
            return Ok(());
        };
        let (speed, max) = if grounded {
            (settings.movement_speed, settings.movement_max)
        } else if body.velocity.y.abs() < settings.jump_peak_threshold {
            (settings.jump_peak_speed, settings.jump_peak_max)
        } else {
            (settings.air_speed, settings.air_max)
        };

        let mut delta = input * drive * speed * dt;
        let vx = body.velocity.x;
        if vx != 0.0 && sign(input) == sign(vx) {
            let room = (max - vx.abs()).max(0.0);
            delta = delta.clamp(-room, room);
        }
        body.velocity.x += delta;
        Ok(())
    }

    /// Jump, or bank the jump to fire on landing if it is not allowed yet
    ///
    /// Returns whether a jump happened now.
    pub fn jump(&mut self, id: BodyId) -> PhysicsResult<bool> {
        let drive = self.drive(id);
        let player = self.player_mut(id)?;

        if !player.can_initial_jump {
            if !player.is_wallplanted() && player.jump_bank.is_complete() {
                player.jump_bank.start();
            }
            return Ok(false);
        }
        self.initial_jump(id, drive);
        Ok(true)
    }

    fn initial_jump(&mut self, id: BodyId, drive: f32) {
        self.unground(id);
        let Some(body) = self.bodies.get_mut(id) else {
            return;
        };
        let Some(player) = body.player.as_mut() else {
            return;
        };
        player.can_initial_jump = false;
        player.can_long_jump = true;
        player.long_jump_time = 0.0;
        player.jump_bank.reset();
        player.coyote.reset();

        let settings = player.settings;
        if player.wallplant_side != 0.0 {
            body.velocity.x = -player.wallplant_side * settings.wall_jump_horizontal * drive;
            body.velocity.y = settings.wall_jump_vertical * drive;
            player.unwallplant();
        } else {
            body.velocity.x += settings.jump_speed * settings.jump_horizontal_fraction * player.input * drive;
            body.velocity.y = settings.jump_speed * drive;
        }
        log::trace!("Body {} jumped with velocity {}", id, body.velocity);
    }

    /// Extend a jump while the button is held for `hold_time` seconds
    pub fn long_jump(&mut self, id: BodyId, hold_time: f32) -> PhysicsResult<()> {
        let dt = self.config.dt();
        let drive = self.drive(id);
        let blocked_up = self
            .bodies
            .get(id)
            .is_some_and(|body| !body.moveable.contains(Directions::UP));
        let player = self.player_mut(id)?;
        if !player.can_long_jump {
            return Ok(());
        }
        if hold_time < player.long_jump_time || blocked_up || hold_time > player.settings.long_jump_end {
            player.can_long_jump = false;
            return Ok(());
        }
        player.long_jump_time = hold_time;
        if hold_time < player.settings.long_jump_start {
            return Ok(());
        }

        let boost = player.settings.long_jump_speed * drive * dt;
        if let Some(body) = self.bodies.get_mut(id) {
            body.velocity.y += boost;
        }
        Ok(())
    }

    /// Crouch or stand; crouching again waits out the cooldown
    pub fn crouch(&mut self, id: BodyId, crouched: bool) -> PhysicsResult<bool> {
        let player = self.player_mut(id)?;
        if crouched == player.crouched {
            return Ok(crouched);
        }
        if crouched {
            if player.crouch_cooldown.is_running() {
                return Ok(false);
            }
            player.crouched = true;
        } else {
            player.crouched = false;
            player.crouch_cooldown.start();
        }
        Ok(player.crouched)
    }

    pub(crate) fn player_landed(&mut self, id: BodyId) {
        let Some(player) = self.bodies.get_mut(id).and_then(|body| body.player.as_mut()) else {
            return;
        };
        player.coyote.reset();
        player.unwallplant();
        player.can_initial_jump = true;
        player.can_long_jump = false;
        player.can_wallplant = false;

        if player.jump_bank.is_running() {
            player.jump_bank.reset();
            log::trace!("Body {} fired a banked jump", id);
            let drive = self.drive(id);
            self.initial_jump(id, drive);
        }
    }

    pub(crate) fn player_left_ground(&mut self, id: BodyId) {
        if let Some(player) = self.bodies.get_mut(id).and_then(|body| body.player.as_mut()) {
            player.coyote.reset();
            player.can_initial_jump = false;
            player.can_wallplant = true;
        }
    }

    /// Ground contact lost: start the grace period, or leave at once without one
    pub(crate) fn begin_coyote(&mut self, id: BodyId) {
        let Some(player) = self.bodies.get_mut(id).and_then(|body| body.player.as_mut()) else {
            return;
        };
        if player.coyote.duration() <= 0.0 {
            self.unground(id);
        } else if player.coyote.is_complete() {
            player.coyote.start();
        }
    }

    pub(crate) fn cancel_coyote(&mut self, id: BodyId) {
        if let Some(player) = self.bodies.get_mut(id).and_then(|body| body.player.as_mut()) {
            player.coyote.reset();
        }
    }

    /// Plant on a wall hit while airborne
    pub(crate) fn try_wallplant(&mut self, id: BodyId, side: f32, contacts: &[Contact]) -> bool {
        let Some(body) = self.bodies.get(id) else {
            return false;
        };
        let Some(player) = body.player.as_ref() else {
            return false;
        };
        let eligible = player.can_wallplant
            && !player.is_wallplanted()
            && body.ground.is_none()
            && body.velocity.y <= player.settings.wallplant_entry_speed
            && !body.sliding.intersects(Directions::VERTICAL);
        if !eligible {
            return false;
        }
        let Some(wall) = contacts
            .iter()
            .find(|contact| self.bodies.get(contact.remote).is_some_and(|remote| remote.kind != BodyKind::Actor))
        else {
            return false;
        };
        let wall = wall.remote;

        let Some(body) = self.bodies.get_mut(id) else {
            return false;
        };
        body.velocity = Vec2::ZERO;
        body.motion.clear_pending(Axis::Vertical);
        if let Some(player) = body.player.as_mut() {
            player.wallplant_side = sign(side);
            player.wallplant.start();
            player.wallplant_exit.reset();
            player.can_wallplant = false;
            player.can_initial_jump = true;
            player.can_long_jump = false;
        }
        log::debug!("Body {} planted on wall {}", id, wall);
        self.events.push(PhysicsEvent::Wallplanted { body: id, wall });
        true
    }

    /// Landing with a banked jump grounds at once, which fires the jump
    pub(crate) fn try_banked_landing(&mut self, id: BodyId, contacts: &[Contact]) -> bool {
        let Some(body) = self.bodies.get(id) else {
            return false;
        };
        let banked = body.player.as_ref().is_some_and(|player| player.jump_bank.is_running());
        if !banked || body.ground.is_some() {
            return false;
        }
        let Some(foot) = body.ground_shape() else {
            return false;
        };
        let ground_collider = body.ground_collider;
        let landing = contacts.iter().rev().find_map(|contact| {
            let remote = self.bodies.get(contact.remote)?;
            remote
                .shapes()
                .iter()
                .rposition(|shape| foot.colliding_vertically(-1.0, shape))
                .map(|j| Contact::new(id, ground_collider, contact.remote, j))
        });
        match landing {
            Some(contact) => {
                self.ground(id, contact);
                true
            }
            None => false,
        }
    }

    /// Hold the wallplant: slip down the wall, or let go once it is gone
    pub(crate) fn update_wallplant(&mut self, id: BodyId) {
        let Some(body) = self.bodies.get(id) else {
            return;
        };
        let Some(player) = body.player.as_ref() else {
            return;
        };
        let side = player.wallplant_side;
        if side == 0.0 {
            return;
        }
        let progress = player.wallplant.progress();
        let slip = player.settings.wallplant_slip_speed;

        let nearby = self.nearby(id);
        let (statics, _) = self.contacts_along(id, Axis::Horizontal, side, &nearby);
        let Some(body) = self.bodies.get_mut(id) else {
            return;
        };
        let grounded = body.ground.is_some();
        let Some(player) = body.player.as_mut() else {
            return;
        };

        if statics.is_empty() {
            player.unwallplant();
            player.can_initial_jump = grounded;
            player.can_wallplant = !grounded;
            return;
        }
        body.velocity.x = 0.0;
        body.velocity.y = -slip * ease_out_expo(progress);
    }

    /// Advance the player timers and apply their expiries
    pub(crate) fn tick_player_timers(&mut self, id: BodyId, dt: f32) {
        let Some(player) = self.bodies.get_mut(id).and_then(|body| body.player.as_mut()) else {
            return;
        };
        let coyote_expired = player.coyote.tick(dt);
        let wallplant_expired = player.wallplant.tick(dt);
        let exit_expired = player.wallplant_exit.tick(dt);
        player.jump_bank.tick(dt);
        player.crouch_cooldown.tick(dt);

        if wallplant_expired || exit_expired {
            log::trace!("Body {} let go of the wall", id);
            player.unwallplant();
            player.can_initial_jump = false;
        }
        if coyote_expired {
            player.can_initial_jump = false;
            player.can_long_jump = false;
            self.unground(id);
        }
    }

    /// Whether the body has the player feature
    pub fn is_player(&self, id: BodyId) -> bool {
        self.bodies.get(id).is_some_and(|body| body.has(BodyFeatures::PLAYER))
    }
}
