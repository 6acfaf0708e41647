//! Movement integrator
//!
//! Velocity is measured in step units per tick. Each tick it is added to a
//! fractional remainder and split off into whole units that are consumed one
//! at a time, so every collision test happens at an exact lattice position.
//! Two schedules share the unit step:
//! - Interleaved: all actors take at most one unit per axis per round
//! - Sequential: one actor spends all of its units before the next moves
//!
//! Both are bounded by the configured iteration cap. Hitting it discards the
//! units still pending, records it in [`Diagnostics`](crate::event::Diagnostics)
//! and emits [`PhysicsEvent::IterationCapReached`].

use tilestep_core::{Axis, BodyId};

use crate::event::PhysicsEvent;
use crate::world::World;

/// Pending displacement of a body, in step units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    remainder: [f64; 2],
    rounded: [f64; 2],
}

fn slot(axis: Axis) -> usize {
    match axis {
        Axis::Horizontal => 0,
        Axis::Vertical => 1,
    }
}

impl Motion {
    /// Add displacement and split off whole units
    pub fn accumulate(&mut self, x: f64, y: f64) {
        self.remainder[0] += x;
        self.remainder[1] += y;
        self.split();
    }

    /// Recombine and split each axis into whole units toward zero plus a
    /// remainder in (-1, 1) carrying the same sign
    pub fn split(&mut self) {
        for axis in 0..2 {
            let total = self.rounded[axis] + self.remainder[axis];
            let whole = total.trunc();
            self.rounded[axis] = whole;
            self.remainder[axis] = total - whole;
        }
    }

    /// Like [`Motion::split`] but rounding to the nearest unit
    pub fn split_nearest(&mut self) {
        for axis in 0..2 {
            let total = self.rounded[axis] + self.remainder[axis];
            let whole = total.round();
            self.rounded[axis] = whole;
            self.remainder[axis] = total - whole;
        }
    }

    /// Whole units still to be consumed on `axis`
    pub fn pending(&self, axis: Axis) -> f64 {
        self.rounded[slot(axis)]
    }

    pub fn remainder(&self, axis: Axis) -> f64 {
        self.remainder[slot(axis)]
    }

    pub fn has_pending(&self) -> bool {
        self.rounded[0] != 0.0 || self.rounded[1] != 0.0
    }

    /// Consume one unit, returning its sign
    pub fn take_unit(&mut self, axis: Axis) -> Option<f32> {
        let rounded = &mut self.rounded[slot(axis)];
        if *rounded == 0.0 {
            return None;
        }
        let sign = rounded.signum();
        *rounded -= sign;
        Some(sign as f32)
    }

    /// Consume every pending unit on `axis` at once
    pub fn take_all(&mut self, axis: Axis) -> f64 {
        std::mem::take(&mut self.rounded[slot(axis)])
    }

    pub fn add_remainder(&mut self, axis: Axis, amount: f64) {
        self.remainder[slot(axis)] += amount;
    }

    pub fn clear_pending(&mut self, axis: Axis) {
        self.rounded[slot(axis)] = 0.0;
    }

    /// Drop motion on `axis` that points against `sign`
    pub fn clamp_to_sign(&mut self, axis: Axis, sign: f32) {
        let index = slot(axis);
        if sign > 0.0 {
            self.rounded[index] = self.rounded[index].max(0.0);
            self.remainder[index] = self.remainder[index].max(0.0);
        } else {
            self.rounded[index] = self.rounded[index].min(0.0);
            self.remainder[index] = self.remainder[index].min(0.0);
        }
    }

    /// Discard all whole units, keeping the fractions
    pub fn discard_pending(&mut self) {
        self.rounded = [0.0; 2];
    }
}

/// What happened to one unit step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced,
    /// Converted into perpendicular motion
    Slid,
    /// Spent pushing actors out of the way
    Pushed,
    Blocked,
}

/// How a mover reacts when a unit is blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnBlock {
    /// The body's own reaction: bounce, wallplant, banked jump
    Respond,
    /// Being crushed by a solid
    Squish,
    Ignore,
}

impl World {
    /// Interleaved rounds over `movers` until nobody has whole units left
    pub(crate) fn run_interleaved(&mut self, movers: &[BodyId]) {
        let cap = self.config.max_iterations;
        let mut rounds = 0;

        loop {
            let mut active = false;
            for &id in movers {
                let Some(body) = self.bodies.get_mut(id) else {
                    continue;
                };
                body.motion.split();
                if !body.motion.has_pending() {
                    continue;
                }
                active = true;

                for axis in [Axis::Horizontal, Axis::Vertical] {
                    let unit = self.bodies.get_mut(id).and_then(|body| body.motion.take_unit(axis));
                    if let Some(sign) = unit {
                        self.move_unit(id, axis, sign, OnBlock::Respond);
                    }
                }
            }

            if !active {
                break;
            }
            rounds += 1;
            if rounds >= cap {
                for &id in movers {
                    if self.bodies.get(id).is_some_and(|body| body.motion.has_pending()) {
                        self.hit_iteration_cap(id);
                    }
                }
                break;
            }
        }
    }

    /// Spend all of one body's whole units
    ///
    /// The larger pending axis goes first. A unit that turns into a slide is
    /// followed straight away by the perpendicular unit it produced.
    pub(crate) fn run_sequential(&mut self, id: BodyId, on_block: OnBlock) {
        let cap = self.config.max_iterations;
        let Some(body) = self.bodies.get_mut(id) else {
            return;
        };
        body.motion.split();
        body.moving = true;

        let mut iterations = 0;
        loop {
            let Some(body) = self.bodies.get_mut(id) else {
                return;
            };
            if !body.motion.has_pending() {
                break;
            }
            if iterations >= cap {
                self.hit_iteration_cap(id);
                break;
            }
            iterations += 1;

            let motion = &mut body.motion;
            let axis = if motion.pending(Axis::Horizontal).abs() >= motion.pending(Axis::Vertical).abs() {
                Axis::Horizontal
            } else {
                Axis::Vertical
            };
            let Some(sign) = motion.take_unit(axis) else {
                break;
            };

            if self.move_unit(id, axis, sign, on_block) == StepOutcome::Slid {
                let across = axis.perpendicular();
                let follow = self.bodies.get_mut(id).and_then(|body| body.motion.take_unit(across));
                if let Some(sign) = follow {
                    self.move_unit(id, across, sign, on_block);
                }
            }
        }

        if let Some(body) = self.bodies.get_mut(id) {
            body.moving = false;
        }
    }

    /// Move an actor a fixed number of whole units, stopping when blocked
    pub(crate) fn displace(&mut self, id: BodyId, axis: Axis, sign: f32, units: u32, on_block: OnBlock) {
        let Some(body) = self.bodies.get_mut(id) else {
            return;
        };
        if body.actor.immovable || body.moving {
            return;
        }
        body.moving = true;

        for _ in 0..units.min(self.config.max_iterations) {
            if self.move_unit(id, axis, sign, on_block) == StepOutcome::Blocked {
                break;
            }
        }

        if let Some(body) = self.bodies.get_mut(id) {
            body.moving = false;
        }
    }

    fn hit_iteration_cap(&mut self, id: BodyId) {
        if let Some(body) = self.bodies.get_mut(id) {
            log::warn!(
                "Body {} hit the iteration cap, discarding ({}, {}) pending units",
                id,
                body.motion.pending(Axis::Horizontal),
                body.motion.pending(Axis::Vertical)
            );
            body.motion.discard_pending();
        }
        self.diagnostics.iteration_cap_hits += 1;
        self.events.push(PhysicsEvent::IterationCapReached { body: id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_rounds_toward_zero() {
        let mut motion = Motion::default();
        motion.accumulate(2.75, -1.5);
        assert_eq!(motion.pending(Axis::Horizontal), 2.0);
        assert_eq!(motion.remainder(Axis::Horizontal), 0.75);
        assert_eq!(motion.pending(Axis::Vertical), -1.0);
        assert_eq!(motion.remainder(Axis::Vertical), -0.5);
    }

    #[test]
    fn test_remainder_carries_between_ticks() {
        let mut motion = Motion::default();
        motion.accumulate(0.75, 0.0);
        assert!(!motion.has_pending());
        motion.accumulate(0.75, 0.0);
        assert_eq!(motion.pending(Axis::Horizontal), 1.0);
        assert_eq!(motion.remainder(Axis::Horizontal), 0.5);
    }

    #[test]
    fn test_take_unit() {
        let mut motion = Motion::default();
        motion.accumulate(-2.0, 0.0);
        assert_eq!(motion.take_unit(Axis::Horizontal), Some(-1.0));
        assert_eq!(motion.take_unit(Axis::Horizontal), Some(-1.0));
        assert_eq!(motion.take_unit(Axis::Horizontal), None);
        assert_eq!(motion.take_unit(Axis::Vertical), None);
    }

    #[test]
    fn test_split_recombines_pushes() {
        let mut motion = Motion::default();
        motion.accumulate(1.0, 0.0);
        motion.add_remainder(Axis::Horizontal, -1.5);
        motion.split();
        assert_eq!(motion.pending(Axis::Horizontal), 0.0);
        assert_eq!(motion.remainder(Axis::Horizontal), -0.5);
    }

    #[test]
    fn test_split_nearest() {
        let mut motion = Motion::default();
        motion.add_remainder(Axis::Horizontal, 1.5);
        motion.add_remainder(Axis::Vertical, -0.4);
        motion.split_nearest();
        assert_eq!(motion.take_all(Axis::Horizontal), 2.0);
        assert_eq!(motion.remainder(Axis::Horizontal), -0.5);
        assert_eq!(motion.pending(Axis::Vertical), 0.0);
        assert!(!motion.has_pending());
    }

    #[test]
    fn test_clamp_to_sign() {
        let mut motion = Motion::default();
        motion.accumulate(0.0, -3.5);
        motion.clamp_to_sign(Axis::Vertical, 1.0);
        assert!(!motion.has_pending());
        assert_eq!(motion.remainder(Axis::Vertical), 0.0);
    }
}
