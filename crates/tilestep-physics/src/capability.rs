//! Capability interfaces
//!
//! Read access to a body is split by concern rather than by kind, so code
//! that only cares whether something can be pushed or stood on does not need
//! to know which features the body was built with.

use tilestep_core::{Direction, Directions, Vec2};

use crate::body::Body;
use crate::contact::Contact;

/// Position and motion
pub trait Movable {
    fn position(&self) -> Vec2;
    /// Step units per tick
    fn velocity(&self) -> Vec2;
    /// Directions the body could move one unit in at the start of the tick
    fn moveable(&self) -> Directions;

    fn can_move(&self, direction: Direction) -> bool {
        self.moveable().contains(direction.into())
    }
}

/// Weight and push permissions
pub trait Pushable {
    fn weight(&self) -> f32;
    fn strength(&self) -> f32;
    fn is_pushable(&self) -> bool;
    fn can_push(&self) -> bool;
    fn is_immovable(&self) -> bool;
}

/// Ground tracking
pub trait Groundable {
    fn ground_contact(&self) -> Option<Contact>;

    fn is_grounded(&self) -> bool {
        self.ground_contact().is_some()
    }
}

/// Slide state for the current tick
pub trait Slideable {
    fn sliding(&self) -> Directions;

    fn is_sliding(&self, direction: Direction) -> bool {
        self.sliding().contains(direction.into())
    }

    fn is_sliding_up(&self) -> bool {
        self.is_sliding(Direction::Up)
    }

    fn is_sliding_down(&self) -> bool {
        self.is_sliding(Direction::Down)
    }
}

impl Movable for Body {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn moveable(&self) -> Directions {
        self.moveable
    }
}

impl Pushable for Body {
    fn weight(&self) -> f32 {
        self.actor.weight
    }

    fn strength(&self) -> f32 {
        self.actor.strength
    }

    fn is_pushable(&self) -> bool {
        self.is_actor() && self.actor.pushable
    }

    fn can_push(&self) -> bool {
        self.is_actor() && self.actor.can_push
    }

    fn is_immovable(&self) -> bool {
        !self.is_actor() || self.actor.immovable
    }
}

impl Groundable for Body {
    fn ground_contact(&self) -> Option<Contact> {
        self.ground
    }
}

impl Slideable for Body {
    fn sliding(&self) -> Directions {
        self.sliding
    }
}
