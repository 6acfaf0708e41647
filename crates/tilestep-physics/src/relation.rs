//! Attachments
//!
//! "Carries / is carried by" is one symmetric relation stored once per pair,
//! so it reads the same from either side. Insertion order is kept so that
//! carrying riders happens in a stable order.

use indexmap::IndexSet;
use tilestep_core::BodyId;

fn key(a: BodyId, b: BodyId) -> (BodyId, BodyId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Set of unordered body pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationTable {
    pairs: IndexSet<(BodyId, BodyId)>,
}

impl RelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relate two bodies; false if they already were, or are the same body
    pub fn attach(&mut self, a: BodyId, b: BodyId) -> bool {
        if a == b {
            return false;
        }
        self.pairs.insert(key(a, b))
    }

    /// Remove a relation; false if there was none
    pub fn detach(&mut self, a: BodyId, b: BodyId) -> bool {
        self.pairs.shift_remove(&key(a, b))
    }

    pub fn is_attached(&self, a: BodyId, b: BodyId) -> bool {
        self.pairs.contains(&key(a, b))
    }

    /// Every body related to `id`, in the order the relations were made
    pub fn attached_to(&self, id: BodyId) -> impl Iterator<Item = BodyId> + '_ {
        self.pairs.iter().filter_map(move |&(a, b)| {
            if a == id {
                Some(b)
            } else if b == id {
                Some(a)
            } else {
                None
            }
        })
    }

    /// Drop every relation involving `id`
    pub fn detach_all(&mut self, id: BodyId) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|&(a, b)| a != id && b != id);
        before - self.pairs.len()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
