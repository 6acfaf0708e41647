//! Body handles
//!
//! Stable generational ids and the slot storage they index into.
//! Features:
//! - Index recycling with generation counters so stale ids never alias
//! - Deterministic allocation order (free list is LIFO)
//! - Iteration in slot order

use serde::{Deserialize, Serialize};

/// Body identifier with generation counter for stable ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId {
    /// Slot index
    index: u32,
    /// Generation counter to detect stale references
    generation: u32,
}

impl BodyId {
    /// Create an id with the given index and generation
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Get the slot index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Get the generation
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Create a null id (invalid reference)
    pub fn null() -> Self {
        Self {
            index: u32::MAX,
            generation: 0,
        }
    }

    /// Check if this is the null id
    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for BodyId {
    fn default() -> Self {
        Self::null()
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational slot storage
#[derive(Debug)]
pub struct SlotMap<T> {
    slots: Vec<Slot<T>>,
    free_indices: Vec<u32>,
    len: usize,
}

impl<T> SlotMap<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_indices: Vec::new(),
            len: 0,
        }
    }

    /// Insert a value built from its own id
    pub fn insert_with(&mut self, build: impl FnOnce(BodyId) -> T) -> BodyId {
        let id = if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            BodyId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: None,
            });
            BodyId::new(index, 0)
        };

        self.slots[id.index() as usize].value = Some(build(id));
        self.len += 1;
        id
    }

    /// Insert a value
    pub fn insert(&mut self, value: T) -> BodyId {
        self.insert_with(|_| value)
    }

    /// Remove a value, returning it if the id was live
    pub fn remove(&mut self, id: BodyId) -> Option<T> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let value = slot.value.take()?;
        self.free_indices.push(id.index());
        self.len -= 1;
        Some(value)
    }

    /// Check if an id refers to a live value
    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: BodyId) -> Option<&T> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.value.as_mut())
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate live values in slot order
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (BodyId::new(index as u32, slot.generation), value))
        })
    }
}

impl<T> Default for SlotMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut map = SlotMap::new();
        let id = map.insert("crate");

        assert!(!id.is_null());
        assert_eq!(map.get(id), Some(&"crate"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut map = SlotMap::new();
        let id = map.insert(7);

        assert_eq!(map.remove(id), Some(7));
        assert!(!map.contains(id));
        assert!(map.is_empty());
        assert_eq!(map.remove(id), None);
    }

    #[test]
    fn test_index_recycling() {
        let mut map = SlotMap::new();
        let first = map.insert(1);
        map.remove(first);
        let second = map.insert(2);

        // Same index, different generation
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());

        // Old id is no longer valid
        assert_eq!(map.get(first), None);
        assert_eq!(map.get(second), Some(&2));
    }

    #[test]
    fn test_insert_with_sees_own_id() {
        let mut map = SlotMap::new();
        let id = map.insert_with(|id| id);
        assert_eq!(map.get(id), Some(&id));
    }

    #[test]
    fn test_iteration_is_slot_ordered() {
        let mut map = SlotMap::new();
        let a = map.insert('a');
        let b = map.insert('b');
        let c = map.insert('c');
        map.remove(b);

        let ids: Vec<BodyId> = map.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);
    }
}
