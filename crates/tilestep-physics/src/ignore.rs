use indexmap::IndexMap;
use tilestep_core::{BodyId, Timer};

/// Collision exemptions, one way: the owner passes through the other body
///
/// An exemption is either permanent or runs on a timer and lifts itself when
/// the timer expires.
#[derive(Debug, Clone, Default)]
pub struct IgnoreTable {
    entries: IndexMap<(BodyId, BodyId), Option<Timer>>,
}

impl IgnoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exempt `owner` from colliding with `other`
    ///
    /// A positive duration restarts the timer. No duration makes the exemption
    /// permanent, cancelling any running timer.
    pub fn ignore(&mut self, owner: BodyId, other: BodyId, duration: Option<f32>) {
        let timer = duration.filter(|seconds| *seconds > 0.0).map(|seconds| {
            let mut timer = Timer::new(seconds);
            timer.start();
            timer
        });
        self.entries.insert((owner, other), timer);
    }

    /// Lift an exemption; false if there was none
    pub fn unignore(&mut self, owner: BodyId, other: BodyId) -> bool {
        self.entries.shift_remove(&(owner, other)).is_some()
    }

    pub fn is_ignored(&self, owner: BodyId, other: BodyId) -> bool {
        self.entries.contains_key(&(owner, other))
    }

    /// Bodies `owner` currently passes through
    pub fn ignored_by(&self, owner: BodyId) -> impl Iterator<Item = BodyId> + '_ {
        self.entries
            .keys()
            .filter(move |(first, _)| *first == owner)
            .map(|&(_, other)| other)
    }

    /// Advance timers and lift the expired exemptions, returning them
    pub fn tick(&mut self, dt: f32) -> Vec<(BodyId, BodyId)> {
        let mut expired = Vec::new();
        for (pair, timer) in self.entries.iter_mut() {
            if timer.as_mut().is_some_and(|timer| timer.tick(dt)) {
                expired.push(*pair);
            }
        }
        for pair in &expired {
            self.entries.shift_remove(pair);
        }
        expired
    }

    /// Forget a body on either side of any exemption
    pub fn remove_body(&mut self, id: BodyId) {
        self.entries.retain(|&(owner, other), _| owner != id && other != id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> BodyId {
        BodyId::new(index, 0)
    }

    #[test]
    fn test_ignore_is_one_way() {
        let mut table = IgnoreTable::new();
        table.ignore(id(1), id(2), None);
        assert!(table.is_ignored(id(1), id(2)));
        assert!(!table.is_ignored(id(2), id(1)));
        assert_eq!(table.ignored_by(id(1)).collect::<Vec<_>>(), vec![id(2)]);
    }

    #[test]
    fn test_timed_ignore_expires() {
        let mut table = IgnoreTable::new();
        table.ignore(id(1), id(2), Some(0.5));

        assert!(table.tick(0.25).is_empty());
        assert!(table.is_ignored(id(1), id(2)));
        assert_eq!(table.tick(0.25), vec![(id(1), id(2))]);
        assert!(!table.is_ignored(id(1), id(2)));
    }

    #[test]
    fn test_permanent_ignore_cancels_timer() {
        let mut table = IgnoreTable::new();
        table.ignore(id(1), id(2), Some(0.1));
        table.ignore(id(1), id(2), None);

        assert!(table.tick(1.0).is_empty());
        assert!(table.is_ignored(id(1), id(2)));
        assert!(table.unignore(id(1), id(2)));
        assert!(!table.unignore(id(1), id(2)));
    }

    #[test]
    fn test_remove_body() {
        let mut table = IgnoreTable::new();
        table.ignore(id(1), id(2), None);
        table.ignore(id(3), id(1), Some(1.0));
        table.ignore(id(3), id(4), None);

        table.remove_body(id(1));
        assert_eq!(table.len(), 1);
        assert!(table.is_ignored(id(3), id(4)));
    }
}
