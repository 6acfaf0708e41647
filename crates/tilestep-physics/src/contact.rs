use smallvec::SmallVec;
use tilestep_core::BodyId;

/// A collider pair found touching, seen from the local body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contact {
    pub local: BodyId,
    pub local_collider: usize,
    pub remote: BodyId,
    pub remote_collider: usize,
}

impl Contact {
    pub fn new(local: BodyId, local_collider: usize, remote: BodyId, remote_collider: usize) -> Self {
        Self {
            local,
            local_collider,
            remote,
            remote_collider,
        }
    }

    /// The same contact seen from the remote body
    pub fn inverse(&self) -> Contact {
        Contact::new(self.remote, self.remote_collider, self.local, self.local_collider)
    }
}

pub type Contacts = SmallVec<[Contact; 4]>;
