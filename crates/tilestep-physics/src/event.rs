use serde::Serialize;
use tilestep_core::BodyId;

/// Something the host may want to react to, queued during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PhysicsEvent {
    Spawned { body: BodyId },
    Despawned { body: BodyId },
    Grounded { body: BodyId, ground: BodyId },
    Ungrounded { body: BodyId },
    /// Pushed by a solid into something that would not give way
    Squished { body: BodyId, against: BodyId },
    Wallplanted { body: BodyId, wall: BodyId },
    /// Pending movement was discarded after too many iterations
    IterationCapReached { body: BodyId },
}

impl PhysicsEvent {
    /// The body the event is about
    pub fn body(&self) -> BodyId {
        match *self {
            PhysicsEvent::Spawned { body }
            | PhysicsEvent::Despawned { body }
            | PhysicsEvent::Grounded { body, .. }
            | PhysicsEvent::Ungrounded { body }
            | PhysicsEvent::Squished { body, .. }
            | PhysicsEvent::Wallplanted { body, .. }
            | PhysicsEvent::IterationCapReached { body } => body,
        }
    }
}

/// Running counters, useful for profiling and for spotting resolution trouble
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub ticks: u64,
    /// Unit steps actually travelled
    pub steps: u64,
    pub slides: u64,
    pub pushes: u64,
    pub blocks: u64,
    pub iteration_cap_hits: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_body() {
        let body = BodyId::new(3, 1);
        let event = PhysicsEvent::Grounded {
            body,
            ground: BodyId::new(0, 0),
        };
        assert_eq!(event.body(), body);
    }

    #[test]
    fn test_event_serializes_tagged() {
        let event = PhysicsEvent::Ungrounded { body: BodyId::new(1, 0) };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["event"], "ungrounded");
    }
}
