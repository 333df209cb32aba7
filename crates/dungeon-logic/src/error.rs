//! Errors raised by the crawl engine.

use crate::model::{EventId, RoomId};

/// Everything that can go wrong while building a crawl or generating routes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrawlError {
    /// Neither search mode found a route between the two rooms.
    #[error("no path from room {from} to room {to}")]
    PathNotFound { from: RoomId, to: RoomId },

    /// The same detour was requested twice in one generation: the lock
    /// dependencies are circular.
    #[error("event trap: detour from room {from} to room {to} requested twice")]
    EventTrap { from: RoomId, to: RoomId },

    #[error("traversal nesting exceeded {max} levels")]
    TraversalTooDeep { max: usize },

    #[error("traversal grew past {max} steps")]
    TraversalTooLong { max: usize },

    #[error("door in room {room} leads to missing room {destination}")]
    DanglingDoor { room: RoomId, destination: RoomId },

    #[error("event {0} is held by more than one room")]
    DuplicateEvent(EventId),

    #[error("unknown event {0}")]
    UnknownEvent(EventId),

    #[error("unknown room {0}")]
    UnknownRoom(RoomId),

    #[error("room {room} has no door #{index}")]
    UnknownDoor { room: RoomId, index: usize },

    #[error("lock names event {0} more than once")]
    DuplicateRequirement(EventId),

    #[error("event {event} has {state_count} states, cannot set state {state}")]
    StateOutOfRange {
        event: EventId,
        state: u8,
        state_count: u8,
    },
}

impl CrawlError {
    /// Bound violations end the crawl session; the crawl must be rebuilt.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CrawlError::TraversalTooDeep { .. } | CrawlError::TraversalTooLong { .. }
        )
    }
}
