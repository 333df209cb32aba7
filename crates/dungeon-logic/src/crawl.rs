//! Live crawl context.
//!
//! `CrawlDungeon` wraps a [`Dungeon`] for one crawl session. Event state lives
//! in a single table keyed by event id; crawl rooms refer to their events by
//! id only, so a mutation through the table is what every room observes.
//! There is no second copy to drift out of sync.

use std::collections::HashMap;

use crate::error::CrawlError;
use crate::model::{Dungeon, Event, EventId, LockSpec, RoomId};

/// A door with its destination resolved against the crawl's rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlDoor {
    /// Room the door leaves from.
    pub from: RoomId,
    /// Position of the door in its room's definition order.
    pub index: usize,
    pub destination: RoomId,
    pub lock: LockSpec,
}

impl CrawlDoor {
    /// True when the door carries any requirement at all.
    pub fn is_lockable(&self) -> bool {
        !self.lock.is_clear()
    }
}

/// A room as seen during a crawl.
#[derive(Debug, Clone)]
pub struct CrawlRoom {
    pub id: RoomId,
    pub name: String,
    pub doors: Vec<CrawlDoor>,
    /// Handles into the crawl's event table.
    pub events: Vec<EventId>,
    pub unused: bool,
}

/// One crawl session's view of a dungeon plus the live event table.
#[derive(Debug, Clone)]
pub struct CrawlDungeon {
    name: String,
    rooms: Vec<CrawlRoom>,
    events: HashMap<EventId, Event>,
    initial: HashMap<EventId, u8>,
    entrance: RoomId,
    exit: RoomId,
}

impl CrawlDungeon {
    /// Wrap every room and door and collect events, visiting rooms in order.
    pub fn build(dungeon: &Dungeon) -> Result<Self, CrawlError> {
        let room_count = dungeon.rooms.len();
        let mut rooms = Vec::with_capacity(room_count);
        let mut events = HashMap::new();
        let mut initial = HashMap::new();

        for (id, room) in dungeon.rooms.iter().enumerate() {
            let mut doors = Vec::with_capacity(room.doors.len());
            for (index, door) in room.doors.iter().enumerate() {
                if door.destination >= room_count {
                    return Err(CrawlError::DanglingDoor {
                        room: id,
                        destination: door.destination,
                    });
                }
                doors.push(CrawlDoor {
                    from: id,
                    index,
                    destination: door.destination,
                    lock: door.lock.clone(),
                });
            }

            let mut handles = Vec::with_capacity(room.events.len());
            for event in &room.events {
                if events.insert(event.id(), event.clone()).is_some() {
                    return Err(CrawlError::DuplicateEvent(event.id()));
                }
                initial.insert(event.id(), event.state());
                handles.push(event.id());
            }

            rooms.push(CrawlRoom {
                id,
                name: room.name.clone(),
                doors,
                events: handles,
                unused: room.unused,
            });
        }

        log::debug!(
            "crawl '{}' built: {} rooms, {} events",
            dungeon.name,
            rooms.len(),
            events.len()
        );

        Ok(Self {
            name: dungeon.name.clone(),
            rooms,
            events,
            initial,
            entrance: dungeon.entrance,
            exit: dungeon.exit,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entrance(&self) -> RoomId {
        self.entrance
    }

    pub fn exit(&self) -> RoomId {
        self.exit
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn rooms(&self) -> &[CrawlRoom] {
        &self.rooms
    }

    pub fn room(&self, id: RoomId) -> Result<&CrawlRoom, CrawlError> {
        self.rooms.get(id).ok_or(CrawlError::UnknownRoom(id))
    }

    /// The `index`-th door of room `from`.
    pub fn door(&self, from: RoomId, index: usize) -> Result<&CrawlDoor, CrawlError> {
        self.room(from)?
            .doors
            .get(index)
            .ok_or(CrawlError::UnknownDoor { room: from, index })
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    /// Events held by a room, resolved through the live table.
    pub fn room_events(&self, room: RoomId) -> Result<Vec<&Event>, CrawlError> {
        self.room(room)?
            .events
            .iter()
            .map(|id| self.events.get(id).ok_or(CrawlError::UnknownEvent(*id)))
            .collect()
    }

    /// Set every referenced event to its required state. A clear spec is a no-op.
    ///
    /// Every requirement is checked before any state changes, so a bad spec
    /// leaves the table untouched.
    pub fn apply_lock_spec(&mut self, spec: &LockSpec) -> Result<(), CrawlError> {
        for req in spec.iter() {
            let event = self
                .events
                .get(&req.event)
                .ok_or(CrawlError::UnknownEvent(req.event))?;
            if req.state >= event.state_count() {
                return Err(CrawlError::StateOutOfRange {
                    event: req.event,
                    state: req.state,
                    state_count: event.state_count(),
                });
            }
        }
        for req in spec.iter() {
            if let Some(event) = self.events.get_mut(&req.event) {
                log::trace!("event {} -> state {}", req.event, req.state);
                event.set_state(req.state)?;
            }
        }
        Ok(())
    }

    /// True if the spec is clear or every event is currently in its required
    /// state. Always reads live state.
    pub fn is_aligned(&self, spec: &LockSpec) -> bool {
        spec.iter().all(|req| {
            self.events
                .get(&req.event)
                .is_some_and(|e| e.state() == req.state)
        })
    }

    /// Whether the door can be walked through right now.
    pub fn is_passable(&self, door: &CrawlDoor) -> bool {
        self.is_aligned(&door.lock)
    }

    /// Linear scan for the room that owns `event`.
    pub fn lookup_room_holding_event(&self, event: EventId) -> Result<&CrawlRoom, CrawlError> {
        self.rooms
            .iter()
            .find(|r| r.events.contains(&event))
            .ok_or(CrawlError::UnknownEvent(event))
    }

    /// Put every event back in the state the dungeon was authored with.
    pub fn reset(&mut self) {
        for (id, event) in self.events.iter_mut() {
            if let Some(&state) = self.initial.get(id) {
                event.state = state;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DungeonBuilder;

    /// Two rooms; room 1 holds an item and a 3-way switch.
    fn two_rooms() -> (CrawlDungeon, EventId, EventId) {
        let mut b = DungeonBuilder::new("pair");
        let a = b.add_room("a");
        let c = b.add_room("c");
        let item = b.add_item(c);
        let switch = b.add_switch(c, 3);
        b.add_door(a, c, LockSpec::single(item, 1));
        b.add_door(c, a, LockSpec::clear());
        let crawl = CrawlDungeon::build(&b.build().unwrap()).unwrap();
        (crawl, item, switch)
    }

    #[test]
    fn test_build_resolves_doors() {
        let (crawl, _, _) = two_rooms();
        let door = crawl.door(0, 0).unwrap();
        assert_eq!(door.destination, 1);
        assert!(door.is_lockable());
        assert!(!crawl.door(1, 0).unwrap().is_lockable());
        assert_eq!(crawl.room(1).unwrap().events.len(), 2);
    }

    #[test]
    fn test_missing_door_names_room_and_index() {
        let (crawl, _, _) = two_rooms();
        assert_eq!(
            crawl.door(0, 3).unwrap_err(),
            CrawlError::UnknownDoor { room: 0, index: 3 }
        );
        assert_eq!(crawl.door(7, 0).unwrap_err(), CrawlError::UnknownRoom(7));
    }

    #[test]
    fn test_apply_touches_only_named_events() {
        let (mut crawl, item, switch) = two_rooms();
        crawl.apply_lock_spec(&LockSpec::single(switch, 2)).unwrap();
        assert_eq!(crawl.event(switch).unwrap().state(), 2);
        assert_eq!(crawl.event(item).unwrap().state(), 0);
    }

    #[test]
    fn test_room_sees_table_mutation() {
        let (mut crawl, item, _) = two_rooms();
        crawl.apply_lock_spec(&LockSpec::single(item, 1)).unwrap();
        let held = crawl.room_events(1).unwrap();
        assert_eq!(held[0].id(), item);
        assert!(held[0].is_collected());
    }

    #[test]
    fn test_clear_spec_always_aligned() {
        let (mut crawl, _, switch) = two_rooms();
        assert!(crawl.is_aligned(&LockSpec::clear()));
        crawl.apply_lock_spec(&LockSpec::single(switch, 1)).unwrap();
        assert!(crawl.is_aligned(&LockSpec::clear()));
        crawl.apply_lock_spec(&LockSpec::clear()).unwrap();
        assert_eq!(crawl.event(switch).unwrap().state(), 1);
    }

    #[test]
    fn test_alignment_tracks_live_state() {
        let (mut crawl, item, _) = two_rooms();
        let door = crawl.door(0, 0).unwrap().clone();
        assert!(!crawl.is_passable(&door));
        crawl.apply_lock_spec(&LockSpec::single(item, 1)).unwrap();
        assert!(crawl.is_passable(&door));
    }

    #[test]
    fn test_bad_spec_leaves_state_untouched() {
        let (mut crawl, item, switch) = two_rooms();
        let spec = LockSpec::clear().require(switch, 1).require(item, 5);
        assert!(matches!(
            crawl.apply_lock_spec(&spec),
            Err(CrawlError::StateOutOfRange { .. })
        ));
        assert_eq!(crawl.event(switch).unwrap().state(), 0);

        let spec = LockSpec::single(EventId(99), 0);
        assert_eq!(
            crawl.apply_lock_spec(&spec),
            Err(CrawlError::UnknownEvent(EventId(99)))
        );
    }

    #[test]
    fn test_lookup_room_holding_event() {
        let (crawl, item, _) = two_rooms();
        assert_eq!(crawl.lookup_room_holding_event(item).unwrap().id, 1);
        assert!(crawl.lookup_room_holding_event(EventId(42)).is_err());
    }

    #[test]
    fn test_reset_restores_authored_state() {
        let (mut crawl, item, switch) = two_rooms();
        crawl
            .apply_lock_spec(&LockSpec::clear().require(item, 1).require(switch, 2))
            .unwrap();
        crawl.reset();
        assert_eq!(crawl.event(item).unwrap().state(), 0);
        assert_eq!(crawl.event(switch).unwrap().state(), 0);
    }

    #[test]
    fn test_dangling_door_rejected() {
        let mut dungeon = DungeonBuilder::new("x");
        dungeon.add_room("a");
        let mut d = dungeon.build().unwrap();
        d.rooms[0].doors.push(crate::model::Door::open(3));
        assert_eq!(
            CrawlDungeon::build(&d).unwrap_err(),
            CrawlError::DanglingDoor {
                room: 0,
                destination: 3
            }
        );
    }
}
