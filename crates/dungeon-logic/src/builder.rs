//! Programmatic dungeon construction.
//!
//! `DungeonBuilder` hands out room ids in insertion order and event ids from
//! its own counter, then validates the result on [`build`](DungeonBuilder::build).
//! Calls naming a room or event the builder does not know are dropped,
//! logged, and reported as errors by `build`.
//!
//! ```
//! use dungeon_logic::builder::DungeonBuilder;
//! use dungeon_logic::model::LockSpec;
//!
//! let mut b = DungeonBuilder::new("Gatehouse");
//! let hall = b.add_room("Hall");
//! let closet = b.add_room("Closet");
//! let yard = b.add_room("Yard");
//! let key = b.add_item(closet);
//! b.add_door(hall, closet, LockSpec::clear());
//! b.add_door(closet, hall, LockSpec::clear());
//! b.add_door(hall, yard, LockSpec::single(key, 1));
//! b.entrance(hall).exit(yard);
//! let dungeon = b.build().unwrap();
//! assert_eq!(dungeon.room_count(), 3);
//! ```

use crate::model::{Door, Dungeon, Event, EventId, Layout, LockSpec, Room, RoomId};
use crate::validation::{has_errors, validate_dungeon, ValidationError};

/// Incrementally assembles a [`Dungeon`].
#[derive(Debug, Clone)]
pub struct DungeonBuilder {
    name: String,
    rooms: Vec<Room>,
    entrance: RoomId,
    exit: RoomId,
    layout: Layout,
    next_event: u32,
    dropped: Vec<ValidationError>,
}

impl DungeonBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rooms: Vec::new(),
            entrance: 0,
            exit: 0,
            layout: Layout::Freeform,
            next_event: 1,
            dropped: Vec::new(),
        }
    }

    pub fn layout(&mut self, layout: Layout) -> &mut Self {
        self.layout = layout;
        self
    }

    pub fn add_room(&mut self, name: impl Into<String>) -> RoomId {
        self.rooms.push(Room::new(name));
        self.rooms.len() - 1
    }

    /// Placeholder room for padding irregular grids.
    pub fn add_unused_room(&mut self) -> RoomId {
        let id = self.add_room("");
        self.rooms[id].unused = true;
        id
    }

    /// Add a one-way door. Doors are tried in the order they are added.
    pub fn add_door(&mut self, from: RoomId, to: RoomId, lock: LockSpec) -> &mut Self {
        match self.rooms.get_mut(from) {
            Some(room) => room.doors.push(Door::locked(to, lock)),
            None => self.drop_call(format!("door from unknown room #{} to #{}", from, to)),
        }
        self
    }

    /// Add a pair of opposite doors sharing one lock.
    pub fn add_passage(&mut self, a: RoomId, b: RoomId, lock: LockSpec) -> &mut Self {
        self.add_door(a, b, lock.clone());
        self.add_door(b, a, lock)
    }

    /// Place a fresh item in `room` and return its id.
    pub fn add_item(&mut self, room: RoomId) -> EventId {
        let id = self.next_event_id();
        self.place(room, Event::item(id));
        id
    }

    /// Place a fresh switch in `room` and return its id.
    pub fn add_switch(&mut self, room: RoomId, state_count: u8) -> EventId {
        let id = self.next_event_id();
        self.place(room, Event::switch(id, state_count));
        id
    }

    /// Set an event's starting state.
    pub fn initial_state(&mut self, event: EventId, state: u8) -> &mut Self {
        let found = self
            .rooms
            .iter_mut()
            .flat_map(|r| r.events.iter_mut())
            .find(|e| e.id() == event);
        match found {
            Some(e) => e.state = state,
            None => self.drop_call(format!("initial state {} for unknown event {}", state, event)),
        }
        self
    }

    pub fn entrance(&mut self, room: RoomId) -> &mut Self {
        self.entrance = room;
        self
    }

    pub fn exit(&mut self, room: RoomId) -> &mut Self {
        self.exit = room;
        self
    }

    /// Validate and produce the dungeon. Warnings do not block the build.
    pub fn build(&self) -> Result<Dungeon, Vec<ValidationError>> {
        let dungeon = Dungeon {
            name: self.name.clone(),
            rooms: self.rooms.clone(),
            entrance: self.entrance,
            exit: self.exit,
            layout: self.layout,
        };
        let mut errors = self.dropped.clone();
        errors.extend(validate_dungeon(&dungeon));
        if has_errors(&errors) {
            return Err(errors);
        }
        for warning in &errors {
            log::warn!("{}: {}", dungeon.name, warning);
        }
        Ok(dungeon)
    }

    fn next_event_id(&mut self) -> EventId {
        let id = EventId(self.next_event);
        self.next_event += 1;
        id
    }

    fn place(&mut self, room: RoomId, event: Event) {
        match self.rooms.get_mut(room) {
            Some(r) => r.events.push(event),
            None => self.drop_call(format!("event {} placed in unknown room #{}", event.id(), room)),
        }
    }

    fn drop_call(&mut self, message: String) {
        log::warn!("{}: ignoring {}", self.name, message);
        self.dropped
            .push(ValidationError::error("builder", format!("Ignored {}", message)));
    }
}
