//! Dungeon graph model: rooms, doors, lock specifications, and events.
//!
//! A [`Dungeon`] is plain topology. Once built it is never mutated; a crawl
//! session wraps it in a [`CrawlDungeon`](crate::crawl::CrawlDungeon) and
//! mutates only the live copies of its events.

use serde::{Deserialize, Serialize};

use crate::error::CrawlError;

/// Index of a room within its dungeon's room sequence.
pub type RoomId = usize;

/// Identifier of an event, unique within a dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u32);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Events ──────────────────────────────────────────────────────────────

/// The two flavours of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Binary and collectable: once moved from 0 to 1 it stays collected.
    Item,
    /// Multi-state and repeatable.
    Switch,
}

/// A stateful object that gates doors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub(crate) id: EventId,
    pub(crate) kind: EventKind,
    pub(crate) state_count: u8,
    #[serde(default)]
    pub(crate) state: u8,
}

impl Event {
    /// A two-state collectable item, initially uncollected.
    pub fn item(id: EventId) -> Self {
        Self {
            id,
            kind: EventKind::Item,
            state_count: 2,
            state: 0,
        }
    }

    /// A switch with `state_count` positions (at least 2), initially at 0.
    pub fn switch(id: EventId, state_count: u8) -> Self {
        Self {
            id,
            kind: EventKind::Switch,
            state_count: state_count.max(2),
            state: 0,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn state(&self) -> u8 {
        self.state
    }

    pub fn state_count(&self) -> u8 {
        self.state_count
    }

    /// Items are collectable, switches never are.
    pub fn is_collectable(&self) -> bool {
        self.kind == EventKind::Item
    }

    /// True for an item that has been picked up.
    pub fn is_collected(&self) -> bool {
        self.is_collectable() && self.state == 1
    }

    /// Set the current state, rejecting anything outside `[0, state_count)`.
    pub fn set_state(&mut self, state: u8) -> Result<(), CrawlError> {
        if state >= self.state_count {
            return Err(CrawlError::StateOutOfRange {
                event: self.id,
                state,
                state_count: self.state_count,
            });
        }
        self.state = state;
        Ok(())
    }

    /// Act on the event once: switches cycle, items get collected.
    ///
    /// A switch wraps to 0 past its last state. Deserialized events with a
    /// bogus state count wrap to 0 as well instead of panicking.
    pub fn advance(&mut self) {
        self.state = match self.kind {
            EventKind::Item => 1,
            EventKind::Switch => self
                .state
                .checked_add(1)
                .filter(|next| *next < self.state_count)
                .unwrap_or(0),
        };
    }

    /// Builder-style initial state, used when authoring dungeons.
    pub fn with_state(mut self, state: u8) -> Self {
        self.state = state;
        self
    }
}

// ── Lock specifications ─────────────────────────────────────────────────

/// One `(event, required state)` pair of a lock specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirement {
    pub event: EventId,
    pub state: u8,
}

/// A set of event requirements that must all hold for a door to open.
///
/// Requirements keep their insertion order (it decides which event a detour
/// goes after first) but equality ignores it. An empty spec is "clear".
///
/// Serialized as a plain list. A list naming the same event twice is
/// rejected on load.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Requirement>", into = "Vec<Requirement>")]
pub struct LockSpec {
    requirements: Vec<Requirement>,
}

impl LockSpec {
    /// The clear spec: never restricts passage.
    pub fn clear() -> Self {
        Self::default()
    }

    /// A spec holding a single requirement.
    pub fn single(event: EventId, state: u8) -> Self {
        Self::clear().require(event, state)
    }

    /// Add a requirement, replacing any earlier one on the same event.
    pub fn require(mut self, event: EventId, state: u8) -> Self {
        self.set(event, state);
        self
    }

    /// In-place form of [`require`](Self::require).
    pub fn set(&mut self, event: EventId, state: u8) {
        match self.requirements.iter_mut().find(|r| r.event == event) {
            Some(existing) => existing.state = state,
            None => self.requirements.push(Requirement { event, state }),
        }
    }

    pub fn is_clear(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_clear()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter()
    }

    /// Required state for `event`, if this spec mentions it.
    pub fn get(&self, event: EventId) -> Option<u8> {
        self.requirements
            .iter()
            .find(|r| r.event == event)
            .map(|r| r.state)
    }

    /// Fold another spec into this one; `other` wins on shared events.
    pub fn merge(&mut self, other: &LockSpec) {
        for r in &other.requirements {
            self.set(r.event, r.state);
        }
    }
}

impl PartialEq for LockSpec {
    fn eq(&self, other: &Self) -> bool {
        self.requirements.len() == other.requirements.len()
            && self
                .requirements
                .iter()
                .all(|r| other.get(r.event) == Some(r.state))
    }
}

impl TryFrom<Vec<Requirement>> for LockSpec {
    type Error = CrawlError;

    fn try_from(requirements: Vec<Requirement>) -> Result<Self, Self::Error> {
        for (i, r) in requirements.iter().enumerate() {
            if requirements[..i].iter().any(|earlier| earlier.event == r.event) {
                return Err(CrawlError::DuplicateRequirement(r.event));
            }
        }
        Ok(Self { requirements })
    }
}

impl From<LockSpec> for Vec<Requirement> {
    fn from(spec: LockSpec) -> Self {
        spec.requirements
    }
}

impl FromIterator<(EventId, u8)> for LockSpec {
    fn from_iter<I: IntoIterator<Item = (EventId, u8)>>(iter: I) -> Self {
        let mut spec = LockSpec::clear();
        for (event, state) in iter {
            spec.set(event, state);
        }
        spec
    }
}

// ── Topology ────────────────────────────────────────────────────────────

/// A directed edge to another room in the same dungeon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub destination: RoomId,
    #[serde(default)]
    pub lock: LockSpec,
}

impl Door {
    /// A door that never restricts passage.
    pub fn open(destination: RoomId) -> Self {
        Self {
            destination,
            lock: LockSpec::clear(),
        }
    }

    pub fn locked(destination: RoomId, lock: LockSpec) -> Self {
        Self { destination, lock }
    }
}

/// A graph node: its outgoing doors in definition order and the events it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub doors: Vec<Door>,
    #[serde(default)]
    pub events: Vec<Event>,
    /// Placeholder room used to pad irregular grids.
    #[serde(default)]
    pub unused: bool,
}

impl Room {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn holds_event(&self, event: EventId) -> bool {
        self.events.iter().any(|e| e.id == event)
    }
}

/// Geometry metadata carried for the editor and renderer; ignored by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    #[default]
    Freeform,
    Grid {
        width: u32,
        height: u32,
    },
}

/// A complete dungeon: named room sequence plus entrance and exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    pub name: String,
    pub rooms: Vec<Room>,
    pub entrance: RoomId,
    pub exit: RoomId,
    #[serde(default)]
    pub layout: Layout,
}

impl Dungeon {
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Every event in room order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.rooms.iter().flat_map(|r| r.events.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_collects_once() {
        let mut item = Event::item(EventId(1));
        assert!(item.is_collectable());
        assert!(!item.is_collected());
        item.advance();
        assert!(item.is_collected());
        item.advance();
        assert_eq!(item.state(), 1);
    }

    #[test]
    fn test_switch_cycles() {
        let mut switch = Event::switch(EventId(2), 3);
        assert!(!switch.is_collectable());
        switch.advance();
        switch.advance();
        assert_eq!(switch.state(), 2);
        switch.advance();
        assert_eq!(switch.state(), 0);
    }

    #[test]
    fn test_advance_survives_zero_state_count() {
        let mut switch: Event = serde_json::from_str(
            r#"{ "id": 5, "kind": "Switch", "state_count": 0, "state": 255 }"#,
        )
        .unwrap();
        switch.advance();
        assert_eq!(switch.state(), 0);
        switch.advance();
        assert_eq!(switch.state(), 0);
    }

    #[test]
    fn test_switch_has_at_least_two_states() {
        assert_eq!(Event::switch(EventId(3), 1).state_count(), 2);
    }

    #[test]
    fn test_set_state_out_of_range() {
        let mut item = Event::item(EventId(4));
        let err = item.set_state(2).unwrap_err();
        assert_eq!(
            err,
            CrawlError::StateOutOfRange {
                event: EventId(4),
                state: 2,
                state_count: 2
            }
        );
        assert_eq!(item.state(), 0);
    }

    #[test]
    fn test_lock_spec_unique_events() {
        let spec = LockSpec::clear()
            .require(EventId(1), 1)
            .require(EventId(2), 0)
            .require(EventId(1), 0);
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.get(EventId(1)), Some(0));
    }

    #[test]
    fn test_lock_spec_equality_ignores_order() {
        let a = LockSpec::clear().require(EventId(1), 1).require(EventId(2), 1);
        let b = LockSpec::clear().require(EventId(2), 1).require(EventId(1), 1);
        assert_eq!(a, b);
        assert_ne!(a, LockSpec::single(EventId(1), 1));
        assert!(LockSpec::clear().is_clear());
    }

    #[test]
    fn test_lock_spec_json_rejects_repeated_event() {
        let err = serde_json::from_str::<LockSpec>(
            r#"[ { "event": 1, "state": 1 }, { "event": 1, "state": 0 } ]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("event 1 more than once"));

        let spec: LockSpec = serde_json::from_str(
            r#"[ { "event": 2, "state": 0 }, { "event": 1, "state": 1 } ]"#,
        )
        .unwrap();
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.iter().next().map(|r| r.event), Some(EventId(2)));
        assert_eq!(
            serde_json::to_string(&spec).unwrap(),
            r#"[{"event":2,"state":0},{"event":1,"state":1}]"#
        );
    }

    #[test]
    fn test_lock_spec_merge() {
        let mut a = LockSpec::single(EventId(1), 1);
        a.merge(&LockSpec::clear().require(EventId(1), 0).require(EventId(3), 1));
        assert_eq!(a.get(EventId(1)), Some(0));
        assert_eq!(a.get(EventId(3)), Some(1));
    }

    #[test]
    fn test_room_holds_event() {
        let mut room = Room::new("vault");
        room.events.push(Event::item(EventId(9)));
        assert!(room.holds_event(EventId(9)));
        assert!(!room.holds_event(EventId(1)));
    }
}
