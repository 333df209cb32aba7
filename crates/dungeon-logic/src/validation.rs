//! Structural validation for authored dungeons.
//!
//! The crawl engine assumes well-formed topology. Loaders and builders run
//! these checks first; each returns a list of problems rather than stopping
//! at the first one.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{Dungeon, EventId, EventKind};

/// A dungeon validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl ValidationError {
    pub(crate) fn error(category: &'static str, message: String) -> Self {
        Self {
            category,
            severity: Severity::Error,
            message,
        }
    }

    fn warning(category: &'static str, message: String) -> Self {
        Self {
            category,
            severity: Severity::Warning,
            message,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{}] {}: {}", level, self.category, self.message)
    }
}

// ── A. Topology ─────────────────────────────────────────────────────────

/// Check that every door leads to a room of the same dungeon.
pub fn check_door_destinations(dungeon: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (room_id, room) in dungeon.rooms.iter().enumerate() {
        for (door_index, door) in room.doors.iter().enumerate() {
            if door.destination >= dungeon.rooms.len() {
                errors.push(ValidationError::error(
                    "door_validity",
                    format!(
                        "Door #{} of room #{} leads to non-existent room {}",
                        door_index, room_id, door.destination
                    ),
                ));
            }
        }
    }
    errors
}

/// Check that entrance and exit name real rooms.
pub fn check_entrance_exit(dungeon: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let count = dungeon.rooms.len();
    if dungeon.entrance >= count {
        errors.push(ValidationError::error(
            "endpoints",
            format!("Entrance room {} does not exist ({} rooms)", dungeon.entrance, count),
        ));
    }
    if dungeon.exit >= count {
        errors.push(ValidationError::error(
            "endpoints",
            format!("Exit room {} does not exist ({} rooms)", dungeon.exit, count),
        ));
    }
    errors
}

/// Warn about doors that lead into placeholder rooms.
pub fn check_unused_rooms_isolated(dungeon: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (room_id, room) in dungeon.rooms.iter().enumerate() {
        for door in &room.doors {
            if dungeon.room(door.destination).is_some_and(|r| r.unused) {
                errors.push(ValidationError::warning(
                    "door_validity",
                    format!(
                        "Room #{} has a door into unused room #{}",
                        room_id, door.destination
                    ),
                ));
            }
        }
    }
    errors
}

// ── B. Events ───────────────────────────────────────────────────────────

/// Check that no event id is held twice.
pub fn check_duplicate_events(dungeon: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashMap<EventId, usize> = HashMap::new();
    for (room_id, room) in dungeon.rooms.iter().enumerate() {
        for event in &room.events {
            if let Some(first) = seen.insert(event.id(), room_id) {
                errors.push(ValidationError::error(
                    "event_validity",
                    format!(
                        "Event {} appears in room #{} and again in room #{}",
                        event.id(),
                        first,
                        room_id
                    ),
                ));
            }
        }
    }
    errors
}

/// Check state counts per kind and that every state is in range.
pub fn check_event_states(dungeon: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for event in dungeon.events() {
        let count_ok = match event.kind() {
            EventKind::Item => event.state_count() == 2,
            EventKind::Switch => event.state_count() >= 2,
        };
        if !count_ok {
            errors.push(ValidationError::error(
                "event_validity",
                format!(
                    "Event {} ({:?}) has invalid state count {}",
                    event.id(),
                    event.kind(),
                    event.state_count()
                ),
            ));
        }
        if event.state() >= event.state_count() {
            errors.push(ValidationError::error(
                "event_validity",
                format!(
                    "Event {} is in state {} but only has {} states",
                    event.id(),
                    event.state(),
                    event.state_count()
                ),
            ));
        }
    }
    errors
}

/// Check that locks only name existing events and reachable states.
pub fn check_lock_requirements(dungeon: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let counts: HashMap<EventId, u8> = dungeon
        .events()
        .map(|e| (e.id(), e.state_count()))
        .collect();

    for (room_id, room) in dungeon.rooms.iter().enumerate() {
        for (door_index, door) in room.doors.iter().enumerate() {
            for req in door.lock.iter() {
                match counts.get(&req.event) {
                    None => errors.push(ValidationError::error(
                        "lock_validity",
                        format!(
                            "Door #{} of room #{} requires unknown event {}",
                            door_index, room_id, req.event
                        ),
                    )),
                    Some(&count) if req.state >= count => {
                        errors.push(ValidationError::error(
                            "lock_validity",
                            format!(
                                "Door #{} of room #{} requires event {} in state {} (has {})",
                                door_index, room_id, req.event, req.state, count
                            ),
                        ))
                    }
                    Some(_) => {}
                }
            }
        }
    }
    errors
}

// ── C. Connectivity ─────────────────────────────────────────────────────

/// Warn if the exit cannot be reached from the entrance even with every
/// lock open.
pub fn check_exit_reachable(dungeon: &Dungeon) -> Vec<ValidationError> {
    let count = dungeon.rooms.len();
    if dungeon.entrance >= count || dungeon.exit >= count {
        return Vec::new(); // caught by endpoint check
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(dungeon.entrance);
    queue.push_back(dungeon.entrance);

    while let Some(current) = queue.pop_front() {
        for door in &dungeon.rooms[current].doors {
            if door.destination < count && visited.insert(door.destination) {
                queue.push_back(door.destination);
            }
        }
    }

    if visited.contains(&dungeon.exit) {
        Vec::new()
    } else {
        vec![ValidationError::warning(
            "connectivity",
            format!(
                "Exit room #{} is unreachable from entrance #{} even with all locks open",
                dungeon.exit, dungeon.entrance
            ),
        )]
    }
}

/// Run every check.
pub fn validate_dungeon(dungeon: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    errors.extend(check_door_destinations(dungeon));
    errors.extend(check_entrance_exit(dungeon));
    errors.extend(check_unused_rooms_isolated(dungeon));
    errors.extend(check_duplicate_events(dungeon));
    errors.extend(check_event_states(dungeon));
    errors.extend(check_lock_requirements(dungeon));
    errors.extend(check_exit_reachable(dungeon));
    errors
}

/// True if any problem is error-severity.
pub fn has_errors(errors: &[ValidationError]) -> bool {
    errors.iter().any(|e| e.severity == Severity::Error)
}
