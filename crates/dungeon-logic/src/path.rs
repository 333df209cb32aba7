//! Depth-first route search over the door graph.
//!
//! Unlike a shortest-path search, doors are tried strictly in their
//! definition order and the first route that reaches the goal wins. Locks are
//! ignored here: the traversal generator decides how to get through them.
//!
//! Each search may carry per-room event changes ("mutations") that are
//! attached to the step entering that room, to be applied when the route is
//! walked.

use std::collections::BTreeMap;

use crate::crawl::CrawlDungeon;
use crate::error::CrawlError;
use crate::model::{LockSpec, RoomId};

/// Event changes to perform on arrival, keyed by room.
pub type Mutations = BTreeMap<RoomId, LockSpec>;

/// Identifies a door by its room and position in that room's door list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DoorRef {
    pub from: RoomId,
    pub index: usize,
}

/// One room on a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub room: RoomId,
    /// Door taken to get here; `None` for the route's origin.
    pub arrival: Option<DoorRef>,
    /// Event changes to apply on entering the room.
    pub mutation: Option<LockSpec>,
}

/// An ordered sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn first_room(&self) -> Option<RoomId> {
        self.steps.first().map(|s| s.room)
    }

    pub fn last_room(&self) -> Option<RoomId> {
        self.steps.last().map(|s| s.room)
    }

    /// Room ids in walking order.
    pub fn rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.steps.iter().map(|s| s.room)
    }

    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    pub(crate) fn pop(&mut self) -> Option<PathStep> {
        self.steps.pop()
    }

    pub(crate) fn steps_mut(&mut self) -> &mut Vec<PathStep> {
        &mut self.steps
    }

    pub fn into_steps(self) -> Vec<PathStep> {
        self.steps
    }
}

impl From<Vec<PathStep>> for Path {
    fn from(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }
}

/// Route search bound to one crawl.
pub struct PathGenerator<'c> {
    crawl: &'c CrawlDungeon,
}

impl<'c> PathGenerator<'c> {
    pub fn new(crawl: &'c CrawlDungeon) -> Self {
        Self { crawl }
    }

    /// First route from `start` to `end`, trying doors in definition order.
    ///
    /// Rooms are never revisited, so the route has no repeated room.
    pub fn make_single_path(
        &self,
        start: RoomId,
        end: RoomId,
        mutations: &Mutations,
    ) -> Result<Path, CrawlError> {
        let mut search = Search::new(self.crawl, start, end, mutations)?;
        if search.step_single(start, None) {
            log::debug!(
                "path {} -> {}: {} steps",
                start,
                end,
                search.path.len()
            );
            Ok(search.path)
        } else {
            Err(CrawlError::PathNotFound {
                from: start,
                to: end,
            })
        }
    }

    /// Every simple route from `start` to `end`. Exponential in the worst case.
    pub fn make_paths(
        &self,
        start: RoomId,
        end: RoomId,
        mutations: &Mutations,
    ) -> Result<Vec<Path>, CrawlError> {
        let mut search = Search::new(self.crawl, start, end, mutations)?;
        search.step_all(start, None);
        if search.found.is_empty() {
            return Err(CrawlError::PathNotFound {
                from: start,
                to: end,
            });
        }
        log::debug!(
            "paths {} -> {}: {} found",
            start,
            end,
            search.found.len()
        );
        Ok(search.found)
    }
}

/// State for one search invocation.
struct Search<'a> {
    crawl: &'a CrawlDungeon,
    end: RoomId,
    mutations: &'a Mutations,
    visited: Vec<bool>,
    path: Path,
    found: Vec<Path>,
}

impl<'a> Search<'a> {
    fn new(
        crawl: &'a CrawlDungeon,
        start: RoomId,
        end: RoomId,
        mutations: &'a Mutations,
    ) -> Result<Self, CrawlError> {
        crawl.room(start)?;
        crawl.room(end)?;
        Ok(Self {
            crawl,
            end,
            mutations,
            visited: vec![false; crawl.room_count()],
            path: Path::new(),
            found: Vec::new(),
        })
    }

    fn enter(&mut self, room: RoomId, arrival: Option<DoorRef>) {
        self.path.push(PathStep {
            room,
            arrival,
            mutation: self.mutations.get(&room).cloned(),
        });
    }

    /// Visited marks are permanent for the whole search.
    fn step_single(&mut self, room: RoomId, arrival: Option<DoorRef>) -> bool {
        if self.visited[room] {
            return false;
        }
        self.visited[room] = true;
        self.enter(room, arrival);

        if room == self.end {
            return true;
        }

        let crawl = self.crawl;
        for door in &crawl.rooms()[room].doors {
            let via = DoorRef {
                from: room,
                index: door.index,
            };
            if self.step_single(door.destination, Some(via)) {
                return true;
            }
        }

        self.path.pop();
        false
    }

    /// Visited marks are cleared on the way back out so other branches may
    /// pass through the same room.
    fn step_all(&mut self, room: RoomId, arrival: Option<DoorRef>) {
        if self.visited[room] {
            return;
        }
        self.visited[room] = true;
        self.enter(room, arrival);

        if room == self.end {
            self.found.push(self.path.clone());
        }

        let crawl = self.crawl;
        for door in &crawl.rooms()[room].doors {
            let via = DoorRef {
                from: room,
                index: door.index,
            };
            self.step_all(door.destination, Some(via));
        }

        self.path.pop();
        self.visited[room] = false;
    }
}
