//! Walkable route generation.
//!
//! A raw [`Path`] ignores locks. `TraversalGenerator` walks it against the
//! live crawl state and, whenever the next door is not aligned, splices in a
//! detour: a *departing* leg to the room holding the missing event, where the
//! event is set, followed by a *returning* leg back to where the detour began.
//! Detours are generated by the same procedure, so they can nest.
//!
//! Two guards keep this finite. Every leg requested during one top-level
//! generation, departing or returning, is remembered; asking for the
//! identical leg twice means the lock dependencies go round in a circle
//! ([`CrawlError::EventTrap`]).
//! Nesting depth and route length are bounded by [`CrawlConfig`].
//!
//! Event changes made while generating are left in place, including after a
//! failure; rebuild or [`reset`](CrawlDungeon::reset) the crawl before reuse.

use std::fmt;

use crate::config::CrawlConfig;
use crate::crawl::CrawlDungeon;
use crate::error::CrawlError;
use crate::model::{LockSpec, Requirement, RoomId};
use crate::path::{Mutations, Path, PathGenerator, PathStep};

/// What a generated route is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalKind {
    /// The top-level route.
    Source,
    /// A detour away from the route to satisfy a lock.
    Departing,
    /// The leg back after a departing detour.
    Returning,
}

/// A finished, walkable route. Read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal {
    kind: TraversalKind,
    path: Path,
}

impl Traversal {
    pub fn kind(&self) -> TraversalKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn steps(&self) -> &[PathStep] {
        self.path.steps()
    }

    pub fn rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.path.rooms()
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps().iter().enumerate() {
            let verb = if i == 0 { "enter" } else { "go to" };
            writeln!(f, "{} room {}", verb, step.room)?;
            if let Some(mutation) = &step.mutation {
                for req in mutation.iter() {
                    writeln!(f, "  set event {} to {}", req.event, req.state)?;
                }
            }
        }
        Ok(())
    }
}

/// Generates traversals against one crawl session.
pub struct TraversalGenerator<'c> {
    crawl: &'c mut CrawlDungeon,
    config: CrawlConfig,
    depth: usize,
    requested: Vec<Path>,
}

impl<'c> TraversalGenerator<'c> {
    pub fn new(crawl: &'c mut CrawlDungeon) -> Self {
        Self::with_config(crawl, CrawlConfig::default())
    }

    pub fn with_config(crawl: &'c mut CrawlDungeon, config: CrawlConfig) -> Self {
        Self {
            crawl,
            config,
            depth: 0,
            requested: Vec::new(),
        }
    }

    pub fn crawl(&self) -> &CrawlDungeon {
        &*self.crawl
    }

    /// Turn `path` into a walkable traversal, inserting detours as needed.
    pub fn make_traversal(
        &mut self,
        path: Path,
        kind: TraversalKind,
    ) -> Result<Traversal, CrawlError> {
        self.depth = 0;
        self.requested.clear();
        let path = self.make_sub_traversal(path, kind)?;
        log::debug!("{:?} traversal ready: {} steps", kind, path.len());
        Ok(Traversal { kind, path })
    }

    /// Find a raw route from entrance to exit and make it walkable.
    pub fn walk_entrance_to_exit(&mut self) -> Result<Traversal, CrawlError> {
        let path = PathGenerator::new(&*self.crawl).make_single_path(
            self.crawl.entrance(),
            self.crawl.exit(),
            &Mutations::new(),
        )?;
        self.make_traversal(path, TraversalKind::Source)
    }

    fn make_sub_traversal(&mut self, path: Path, kind: TraversalKind) -> Result<Path, CrawlError> {
        self.depth += 1;
        let result = if self.depth > self.config.max_depth {
            log::warn!("traversal nesting exceeded {}", self.config.max_depth);
            Err(CrawlError::TraversalTooDeep {
                max: self.config.max_depth,
            })
        } else {
            self.generate(path, kind)
        };
        self.depth -= 1;
        result
    }

    fn generate(&mut self, mut path: Path, kind: TraversalKind) -> Result<Path, CrawlError> {
        let (origin, destination) = match (path.first_room(), path.last_room()) {
            (Some(origin), Some(destination)) => (origin, destination),
            _ => return Ok(path),
        };
        log::trace!(
            "{:?} {} -> {} at depth {}",
            kind,
            origin,
            destination,
            self.depth
        );

        let mut i = 0;
        // Landing back on a step after a detour must not replay its events.
        let mut fresh = true;
        loop {
            self.check_length(&path)?;

            if fresh {
                if let Some(mutation) = path.steps()[i].mutation.clone() {
                    self.crawl.apply_lock_spec(&mutation)?;
                }
            }
            let room = path.steps()[i].room;

            // Redirection
            if room == destination {
                if kind == TraversalKind::Departing {
                    let back = PathGenerator::new(&*self.crawl).make_single_path(
                        room,
                        origin,
                        &Mutations::new(),
                    )?;
                    self.record_request(&back, room, origin)?;
                    let returning = self.make_sub_traversal(back, TraversalKind::Returning)?;
                    splice_detour(&mut path, i, returning);
                    self.check_length(&path)?;
                }
                return Ok(path);
            }

            // Progression
            let next = path
                .steps()
                .get(i + 1)
                .and_then(|s| s.arrival)
                .ok_or(CrawlError::UnknownRoom(room))?;
            let lock = self.crawl.door(next.from, next.index)?.lock.clone();

            let unmet = if self.crawl.is_aligned(&lock) {
                None
            } else {
                self.first_unmet(&lock)
            };
            let Some(req) = unmet else {
                i += 1;
                fresh = true;
                continue;
            };

            let target = self.crawl.lookup_room_holding_event(req.event)?.id;
            let mut mutations = Mutations::new();
            mutations.insert(target, LockSpec::single(req.event, req.state));
            log::debug!(
                "door {}#{} locked; detour {} -> {} for event {}",
                next.from,
                next.index,
                room,
                target,
                req.event
            );

            let request =
                PathGenerator::new(&*self.crawl).make_single_path(room, target, &mutations)?;
            self.record_request(&request, room, target)?;
            let detour = self.make_sub_traversal(request, TraversalKind::Departing)?;
            i = splice_detour(&mut path, i, detour);
            fresh = false;
        }
    }

    /// First requirement of `lock` that the live state does not meet.
    fn first_unmet(&self, lock: &LockSpec) -> Option<Requirement> {
        lock.iter()
            .find(|r| !self.crawl.is_aligned(&LockSpec::single(r.event, r.state)))
            .copied()
    }

    fn record_request(
        &mut self,
        request: &Path,
        from: RoomId,
        to: RoomId,
    ) -> Result<(), CrawlError> {
        if self.requested.contains(request) {
            log::warn!("event trap: detour {} -> {} requested twice", from, to);
            return Err(CrawlError::EventTrap { from, to });
        }
        self.requested.push(request.clone());
        Ok(())
    }

    fn check_length(&self, path: &Path) -> Result<(), CrawlError> {
        if path.len() > self.config.max_steps {
            log::warn!("traversal grew past {} steps", self.config.max_steps);
            return Err(CrawlError::TraversalTooLong {
                max: self.config.max_steps,
            });
        }
        Ok(())
    }
}

/// Splice a detour that starts in the room at `at` into `path` right after
/// that step. Returns the index of the detour's last step.
///
/// The detour's first step is the room already at `at`; only its event
/// changes carry over.
fn splice_detour(path: &mut Path, at: usize, detour: Path) -> usize {
    let mut steps = detour.into_steps().into_iter();
    let steps_mut = path.steps_mut();
    if let Some(head) = steps.next() {
        if let Some(mutation) = head.mutation {
            steps_mut[at]
                .mutation
                .get_or_insert_with(LockSpec::clear)
                .merge(&mutation);
        }
    }
    let tail: Vec<PathStep> = steps.collect();
    let inserted = tail.len();
    steps_mut.splice(at + 1..at + 1, tail);
    at + inserted
}
