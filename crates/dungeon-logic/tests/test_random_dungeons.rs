//! Property tests over seeded random dungeons.
//!
//! Every dungeon here comes from a fixed-seed `StdRng`, so failures are
//! reproducible by seed.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use dungeon_logic::crawl::CrawlDungeon;
use dungeon_logic::model::{Door, Dungeon, Event, EventId, Layout, LockSpec, Room, RoomId};
use dungeon_logic::path::{Mutations, Path, PathGenerator};
use dungeon_logic::traversal::{Traversal, TraversalGenerator};

const SEEDS: u64 = 60;

// ── Helpers ────────────────────────────────────────────────────────────

/// Random topology; with `locked`, a few items and locked doors as well.
fn random_dungeon(rng: &mut StdRng, locked: bool) -> Dungeon {
    let n = rng.gen_range(2..9);
    let mut rooms: Vec<Room> = (0..n).map(|i| Room::new(format!("r{}", i))).collect();

    let mut items = Vec::new();
    if locked {
        for k in 0..rng.gen_range(1..4) {
            let id = EventId(k + 1);
            let holder = rng.gen_range(0..n);
            rooms[holder].events.push(Event::item(id));
            items.push(id);
        }
    }

    for from in 0..n {
        for _ in 0..rng.gen_range(0..4) {
            let to = rng.gen_range(0..n);
            if to == from {
                continue;
            }
            let lock = if locked && rng.gen_bool(0.3) {
                let item = items[rng.gen_range(0..items.len())];
                LockSpec::single(item, 1)
            } else {
                LockSpec::clear()
            };
            rooms[from].doors.push(Door::locked(to, lock));
        }
    }

    Dungeon {
        name: "random".into(),
        rooms,
        entrance: 0,
        exit: n - 1,
        layout: Layout::Freeform,
    }
}

/// Same dungeon with room `i` moved to index `perm[i]`.
fn renumber(d: &Dungeon, perm: &[RoomId]) -> Dungeon {
    let mut rooms = vec![Room::default(); d.rooms.len()];
    for (old, room) in d.rooms.iter().enumerate() {
        let mut moved = room.clone();
        for door in &mut moved.doors {
            door.destination = perm[door.destination];
        }
        rooms[perm[old]] = moved;
    }
    Dungeon {
        name: d.name.clone(),
        rooms,
        entrance: perm[d.entrance],
        exit: perm[d.exit],
        layout: d.layout,
    }
}

fn assert_valid_path(crawl: &CrawlDungeon, path: &Path, start: RoomId, end: RoomId) {
    assert_eq!(path.first_room(), Some(start));
    assert_eq!(path.last_room(), Some(end));
    let unique: HashSet<RoomId> = path.rooms().collect();
    assert_eq!(unique.len(), path.len(), "room repeated in {:?}", path);
    for pair in path.steps().windows(2) {
        let via = pair[1].arrival.unwrap();
        assert_eq!(via.from, pair[0].room);
        assert_eq!(crawl.door(via.from, via.index).unwrap().destination, pair[1].room);
    }
}

fn assert_walkable(d: &Dungeon, t: &Traversal) {
    let mut crawl = CrawlDungeon::build(d).unwrap();
    for (k, step) in t.steps().iter().enumerate() {
        if k > 0 {
            let via = step.arrival.unwrap();
            let door = crawl.door(via.from, via.index).unwrap();
            assert_eq!(via.from, t.steps()[k - 1].room);
            assert_eq!(door.destination, step.room);
            assert!(crawl.is_passable(door));
        }
        if let Some(m) = &step.mutation {
            crawl.apply_lock_spec(m).unwrap();
        }
    }
}

// ── Path properties ────────────────────────────────────────────────────

#[test]
fn single_and_all_paths_agree() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let d = random_dungeon(&mut rng, false);
        let crawl = CrawlDungeon::build(&d).unwrap();
        let generator = PathGenerator::new(&crawl);
        let none = Mutations::new();

        for start in 0..d.room_count() {
            for end in 0..d.room_count() {
                let single = generator.make_single_path(start, end, &none);
                let all = generator.make_paths(start, end, &none);
                match (single, all) {
                    (Ok(path), Ok(paths)) => {
                        assert_valid_path(&crawl, &path, start, end);
                        for p in &paths {
                            assert_valid_path(&crawl, p, start, end);
                        }
                        assert!(paths.contains(&path), "seed {}", seed);
                    }
                    (Err(a), Err(b)) => assert_eq!(a, b),
                    (single, all) => panic!(
                        "seed {} {}->{}: single {:?} vs all {:?}",
                        seed,
                        start,
                        end,
                        single.is_ok(),
                        all.is_ok()
                    ),
                }
            }
        }
    }
}

#[test]
fn all_paths_are_distinct() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let d = random_dungeon(&mut rng, false);
        let crawl = CrawlDungeon::build(&d).unwrap();
        let found = PathGenerator::new(&crawl).make_paths(d.entrance, d.exit, &Mutations::new());
        if let Ok(paths) = found {
            for (i, a) in paths.iter().enumerate() {
                for b in &paths[i + 1..] {
                    assert_ne!(a, b, "seed {}", seed);
                }
            }
        }
    }
}

// ── Traversal properties ───────────────────────────────────────────────

#[test]
fn traversals_terminate_and_are_walkable() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let d = random_dungeon(&mut rng, true);
        let mut crawl = CrawlDungeon::build(&d).unwrap();
        // Any error is acceptable; hanging or an unwalkable result is not.
        if let Ok(t) = TraversalGenerator::new(&mut crawl).walk_entrance_to_exit() {
            assert_eq!(t.rooms().next(), Some(d.entrance));
            assert_eq!(t.rooms().last(), Some(d.exit));
            assert_walkable(&d, &t);
        }
    }
}

#[test]
fn renumbering_gives_isomorphic_traversals() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let d = random_dungeon(&mut rng, true);
        let mut perm: Vec<RoomId> = (0..d.room_count()).collect();
        perm.shuffle(&mut rng);
        let shuffled = renumber(&d, &perm);

        let mut crawl = CrawlDungeon::build(&d).unwrap();
        let original = TraversalGenerator::new(&mut crawl).walk_entrance_to_exit();
        let mut crawl = CrawlDungeon::build(&shuffled).unwrap();
        let renumbered = TraversalGenerator::new(&mut crawl).walk_entrance_to_exit();

        match (original, renumbered) {
            (Ok(a), Ok(b)) => {
                let mapped: Vec<RoomId> = a.rooms().map(|r| perm[r]).collect();
                assert_eq!(mapped, b.rooms().collect::<Vec<_>>(), "seed {}", seed);
                let a_mut: Vec<_> = a.steps().iter().map(|s| s.mutation.clone()).collect();
                let b_mut: Vec<_> = b.steps().iter().map(|s| s.mutation.clone()).collect();
                assert_eq!(a_mut, b_mut, "seed {}", seed);
            }
            (Err(a), Err(b)) => {
                assert_eq!(
                    std::mem::discriminant(&a),
                    std::mem::discriminant(&b),
                    "seed {}",
                    seed
                );
            }
            (a, b) => panic!("seed {}: {:?} vs {:?}", seed, a.is_ok(), b.is_ok()),
        }
    }
}
