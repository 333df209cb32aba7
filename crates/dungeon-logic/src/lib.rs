//! Traversal engine for puzzle dungeons.
//!
//! A dungeon is a directed graph of rooms joined by doors. A door may be
//! locked behind event states (items picked up, switches thrown). This crate
//! finds routes through such a graph and turns them into walkthroughs that a
//! player can actually follow, inserting detours to fetch whatever a locked
//! door needs.
//!
//! The engine does no I/O. Dungeons come in as plain data and traversals go
//! out as plain data for whatever renders them.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`builder`] | Programmatic dungeon construction with validation |
//! | [`config`] | Recursion-depth and route-length limits |
//! | [`crawl`] | Per-session live event table and resolved doors |
//! | [`error`] | `CrawlError` for every engine failure |
//! | [`model`] | Rooms, doors, lock specifications, events, dungeons |
//! | [`path`] | Depth-first single and exhaustive route search |
//! | [`traversal`] | Detour insertion producing walkable traversals |
//! | [`validation`] | Structural checks on authored dungeons |
//!
//! ```
//! use dungeon_logic::builder::DungeonBuilder;
//! use dungeon_logic::crawl::CrawlDungeon;
//! use dungeon_logic::model::LockSpec;
//! use dungeon_logic::traversal::TraversalGenerator;
//!
//! let mut b = DungeonBuilder::new("Gatehouse");
//! let hall = b.add_room("Hall");
//! let closet = b.add_room("Closet");
//! let yard = b.add_room("Yard");
//! let key = b.add_item(closet);
//! b.add_passage(hall, closet, LockSpec::clear());
//! b.add_door(hall, yard, LockSpec::single(key, 1));
//! b.entrance(hall).exit(yard);
//!
//! let mut crawl = CrawlDungeon::build(&b.build().unwrap()).unwrap();
//! let walk = TraversalGenerator::new(&mut crawl).walk_entrance_to_exit().unwrap();
//! assert_eq!(walk.rooms().collect::<Vec<_>>(), vec![hall, closet, hall, yard]);
//! ```

pub mod builder;
pub mod config;
pub mod crawl;
pub mod error;
pub mod model;
pub mod path;
pub mod traversal;
pub mod validation;

pub use error::CrawlError;
