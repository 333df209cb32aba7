//! Dungeon Crawl Headless Harness
//!
//! Drives the traversal engine end to end: builds crawls, searches routes,
//! generates walkthroughs, and reports what it found. Runs entirely
//! in-process — no editor, no renderer.
//!
//! Usage:
//!   cargo run -p dungeon-crawltest
//!   cargo run -p dungeon-crawltest -- --verbose
//!   cargo run -p dungeon-crawltest -- --dungeon my_dungeon.json --config limits.json

use std::path::{Path, PathBuf};

use clap::Parser;
use dungeon_logic::builder::DungeonBuilder;
use dungeon_logic::config::{validate_config, CrawlConfig};
use dungeon_logic::crawl::CrawlDungeon;
use dungeon_logic::model::{Dungeon, LockSpec};
use dungeon_logic::path::{Mutations, PathGenerator};
use dungeon_logic::traversal::{Traversal, TraversalGenerator, TraversalKind};
use dungeon_logic::validation::{has_errors, validate_dungeon};
use dungeon_logic::CrawlError;

// ── Sample dungeon (same JSON the library tests use) ────────────────────
const SAMPLE_JSON: &str = include_str!("../../../data/sample_dungeon.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Parser)]
#[command(name = "dungeon-crawltest")]
#[command(about = "Headless crawl harness for the dungeon traversal engine", long_about = None)]
struct Options {
    /// Print every result and each generated walkthrough
    #[arg(short, long)]
    verbose: bool,

    /// Extra dungeon JSON to validate and walk
    #[arg(short, long)]
    dungeon: Option<PathBuf>,

    /// Crawl limits JSON (max_depth, max_steps)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    let opts = Options::parse();
    println!("=== Dungeon Crawl Harness ===\n");

    let config = match load_config(opts.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            println!("config error: {}", e);
            std::process::exit(2);
        }
    };

    let mut results = Vec::new();

    // 1. Built-in scenarios
    results.extend(validate_scenarios(&config, opts.verbose));

    // 2. Bundled sample dungeon
    results.extend(validate_sample(&config, opts.verbose));

    // 3. User-supplied dungeon
    if let Some(path) = &opts.dungeon {
        results.extend(validate_user_dungeon(path, &config));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<CrawlConfig, String> {
    let config = match path {
        None => CrawlConfig::default(),
        Some(p) => {
            let text =
                std::fs::read_to_string(p).map_err(|e| format!("{}: {}", p.display(), e))?;
            serde_json::from_str(&text).map_err(|e| format!("{}: {}", p.display(), e))?
        }
    };
    let errors = validate_config(&config);
    if !errors.is_empty() {
        let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(joined.join("; "));
    }
    Ok(config)
}

fn walk(dungeon: &Dungeon, config: &CrawlConfig) -> Result<Traversal, CrawlError> {
    let mut crawl = CrawlDungeon::build(dungeon)?;
    TraversalGenerator::with_config(&mut crawl, *config).walk_entrance_to_exit()
}

fn rooms(t: &Traversal) -> Vec<usize> {
    t.rooms().collect()
}

// ── 1. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios(config: &CrawlConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Scenarios ---");
    let mut results = Vec::new();

    // Open corridor: 0 -> 1 -> 2
    let mut b = DungeonBuilder::new("Open Corridor");
    for name in ["West", "Middle", "East"] {
        b.add_room(name);
    }
    b.add_door(0, 1, LockSpec::clear());
    b.add_door(1, 2, LockSpec::clear());
    b.exit(2);
    results.push(match b.build().map_err(|e| format!("{} problems", e.len())) {
        Ok(d) => match walk(&d, config) {
            Ok(t) => TestResult {
                name: "open_corridor".into(),
                passed: rooms(&t) == vec![0, 1, 2] && !t.to_string().contains("set event"),
                detail: format!("route {:?}", rooms(&t)),
            },
            Err(e) => failure("open_corridor", e),
        },
        Err(e) => failure("open_corridor", e),
    });

    // Single detour: key in the side room opens the exit
    let mut b = DungeonBuilder::new("Single Detour");
    let hall = b.add_room("Hall");
    let closet = b.add_room("Closet");
    let yard = b.add_room("Yard");
    let key = b.add_item(closet);
    b.add_passage(hall, closet, LockSpec::clear());
    b.add_door(hall, yard, LockSpec::single(key, 1));
    b.entrance(hall).exit(yard);
    results.push(match b.build().map_err(|e| format!("{} problems", e.len())) {
        Ok(d) => match walk(&d, config) {
            Ok(t) => {
                if verbose {
                    print!("{}", t);
                }
                TestResult {
                    name: "single_detour".into(),
                    passed: rooms(&t) == vec![hall, closet, hall, yard],
                    detail: format!("route {:?}", rooms(&t)),
                }
            }
            Err(e) => failure("single_detour", e),
        },
        Err(e) => failure("single_detour", e),
    });

    // Trap: the key sits behind the door it opens
    let mut b = DungeonBuilder::new("Trap");
    let a = b.add_room("Antechamber");
    let c = b.add_room("Chamber");
    let key = b.add_item(c);
    b.add_door(a, c, LockSpec::single(key, 1));
    b.add_door(c, a, LockSpec::clear());
    b.exit(c);
    results.push(match b.build().map_err(|e| format!("{} problems", e.len())) {
        Ok(d) => {
            let outcome = walk(&d, config);
            TestResult {
                name: "event_trap".into(),
                passed: matches!(outcome, Err(CrawlError::EventTrap { .. })),
                detail: match outcome {
                    Ok(t) => format!("unexpected route {:?}", rooms(&t)),
                    Err(e) => e.to_string(),
                },
            }
        }
        Err(e) => failure("event_trap", e),
    });

    results
}

fn failure(name: &str, e: impl std::fmt::Display) -> TestResult {
    TestResult {
        name: name.into(),
        passed: false,
        detail: e.to_string(),
    }
}

// ── 2. Sample dungeon ───────────────────────────────────────────────────

fn validate_sample(config: &CrawlConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Sample Dungeon ---");
    let mut results = Vec::new();

    let dungeon: Dungeon = match serde_json::from_str(SAMPLE_JSON) {
        Ok(d) => d,
        Err(e) => {
            results.push(TestResult {
                name: "sample_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    let problems = validate_dungeon(&dungeon);
    results.push(TestResult {
        name: "sample_valid".into(),
        passed: problems.is_empty(),
        detail: if problems.is_empty() {
            format!("{} rooms, no problems", dungeon.room_count())
        } else {
            format!("{} problems, first: {}", problems.len(), problems[0])
        },
    });

    match CrawlDungeon::build(&dungeon) {
        Ok(crawl) => {
            let paths = PathGenerator::new(&crawl).make_paths(
                dungeon.entrance,
                dungeon.exit,
                &Mutations::new(),
            );
            results.push(TestResult {
                name: "sample_all_paths".into(),
                passed: paths.as_ref().is_ok_and(|p| !p.is_empty()),
                detail: match &paths {
                    Ok(p) => format!("{} raw routes from entrance to exit", p.len()),
                    Err(e) => e.to_string(),
                },
            });
        }
        Err(e) => results.push(failure("sample_crawl", e)),
    }

    match walk(&dungeon, config) {
        Ok(t) => {
            println!("{}: {} steps", dungeon.name, t.len());
            if verbose {
                print!("{}", t);
            }
            results.push(TestResult {
                name: "sample_walkthrough".into(),
                passed: t.kind() == TraversalKind::Source
                    && t.rooms().next() == Some(dungeon.entrance)
                    && t.rooms().last() == Some(dungeon.exit),
                detail: format!("route {:?}", rooms(&t)),
            });
        }
        Err(e) => results.push(failure("sample_walkthrough", e)),
    }

    results
}

// ── 3. User dungeon ─────────────────────────────────────────────────────

fn validate_user_dungeon(path: &Path, config: &CrawlConfig) -> Vec<TestResult> {
    println!("--- {} ---", path.display());
    let mut results = Vec::new();

    let dungeon: Dungeon = match std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
    {
        Ok(d) => d,
        Err(e) => {
            results.push(failure("user_load", e));
            return results;
        }
    };

    let problems = validate_dungeon(&dungeon);
    for p in &problems {
        println!("  {}", p);
    }
    if has_errors(&problems) {
        results.push(TestResult {
            name: "user_valid".into(),
            passed: false,
            detail: format!("{} problems", problems.len()),
        });
        return results;
    }

    match walk(&dungeon, config) {
        Ok(t) => {
            print!("{}", t);
            results.push(TestResult {
                name: "user_walkthrough".into(),
                passed: true,
                detail: format!("{} steps", t.len()),
            });
        }
        Err(e) => {
            let kind = if e.is_fatal() { "fatal" } else { "unsolvable" };
            results.push(TestResult {
                name: "user_walkthrough".into(),
                passed: false,
                detail: format!("{}: {}", kind, e),
            });
        }
    }

    results
}
