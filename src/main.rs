//! Hearthstead - entry point
//!
//! Interactive command loop driving the simulation: place buildings,
//! spawn villagers, assign jobs, advance ticks, save and load.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hearthstead::city::building::BuildingKind;
use hearthstead::city::catalog::Catalog;
use hearthstead::core::config::SimulationConfig;
use hearthstead::core::types::{GridPos, JobKind, ResourceKind};
use hearthstead::save::{restore, snapshot, SaveGame};
use hearthstead::simulation::run_tick;
use hearthstead::simulation::SimulationEvent;
use hearthstead::world::World;

const NAMES: &[&str] = &[
    "Wren", "Ada", "Brin", "Cole", "Daro", "Eli", "Fenna", "Gil", "Hale", "Iris", "Joss", "Kerr",
    "Lena", "Moss", "Nia", "Orin", "Pia", "Quil", "Rook", "Sol",
];

#[derive(Parser, Debug)]
#[command(name = "hearthstead", about = "Deterministic city-management simulation")]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 64)]
    width: i32,

    /// Grid height in cells
    #[arg(long, default_value_t = 64)]
    height: i32,

    /// Seed for villager naming (cosmetic; the core is seedless)
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// TOML data file overriding the built-in catalog
    #[arg(long)]
    data: Option<PathBuf>,

    /// Load a saved game instead of starting fresh
    #[arg(long)]
    load: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearthstead=info".into()),
        )
        .init();

    let args = Args::parse();

    let catalog = match &args.data {
        Some(path) => Catalog::load_from_toml(path)?,
        None => Catalog::with_defaults(),
    };
    let config = SimulationConfig::default();
    config.validate().map_err(io::Error::other)?;

    let mut world = match &args.load {
        Some(path) => {
            let save = SaveGame::read_from_file(path)?;
            tracing::info!(?path, tick = save.tick, "loaded save");
            restore(&save, config, catalog)?
        }
        None => {
            let mut world = World::new(config, catalog, args.width, args.height);
            // Starter kit so the first placements are affordable
            world.ledger.set(ResourceKind::Wood, 120.0);
            world.ledger.set(ResourceKind::Stone, 60.0);
            world.ledger.set(ResourceKind::Food, 80.0);
            world
        }
    };

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    println!("\n=== HEARTHSTEAD ===");
    println!("A deterministic city-management simulation");
    println!();
    print_help();

    loop {
        display_status(&world);
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts[0] {
            "quit" | "q" => break,
            "help" | "h" => print_help(),
            "tick" | "t" => run_and_report(&mut world, 1),
            "run" => {
                let count = parts.get(1).and_then(|n| n.parse().ok()).unwrap_or(10);
                run_and_report(&mut world, count);
            }
            "place" => place(&mut world, &parts),
            "demolish" => demolish(&mut world, &parts),
            "spawn" => {
                let name = parts
                    .get(1)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| pick_name(&mut rng, &world));
                spawn(&mut world, name, &parts);
            }
            "assign" => assign(&mut world, &parts),
            "unassign" => unassign(&mut world, &parts),
            "buildings" | "b" => list_buildings(&world),
            "villagers" | "v" => list_villagers(&world),
            "status" | "s" => display_details(&world),
            "save" => match parts.get(1) {
                Some(path) => match snapshot(&world).write_to_file(path.as_ref()) {
                    Ok(()) => println!("Saved to {path}"),
                    Err(err) => println!("Save failed: {err}"),
                },
                None => println!("Usage: save <path>"),
            },
            "load" => match parts.get(1) {
                Some(path) => match load_world(path, &world) {
                    Ok(loaded) => {
                        world = loaded;
                        println!("Loaded {path}");
                    }
                    Err(err) => println!("Load failed: {err}"),
                },
                None => println!("Usage: load <path>"),
            },
            other => println!("Unknown command: {other} (try 'help')"),
        }
    }

    println!("Goodbye.");
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  tick / t             - Advance the simulation by one tick");
    println!("  run [n]              - Run n ticks (default 10)");
    println!("  place <kind> <x> <y> - Queue a building placement");
    println!("  demolish <idx>       - Queue a building removal");
    println!("  spawn [name] [x y]   - Queue a villager spawn");
    println!("  assign <v> <b> <job> - Assign villager v to building b");
    println!("  unassign <v>         - Release villager v's job");
    println!("  buildings / b        - List buildings with indices");
    println!("  villagers / v        - List villagers with indices");
    println!("  status / s           - Detailed status");
    println!("  save <path>          - Write a snapshot");
    println!("  load <path>          - Restore a snapshot");
    println!("  quit / q             - Exit");
    println!();
}

fn run_and_report(world: &mut World, count: u32) {
    for _ in 0..count {
        for event in run_tick(world) {
            report_event(&event);
        }
    }
}

fn report_event(event: &SimulationEvent) {
    match event {
        SimulationEvent::BuildingPlaced { kind, origin, .. } => {
            println!("  + {} placed at ({}, {})", kind.name(), origin.x, origin.y);
        }
        SimulationEvent::PlacementRejected { kind, reason, .. } => {
            println!("  ! {} placement rejected: {reason:?}", kind.name());
        }
        SimulationEvent::BuildingRemoved { kind, .. } => {
            println!("  - {} removed", kind.name());
        }
        SimulationEvent::VillagerSpawned { name, .. } => {
            println!("  + {name} arrived");
        }
        SimulationEvent::SpawnRejected { name, reason, .. } => {
            println!("  ! spawn of {name} rejected: {reason:?}");
        }
        SimulationEvent::VillagerDied { name, tick, .. } => {
            println!("  x {name} starved at tick {tick}");
        }
        SimulationEvent::CycleInterrupted { .. } => {
            println!("  ! a work cycle was interrupted");
        }
        SimulationEvent::DepositApplied {
            resource,
            offered,
            stored,
        } if stored < offered => {
            println!(
                "  ~ {} deposit clamped ({offered:.1} offered, {stored:.1} stored)",
                resource.name()
            );
        }
        _ => {}
    }
}

fn place(world: &mut World, parts: &[&str]) {
    let (Some(kind), Some(x), Some(y)) = (
        parts.get(1).and_then(|s| BuildingKind::parse(s)),
        parts.get(2).and_then(|s| s.parse::<i32>().ok()),
        parts.get(3).and_then(|s| s.parse::<i32>().ok()),
    ) else {
        println!("Usage: place <kind> <x> <y>  (kinds: stockpile house farm lumber_camp quarry workshop)");
        return;
    };
    let origin = GridPos::new(x, y);
    match world.can_place(kind, origin) {
        Ok(()) => {
            world.request_place_building(kind, origin);
            println!("Queued {} at ({x}, {y})", kind.name());
        }
        Err(err) => println!("Can't place: {err}"),
    }
}

fn demolish(world: &mut World, parts: &[&str]) {
    let Some(index) = parts.get(1).and_then(|s| s.parse::<usize>().ok()) else {
        println!("Usage: demolish <building-index>");
        return;
    };
    if index >= world.buildings.count() {
        println!("No building #{index}");
        return;
    }
    world.request_remove_building(world.buildings.ids[index]);
    println!("Queued demolition of #{index}");
}

fn spawn(world: &mut World, name: String, parts: &[&str]) {
    let x = parts.get(2).and_then(|s| s.parse::<i32>().ok()).unwrap_or(0);
    let y = parts.get(3).and_then(|s| s.parse::<i32>().ok()).unwrap_or(0);
    world.request_spawn_villager(name.clone(), GridPos::new(x, y));
    println!("Queued spawn of {name} at ({x}, {y})");
}

fn assign(world: &mut World, parts: &[&str]) {
    let (Some(v), Some(b), Some(job)) = (
        parts.get(1).and_then(|s| s.parse::<usize>().ok()),
        parts.get(2).and_then(|s| s.parse::<usize>().ok()),
        parts.get(3).and_then(|s| JobKind::parse(s)),
    ) else {
        println!("Usage: assign <villager-index> <building-index> <job>");
        return;
    };
    if v >= world.villagers.count() || b >= world.buildings.count() {
        println!("Bad villager or building index");
        return;
    }
    let villager = world.villagers.ids[v];
    let building = world.buildings.ids[b];
    match world.assign_job(villager, building, job) {
        Ok(()) => println!("{} now works as {}", world.villagers.names[v], job.name()),
        Err(err) => println!("Can't assign: {err}"),
    }
}

fn unassign(world: &mut World, parts: &[&str]) {
    let Some(v) = parts.get(1).and_then(|s| s.parse::<usize>().ok()) else {
        println!("Usage: unassign <villager-index>");
        return;
    };
    if v >= world.villagers.count() {
        println!("No villager #{v}");
        return;
    }
    world.unassign_job(world.villagers.ids[v]);
    println!("{} is now idle", world.villagers.names[v]);
}

fn list_buildings(world: &World) {
    for index in 0..world.buildings.count() {
        let kind = world.buildings.kinds[index];
        let origin = world.buildings.origins[index];
        let workers = world.jobs.workers_of(world.buildings.ids[index]).len();
        println!(
            "  #{index} {} at ({}, {}) - {workers} worker(s)",
            kind.name(),
            origin.x,
            origin.y
        );
    }
    if world.buildings.count() == 0 {
        println!("  (none)");
    }
}

fn list_villagers(world: &World) {
    for index in 0..world.villagers.count() {
        let name = &world.villagers.names[index];
        let pos = world.villagers.positions[index];
        let state = world.villagers.work_states[index].name();
        let needs = &world.villagers.needs[index];
        println!(
            "  #{index} {name} at ({}, {}) - {state}, hunger {:.2}, health {:.2}",
            pos.x, pos.y, needs.hunger, needs.health
        );
    }
    if world.villagers.count() == 0 {
        println!("  (none)");
    }
}

fn display_status(world: &World) {
    let resources: Vec<String> = world
        .ledger
        .entries_sorted()
        .iter()
        .map(|(kind, entry)| format!("{} {:.0}/{:.0}", kind.name(), entry.amount, entry.capacity))
        .collect();
    println!(
        "\n[tick {}] pop {} | buildings {} | {}",
        world.current_tick,
        world.population(),
        world.building_count(),
        resources.join(" | ")
    );
}

fn display_details(world: &World) {
    display_status(world);
    println!(
        "Path cache: {} routes, {} hits, {} misses",
        world.paths.len(),
        world.paths.hits(),
        world.paths.misses()
    );
    list_buildings(world);
    list_villagers(world);
}

fn pick_name(rng: &mut ChaCha8Rng, world: &World) -> String {
    let base = NAMES.choose(rng).copied().unwrap_or("Sod");
    if world.villagers.names.iter().any(|n| n == base) {
        format!("{base} {}", world.population() + 1)
    } else {
        base.to_string()
    }
}

fn load_world(path: &str, current: &World) -> hearthstead::core::error::Result<World> {
    let save = SaveGame::read_from_file(path.as_ref())?;
    restore(&save, current.config.clone(), current.catalog.clone())
}
