//! Tick coordinator
//!
//! Drives every subsystem once per simulation step in a fixed order:
//!
//! 1. Apply queued placements, removals, and spawns (grid mutations bump
//!    the generation the path cache keys on; building removal releases
//!    its workers first).
//! 2. Advance every villager's work cycle by one step, in row order.
//! 3. Apply deposit deltas queued by completed `Depositing` steps.
//! 4. Update needs and population effects.
//!
//! The order is the core invariant: villagers path against the current
//! grid, and deposits land after every affordability check of the same
//! tick, so they become spendable only on the next one.

use crate::city::building::{adjacent_cells, footprint_cells, BuildingKind};
use crate::core::types::{BuildingId, GridPos, ResourceKind, VillagerId};
use crate::nav::grid::NavGrid;
use crate::nav::path_cache::PathCache;
use crate::simulation::commands::Command;
use crate::simulation::events::{RejectReason, SimulationEvent};
use crate::villager::work_cycle::{Route, WorkState};
use crate::world::World;

/// Run a single simulation tick
///
/// Returns the events that occurred, in the order they happened, for
/// the UI layer to consume.
pub fn run_tick(world: &mut World) -> Vec<SimulationEvent> {
    let mut events = Vec::new();
    let mut deposits: Vec<(ResourceKind, f32)> = Vec::new();

    apply_commands(world, &mut events);
    advance_work_cycles(world, &mut deposits, &mut events);
    apply_deposits(world, &deposits, &mut events);
    update_population(world, &mut events);

    world.current_tick += 1;
    events
}

// ---------------------------------------------------------------------------
// Phase 1: queued placements and removals
// ---------------------------------------------------------------------------

fn apply_commands(world: &mut World, events: &mut Vec<SimulationEvent>) {
    while let Some(command) = world.pop_command() {
        match command {
            Command::PlaceBuilding { kind, origin } => place_building(world, kind, origin, events),
            Command::RemoveBuilding { building } => remove_building(world, building, events),
            Command::SpawnVillager { name, position } => {
                spawn_villager(world, name, position, events)
            }
            Command::RemoveVillager { villager } => remove_villager(world, villager, events),
        }
    }
}

fn place_building(
    world: &mut World,
    kind: BuildingKind,
    origin: GridPos,
    events: &mut Vec<SimulationEvent>,
) {
    let Some(def) = world.catalog.building(kind) else {
        events.push(SimulationEvent::PlacementRejected {
            kind,
            origin,
            reason: RejectReason::UnknownKind,
        });
        return;
    };
    let footprint = footprint_cells(origin, def.size);

    if let Err(err) = world.grid.can_place(&footprint) {
        tracing::debug!(kind = kind.name(), %err, "placement rejected");
        events.push(SimulationEvent::PlacementRejected {
            kind,
            origin,
            reason: RejectReason::Collision,
        });
        return;
    }
    if let Err(err) = world.ledger.consume_all(&def.cost) {
        tracing::debug!(kind = kind.name(), %err, "placement rejected");
        events.push(SimulationEvent::PlacementRejected {
            kind,
            origin,
            reason: RejectReason::Insufficient,
        });
        return;
    }

    let building = BuildingId::new();
    if world.grid.place(&footprint, building).is_err() {
        // can_place held a moment ago and nothing mutated the grid since;
        // refund and bail rather than panic if that ever stops being true
        for (resource, amount) in &def.cost {
            world.ledger.add(*resource, *amount);
        }
        events.push(SimulationEvent::PlacementRejected {
            kind,
            origin,
            reason: RejectReason::Collision,
        });
        return;
    }

    world.buildings.spawn(building, kind, origin, world.current_tick);
    tracing::debug!(kind = kind.name(), ?origin, "building placed");
    events.push(SimulationEvent::BuildingPlaced {
        building,
        kind,
        origin,
    });
    for (resource, _) in &def.cost {
        events.push(SimulationEvent::ResourceChanged {
            resource: *resource,
            amount: world.ledger.get(*resource),
        });
    }
}

fn remove_building(world: &mut World, building: BuildingId, events: &mut Vec<SimulationEvent>) {
    let Some(index) = world.buildings.index_of(building) else {
        tracing::debug!(?building, "remove for unknown building ignored");
        return;
    };
    let kind = world.buildings.kinds[index];

    // Workers lose their binding before the footprint frees; anything
    // mid-cycle is discarded without partial credit
    let workers = world.jobs.release_building(building);
    for villager in workers {
        if let Some(v_index) = world.villagers.index_of(villager) {
            if !world.villagers.work_states[v_index].is_idle() {
                events.push(SimulationEvent::CycleInterrupted { villager });
            }
            world.villagers.force_idle(v_index);
        }
    }

    world.grid.remove(building);
    world.buildings.despawn(building);
    events.push(SimulationEvent::BuildingRemoved { building, kind });
}

fn spawn_villager(
    world: &mut World,
    name: String,
    position: GridPos,
    events: &mut Vec<SimulationEvent>,
) {
    if !world.grid.is_walkable(position) {
        events.push(SimulationEvent::SpawnRejected {
            name,
            position,
            reason: RejectReason::Unwalkable,
        });
        return;
    }
    let villager = VillagerId::new();
    world
        .villagers
        .spawn(villager, name.clone(), position, world.current_tick);
    events.push(SimulationEvent::VillagerSpawned { villager, name });
}

fn remove_villager(world: &mut World, villager: VillagerId, events: &mut Vec<SimulationEvent>) {
    if world.villagers.index_of(villager).is_none() {
        return;
    }
    world.jobs.unassign(villager);
    world.villagers.despawn(villager);
    events.push(SimulationEvent::VillagerRemoved { villager });
}

// ---------------------------------------------------------------------------
// Phase 2: work cycles
// ---------------------------------------------------------------------------

fn advance_work_cycles(
    world: &mut World,
    deposits: &mut Vec<(ResourceKind, f32)>,
    events: &mut Vec<SimulationEvent>,
) {
    // Row order is stable here; rows are added and removed only in
    // phases 1 and 4
    for index in 0..world.villagers.count() {
        advance_villager(world, index, deposits, events);
    }
}

fn advance_villager(
    world: &mut World,
    index: usize,
    deposits: &mut Vec<(ResourceKind, f32)>,
    events: &mut Vec<SimulationEvent>,
) {
    let state = world.villagers.work_states[index].clone();
    match state {
        WorkState::Idle { cooldown } => {
            if cooldown > 0 {
                world.villagers.work_states[index] = WorkState::Idle {
                    cooldown: cooldown - 1,
                };
                return;
            }
            // Finished goods take precedence: a villager blocked on the
            // way home keeps trying to reach a depot
            if !world.villagers.carrying[index].is_empty() {
                begin_return(world, index, events);
                return;
            }
            let villager = world.villagers.ids[index];
            let Some(binding) = world.jobs.binding_of(villager) else {
                world.villagers.path_failures[index] = 0;
                return;
            };
            begin_commute(world, index, binding.building, events);
        }
        WorkState::Pathing { mut route } => match walk(world, index, &mut route) {
            WalkOutcome::Arrived => begin_acting(world, index, events),
            WalkOutcome::Walking => {
                world.villagers.work_states[index] = WorkState::Pathing { route };
            }
            WalkOutcome::Blocked => path_failure(world, index, events),
        },
        WorkState::Acting { remaining } => {
            if remaining > 1 {
                world.villagers.work_states[index] = WorkState::Acting {
                    remaining: remaining - 1,
                };
            } else {
                finish_acting(world, index, events);
            }
        }
        WorkState::Returning { mut route } => match walk(world, index, &mut route) {
            WalkOutcome::Arrived => {
                world.villagers.work_states[index] = WorkState::Depositing;
            }
            WalkOutcome::Walking => {
                world.villagers.work_states[index] = WorkState::Returning { route };
            }
            WalkOutcome::Blocked => path_failure(world, index, events),
        },
        WorkState::Depositing => {
            deposits.extend(world.villagers.carrying[index].drain(..));
            world.villagers.work_states[index] = WorkState::idle();
            world.villagers.path_failures[index] = 0;
        }
    }
}

enum WalkOutcome {
    Walking,
    Arrived,
    Blocked,
}

/// Advance one cell along the route.
///
/// A route cell that stopped being walkable (a building landed on it
/// this tick) blocks the walk; the caller treats that as a path failure
/// and re-plans from the villager's current position.
fn walk(world: &mut World, index: usize, route: &mut Route) -> WalkOutcome {
    let Some(next) = route.next_cell() else {
        return WalkOutcome::Arrived;
    };
    if !world.grid.is_walkable(next) {
        return WalkOutcome::Blocked;
    }
    world.villagers.positions[index] = next;
    route.advance();
    if route.is_complete() {
        WalkOutcome::Arrived
    } else {
        WalkOutcome::Walking
    }
}

/// Head for the assigned building's work site
fn begin_commute(
    world: &mut World,
    index: usize,
    building: BuildingId,
    events: &mut Vec<SimulationEvent>,
) {
    let Some(b_index) = world.buildings.index_of(building) else {
        // Phase 1 cleans bindings on removal; a miss here means the
        // binding went stale within the tick, treat it as interrupted
        world.villagers.force_idle(index);
        return;
    };
    let kind = world.buildings.kinds[b_index];
    let origin = world.buildings.origins[b_index];
    let Some(size) = world.catalog.building(kind).map(|def| def.size) else {
        world.villagers.force_idle(index);
        return;
    };

    let position = world.villagers.positions[index];
    let Some(route) = route_to_site(&mut world.paths, &world.grid, position, origin, size) else {
        path_failure(world, index, events);
        return;
    };

    let villager = world.villagers.ids[index];
    world.villagers.work_states[index] = WorkState::Pathing { route };
    events.push(SimulationEvent::WorkStarted { villager, building });
}

/// Pick the work-site cell and a route to it: nearest walkable cell
/// bordering the footprint, distance ties resolved by the fixed ring
/// order of `adjacent_cells`.
fn route_to_site(
    paths: &mut PathCache,
    grid: &NavGrid,
    from: GridPos,
    origin: GridPos,
    size: (i32, i32),
) -> Option<Route> {
    let mut candidates: Vec<GridPos> = adjacent_cells(origin, size)
        .into_iter()
        .filter(|pos| grid.is_walkable(*pos))
        .collect();
    // Stable sort: ties keep ring order
    candidates.sort_by_key(|pos| from.manhattan(pos));

    for target in candidates {
        if let Ok(route) = paths.get_or_compute(grid, from, target) {
            return Some(Route::from_path(route));
        }
    }
    None
}

/// One pathfinding failure: idle and retry next tick, with a cooldown
/// after too many in a row
fn path_failure(world: &mut World, index: usize, events: &mut Vec<SimulationEvent>) {
    world.villagers.path_failures[index] += 1;
    if world.villagers.path_failures[index] >= world.config.path_retry_limit {
        let cooldown = world.config.retry_cooldown_ticks;
        world.villagers.path_failures[index] = 0;
        world.villagers.work_states[index] = WorkState::idle_for(cooldown);
        events.push(SimulationEvent::PathRetryBackoff {
            villager: world.villagers.ids[index],
            cooldown,
        });
    } else {
        world.villagers.work_states[index] = WorkState::idle();
    }
}

/// Arrived at the work site: consume recipe inputs and start the cycle
fn begin_acting(world: &mut World, index: usize, events: &mut Vec<SimulationEvent>) {
    let villager = world.villagers.ids[index];
    let Some(binding) = world.jobs.binding_of(villager) else {
        world.villagers.force_idle(index);
        return;
    };
    let Some(b_index) = world.buildings.index_of(binding.building) else {
        world.villagers.force_idle(index);
        return;
    };
    let kind = world.buildings.kinds[b_index];
    let Some(recipe) = world.catalog.building(kind).and_then(|def| def.recipe.as_ref()) else {
        // A building without a recipe has no work cycle to run
        world.villagers.work_states[index] =
            WorkState::idle_for(world.config.retry_cooldown_ticks);
        return;
    };

    if !recipe.inputs.is_empty() {
        if let Err(err) = world.ledger.consume_all(&recipe.inputs) {
            tracing::debug!(villager = %world.villagers.names[index], %err, "inputs unavailable");
            world.villagers.work_states[index] =
                WorkState::idle_for(world.config.missing_input_cooldown_ticks);
            return;
        }
        for (resource, _) in &recipe.inputs {
            events.push(SimulationEvent::ResourceChanged {
                resource: *resource,
                amount: world.ledger.get(*resource),
            });
        }
    }

    world.villagers.work_states[index] = WorkState::Acting {
        remaining: recipe.duration_ticks.max(1),
    };
}

/// Cycle finished: load the outputs and head home
fn finish_acting(world: &mut World, index: usize, events: &mut Vec<SimulationEvent>) {
    let villager = world.villagers.ids[index];
    let Some(binding) = world.jobs.binding_of(villager) else {
        world.villagers.force_idle(index);
        return;
    };
    let Some(b_index) = world.buildings.index_of(binding.building) else {
        world.villagers.force_idle(index);
        return;
    };
    let kind = world.buildings.kinds[b_index];
    if let Some(recipe) = world.catalog.building(kind).and_then(|def| def.recipe.as_ref()) {
        world.villagers.carrying[index] = recipe.outputs.clone();
    }
    begin_return(world, index, events);
}

/// Head for the nearest depot with the carried goods
fn begin_return(world: &mut World, index: usize, events: &mut Vec<SimulationEvent>) {
    let position = world.villagers.positions[index];
    let Some((origin, size)) = nearest_depot(world, position) else {
        path_failure(world, index, events);
        return;
    };
    let Some(route) = route_to_site(&mut world.paths, &world.grid, position, origin, size) else {
        path_failure(world, index, events);
        return;
    };
    world.villagers.work_states[index] = WorkState::Returning { route };
}

/// Nearest depot by footprint-origin distance; ties resolve by row order
fn nearest_depot(world: &World, from: GridPos) -> Option<(GridPos, (i32, i32))> {
    let mut best: Option<(u32, usize)> = None;
    for index in 0..world.buildings.count() {
        let kind = world.buildings.kinds[index];
        let Some(def) = world.catalog.building(kind) else {
            continue;
        };
        if !def.depot {
            continue;
        }
        let distance = from.manhattan(&world.buildings.origins[index]);
        let better = match best {
            None => true,
            Some((best_distance, _)) => distance < best_distance,
        };
        if better {
            best = Some((distance, index));
        }
    }
    let (_, index) = best?;
    let kind = world.buildings.kinds[index];
    let def = world.catalog.building(kind)?;
    Some((world.buildings.origins[index], def.size))
}

// ---------------------------------------------------------------------------
// Phase 3: queued ledger deltas
// ---------------------------------------------------------------------------

fn apply_deposits(
    world: &mut World,
    deposits: &[(ResourceKind, f32)],
    events: &mut Vec<SimulationEvent>,
) {
    for &(resource, offered) in deposits {
        let stored = world.ledger.add(resource, offered);
        if stored < offered {
            tracing::debug!(
                resource = resource.name(),
                offered,
                stored,
                "deposit overflow discarded"
            );
        }
        events.push(SimulationEvent::DepositApplied {
            resource,
            offered,
            stored,
        });
        events.push(SimulationEvent::ResourceChanged {
            resource,
            amount: world.ledger.get(resource),
        });
    }
}

// ---------------------------------------------------------------------------
// Phase 4: needs and population
// ---------------------------------------------------------------------------

fn update_population(world: &mut World, events: &mut Vec<SimulationEvent>) {
    let mut index = 0;
    while index < world.villagers.count() {
        let mut needs = world.villagers.needs[index].clone();

        needs.tick_hunger(world.config.hunger_per_tick);
        if needs.hunger >= world.config.eat_threshold
            && world
                .ledger
                .consume(ResourceKind::Food, world.config.food_per_meal)
                .is_ok()
        {
            needs.eat(world.config.meal_satiety);
            events.push(SimulationEvent::ResourceChanged {
                resource: ResourceKind::Food,
                amount: world.ledger.get(ResourceKind::Food),
            });
        }

        if needs.is_starving() {
            needs.damage(world.config.starvation_damage);
        } else if needs.hunger < world.config.eat_threshold {
            needs.heal(world.config.health_regen);
        }
        needs.drift_happiness(
            world.config.happiness_hunger_weight,
            world.config.happiness_drift_rate,
        );

        if needs.is_dead() {
            let villager = world.villagers.ids[index];
            let name = world.villagers.names[index].clone();
            tracing::info!(%name, "villager starved");
            world.jobs.unassign(villager);
            world.villagers.despawn(villager);
            events.push(SimulationEvent::VillagerDied {
                villager,
                name,
                tick: world.current_tick,
            });
            // swap_remove pulled a fresh row into this index
            continue;
        }

        world.villagers.needs[index] = needs;
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::BuildingKind;
    use crate::city::catalog::Catalog;
    use crate::core::config::SimulationConfig;
    use crate::core::types::JobKind;

    fn test_world() -> World {
        let mut world = World::new(SimulationConfig::default(), Catalog::with_defaults(), 32, 32);
        world.ledger.set(ResourceKind::Wood, 200.0);
        world.ledger.set(ResourceKind::Stone, 100.0);
        world.ledger.set(ResourceKind::Food, 100.0);
        world
    }

    /// Drive a fresh world to: stockpile placed, lumber camp placed,
    /// one villager assigned as lumberjack.
    fn working_village() -> (World, VillagerId, BuildingId) {
        let mut world = test_world();
        world.request_place_building(BuildingKind::Stockpile, GridPos::new(2, 2));
        world.request_place_building(BuildingKind::LumberCamp, GridPos::new(10, 2));
        world.request_spawn_villager("Wren", GridPos::new(6, 6));
        run_tick(&mut world);

        let villager = world.villagers.ids[0];
        let camp_index = world
            .buildings
            .iter_kind(BuildingKind::LumberCamp)
            .next()
            .unwrap();
        let camp = world.buildings.ids[camp_index];
        world.assign_job(villager, camp, JobKind::Lumberjack).unwrap();
        (world, villager, camp)
    }

    #[test]
    fn test_queued_placement_lands_in_phase_one() {
        let mut world = test_world();
        world.request_spawn_villager("Wren", GridPos::new(0, 0));
        run_tick(&mut world);

        world.request_place_building(BuildingKind::Stockpile, GridPos::new(2, 0));
        let generation_before = world.grid.generation();
        run_tick(&mut world);
        assert!(world.grid.generation() > generation_before);
        assert_eq!(world.pending_commands(), 0);
    }

    #[test]
    fn test_collision_rejection_is_side_effect_free() {
        let mut world = test_world();
        world.request_place_building(BuildingKind::Stockpile, GridPos::new(2, 2));
        run_tick(&mut world);
        let generation = world.grid.generation();
        let wood = world.ledger.get(ResourceKind::Wood);

        // Overlaps the stockpile
        world.request_place_building(BuildingKind::House, GridPos::new(3, 3));
        let events = run_tick(&mut world);

        assert!(events.iter().any(|e| matches!(
            e,
            SimulationEvent::PlacementRejected {
                reason: RejectReason::Collision,
                ..
            }
        )));
        assert_eq!(world.grid.generation(), generation);
        assert_eq!(world.ledger.get(ResourceKind::Wood), wood);
        assert_eq!(world.buildings.count(), 1);
    }

    #[test]
    fn test_unaffordable_placement_rejected() {
        let mut world = test_world();
        world.ledger.set(ResourceKind::Wood, 0.0);
        world.request_place_building(BuildingKind::Farm, GridPos::new(2, 2));
        let events = run_tick(&mut world);

        assert!(events.iter().any(|e| matches!(
            e,
            SimulationEvent::PlacementRejected {
                reason: RejectReason::Insufficient,
                ..
            }
        )));
        assert_eq!(world.buildings.count(), 0);
    }

    #[test]
    fn test_spawn_on_occupied_cell_rejected() {
        let mut world = test_world();
        world.request_place_building(BuildingKind::Stockpile, GridPos::new(2, 2));
        run_tick(&mut world);

        world.request_spawn_villager("Wren", GridPos::new(2, 2));
        let events = run_tick(&mut world);
        assert!(events
            .iter()
            .any(|e| matches!(e, SimulationEvent::SpawnRejected { .. })));
        assert_eq!(world.villagers.count(), 0);
    }

    #[test]
    fn test_work_cycle_produces_wood() {
        let (mut world, _, _) = working_village();
        let wood_before = world.ledger.get(ResourceKind::Wood);

        // Commute (<= ~20 cells), act (10 ticks), return, deposit
        for _ in 0..80 {
            run_tick(&mut world);
        }
        assert!(
            world.ledger.get(ResourceKind::Wood) > wood_before,
            "lumberjack should have deposited wood"
        );
    }

    #[test]
    fn test_deposit_overflow_is_discarded() {
        let (mut world, _, _) = working_village();
        world.ledger.set_capacity(ResourceKind::Wood, 10.0);
        world.ledger.set(ResourceKind::Wood, 9.5);

        let mut saw_clamped_deposit = false;
        for _ in 0..120 {
            for event in run_tick(&mut world) {
                if let SimulationEvent::DepositApplied {
                    offered, stored, ..
                } = event
                {
                    if stored < offered {
                        saw_clamped_deposit = true;
                    }
                }
            }
        }
        assert!(saw_clamped_deposit, "a deposit should have hit the cap");
        assert!(world.ledger.get(ResourceKind::Wood) <= 10.0);
    }

    #[test]
    fn test_building_removal_interrupts_cycle() {
        let (mut world, villager, camp) = working_village();
        // Let the villager get under way
        run_tick(&mut world);
        run_tick(&mut world);
        let index = world.villagers.index_of(villager).unwrap();
        assert!(!world.villagers.work_states[index].is_idle());

        world.request_remove_building(camp);
        let events = run_tick(&mut world);

        assert!(events
            .iter()
            .any(|e| matches!(e, SimulationEvent::CycleInterrupted { .. })));
        let index = world.villagers.index_of(villager).unwrap();
        assert!(world.villagers.work_states[index].is_idle());
        assert!(world.villagers.carrying[index].is_empty());
        assert!(world.jobs.binding_of(villager).is_none());
    }

    #[test]
    fn test_unreachable_work_site_backs_off() {
        let mut world = test_world();
        world.request_place_building(BuildingKind::Stockpile, GridPos::new(20, 20));
        world.request_place_building(BuildingKind::LumberCamp, GridPos::new(2, 2));
        world.request_spawn_villager("Wren", GridPos::new(30, 30));
        run_tick(&mut world);

        // Wall the camp in completely (ring outside its adjacency ring)
        for x in 0..7 {
            world.grid.place(&[GridPos::new(x, 5)], BuildingId::new()).unwrap();
        }
        for y in 0..5 {
            world.grid.place(&[GridPos::new(6, y)], BuildingId::new()).unwrap();
        }

        let villager = world.villagers.ids[0];
        let camp_index = world
            .buildings
            .iter_kind(BuildingKind::LumberCamp)
            .next()
            .unwrap();
        let camp = world.buildings.ids[camp_index];
        world.assign_job(villager, camp, JobKind::Lumberjack).unwrap();

        let mut backed_off = false;
        for _ in 0..world.config.path_retry_limit + 1 {
            for event in run_tick(&mut world) {
                if matches!(event, SimulationEvent::PathRetryBackoff { .. }) {
                    backed_off = true;
                }
            }
        }
        assert!(backed_off, "retries should exhaust into a cooldown");

        let index = world.villagers.index_of(villager).unwrap();
        assert!(matches!(
            world.villagers.work_states[index],
            WorkState::Idle { cooldown } if cooldown > 0
        ));
    }

    #[test]
    fn test_starvation_kills_and_releases_binding() {
        let (mut world, villager, _) = working_village();
        world.ledger.set(ResourceKind::Food, 0.0);
        let index = world.villagers.index_of(villager).unwrap();
        world.villagers.needs[index].hunger = 1.0;
        world.villagers.needs[index].health = 0.02;

        let mut died = false;
        for _ in 0..10 {
            for event in run_tick(&mut world) {
                if matches!(event, SimulationEvent::VillagerDied { .. }) {
                    died = true;
                }
            }
        }
        assert!(died);
        assert_eq!(world.villagers.count(), 0);
        assert!(world.jobs.binding_of(villager).is_none());
    }

    #[test]
    fn test_hungry_villager_eats_from_ledger() {
        let mut world = test_world();
        world.request_spawn_villager("Wren", GridPos::new(5, 5));
        run_tick(&mut world);
        world.villagers.needs[0].hunger = 0.9;
        let food_before = world.ledger.get(ResourceKind::Food);

        run_tick(&mut world);

        assert!(world.ledger.get(ResourceKind::Food) < food_before);
        assert!(world.villagers.needs[0].hunger < 0.9);
    }
}
