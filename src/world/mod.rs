//! Owning context for the whole simulation
//!
//! Every manager is a plain struct field, constructed once and borrowed
//! by the tick coordinator — no globals. External callers interact
//! between ticks through the request queue and pure queries; all
//! mutation of shared state happens inside `simulation::tick::run_tick`.

use std::collections::VecDeque;

use crate::city::building::{footprint_cells, BuildingArchetype, BuildingKind};
use crate::city::catalog::Catalog;
use crate::city::jobs::JobBoard;
use crate::city::ledger::ResourceLedger;
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{BuildingId, GridPos, JobKind, Tick, VillagerId};
use crate::nav::grid::NavGrid;
use crate::nav::path_cache::PathCache;
use crate::simulation::commands::Command;
use crate::villager::archetype::VillagerArchetype;

/// The simulation world
#[derive(Debug)]
pub struct World {
    pub config: SimulationConfig,
    pub catalog: Catalog,
    pub grid: NavGrid,
    pub paths: PathCache,
    pub ledger: ResourceLedger,
    pub jobs: JobBoard,
    pub buildings: BuildingArchetype,
    pub villagers: VillagerArchetype,
    pub current_tick: Tick,
    commands: VecDeque<Command>,
}

impl World {
    /// Build a world with an empty grid and a ledger seeded from the
    /// catalog's resource table
    pub fn new(config: SimulationConfig, catalog: Catalog, width: i32, height: i32) -> Self {
        let mut ledger = ResourceLedger::new();
        for def in catalog.resources() {
            ledger.set_capacity(def.kind, def.capacity);
        }
        Self {
            config,
            catalog,
            grid: NavGrid::new(width, height),
            paths: PathCache::new(),
            ledger,
            jobs: JobBoard::new(),
            buildings: BuildingArchetype::new(),
            villagers: VillagerArchetype::new(),
            current_tick: 0,
            commands: VecDeque::new(),
        }
    }

    // --- queued mutations, applied in the next tick's phase 1 ---

    pub fn request_place_building(&mut self, kind: BuildingKind, origin: GridPos) {
        self.commands.push_back(Command::PlaceBuilding { kind, origin });
    }

    pub fn request_remove_building(&mut self, building: BuildingId) {
        self.commands.push_back(Command::RemoveBuilding { building });
    }

    pub fn request_spawn_villager(&mut self, name: impl Into<String>, position: GridPos) {
        self.commands.push_back(Command::SpawnVillager {
            name: name.into(),
            position,
        });
    }

    pub fn request_remove_villager(&mut self, villager: VillagerId) {
        self.commands.push_back(Command::RemoveVillager { villager });
    }

    pub(crate) fn pop_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    // --- direct job management (between ticks; touches no grid or
    // ledger state, so it needs no queueing) ---

    /// Bind a villager to a building for `job`
    pub fn assign_job(
        &mut self,
        villager: VillagerId,
        building: BuildingId,
        job: JobKind,
    ) -> Result<()> {
        if self.villagers.index_of(villager).is_none() {
            return Err(SimError::UnknownVillager(villager));
        }
        let b_index = self
            .buildings
            .index_of(building)
            .ok_or(SimError::UnknownBuilding(building))?;
        let kind = self.buildings.kinds[b_index];
        let def = self
            .catalog
            .building(kind)
            .ok_or(SimError::UnknownBuildingKind(kind))?;
        self.jobs.assign(villager, building, job, def)
    }

    /// Release a villager's binding and interrupt its cycle.
    ///
    /// Idempotent: releasing an unbound villager is a no-op.
    pub fn unassign_job(&mut self, villager: VillagerId) {
        if self.jobs.binding_of(villager).is_none() {
            return;
        }
        self.jobs.unassign(villager);
        if let Some(index) = self.villagers.index_of(villager) {
            self.villagers.force_idle(index);
        }
    }

    // --- pure queries for the UI ---

    /// Placement pre-check: catalog entry, bounds, collision, cost.
    /// Performs no mutation; the matching command can still fail next
    /// tick if the world changed in between.
    pub fn can_place(&self, kind: BuildingKind, origin: GridPos) -> Result<()> {
        let def = self
            .catalog
            .building(kind)
            .ok_or(SimError::UnknownBuildingKind(kind))?;
        let footprint = footprint_cells(origin, def.size);
        self.grid.can_place(&footprint)?;
        self.ledger.check_afford(&def.cost)
    }

    pub fn population(&self) -> usize {
        self.villagers.count()
    }

    pub fn building_count(&self) -> usize {
        self.buildings.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ResourceKind;
    use crate::simulation::tick::run_tick;
    use crate::villager::work_cycle::WorkState;

    fn small_world() -> World {
        World::new(SimulationConfig::default(), Catalog::with_defaults(), 16, 16)
    }

    #[test]
    fn test_new_world_seeds_ledger_from_catalog() {
        let world = small_world();
        assert_eq!(world.ledger.capacity(ResourceKind::Wood), 500.0);
        assert_eq!(world.ledger.get(ResourceKind::Wood), 0.0);
    }

    #[test]
    fn test_requests_queue_until_tick() {
        let mut world = small_world();
        world.request_place_building(BuildingKind::Stockpile, GridPos::new(1, 1));
        assert_eq!(world.pending_commands(), 1);
        assert_eq!(world.building_count(), 0);

        run_tick(&mut world);
        assert_eq!(world.pending_commands(), 0);
        assert_eq!(world.building_count(), 1);
    }

    #[test]
    fn test_can_place_reports_collision_and_cost() {
        let mut world = small_world();
        world.request_place_building(BuildingKind::Stockpile, GridPos::new(1, 1));
        run_tick(&mut world);

        assert!(matches!(
            world.can_place(BuildingKind::Stockpile, GridPos::new(2, 2)),
            Err(SimError::Collision(_))
        ));
        assert!(matches!(
            world.can_place(BuildingKind::Farm, GridPos::new(8, 8)),
            Err(SimError::Insufficient { .. })
        ));

        world.ledger.set(ResourceKind::Wood, 100.0);
        assert!(world.can_place(BuildingKind::Farm, GridPos::new(8, 8)).is_ok());
    }

    #[test]
    fn test_assign_job_validates_ids() {
        let mut world = small_world();
        let err = world
            .assign_job(VillagerId::new(), BuildingId::new(), JobKind::Farmer)
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownVillager(_)));
    }

    #[test]
    fn test_unassign_job_interrupts_cycle() {
        let mut world = small_world();
        world.ledger.set(ResourceKind::Wood, 100.0);
        world.request_place_building(BuildingKind::Stockpile, GridPos::new(1, 1));
        world.request_place_building(BuildingKind::LumberCamp, GridPos::new(8, 8));
        world.request_spawn_villager("Wren", GridPos::new(5, 5));
        run_tick(&mut world);

        let villager = world.villagers.ids[0];
        let camp_index = world
            .buildings
            .iter_kind(BuildingKind::LumberCamp)
            .next()
            .unwrap();
        let camp = world.buildings.ids[camp_index];
        world.assign_job(villager, camp, JobKind::Lumberjack).unwrap();
        run_tick(&mut world);
        assert!(!world.villagers.work_states[0].is_idle());

        world.unassign_job(villager);
        assert_eq!(world.villagers.work_states[0], WorkState::idle());
        assert!(world.jobs.binding_of(villager).is_none());

        // Idempotent on the second call
        world.unassign_job(villager);
        assert!(world.jobs.binding_of(villager).is_none());
    }
}
