//! Stop-the-world snapshot and restore
//!
//! Snapshots are taken between ticks and carry the observable state:
//! ledger amounts, buildings, villagers (including their work-cycle
//! state), and job bindings. The nav grid is rebuilt from building
//! footprints on restore and the path cache restarts cold, so neither
//! is written out.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::city::building::{footprint_cells, BuildingKind};
use crate::city::catalog::Catalog;
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{BuildingId, GridPos, JobKind, ResourceKind, Tick, VillagerId};
use crate::villager::needs::Needs;
use crate::villager::work_cycle::WorkState;
use crate::world::World;

/// Bumped whenever the snapshot layout changes
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRow {
    pub resource: ResourceKind,
    pub amount: f32,
    pub capacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRow {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub origin: GridPos,
    pub placed_tick: Tick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillagerRow {
    pub id: VillagerId,
    pub name: String,
    pub position: GridPos,
    pub needs: Needs,
    pub state: WorkState,
    pub carrying: Vec<(ResourceKind, f32)>,
    pub path_failures: u32,
    pub spawned_tick: Tick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingRow {
    pub villager: VillagerId,
    pub building: BuildingId,
    pub job: JobKind,
}

/// A complete world snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    pub tick: Tick,
    pub grid_width: i32,
    pub grid_height: i32,
    pub resources: Vec<ResourceRow>,
    pub buildings: Vec<BuildingRow>,
    pub villagers: Vec<VillagerRow>,
    pub bindings: Vec<BindingRow>,
}

/// Capture the current state.
///
/// Rows follow archetype order and resources are sorted, so identical
/// worlds serialize identically.
pub fn snapshot(world: &World) -> SaveGame {
    let resources = world
        .ledger
        .entries_sorted()
        .into_iter()
        .map(|(resource, entry)| ResourceRow {
            resource,
            amount: entry.amount,
            capacity: entry.capacity,
        })
        .collect();

    let buildings = (0..world.buildings.count())
        .map(|i| BuildingRow {
            id: world.buildings.ids[i],
            kind: world.buildings.kinds[i],
            origin: world.buildings.origins[i],
            placed_tick: world.buildings.placed_ticks[i],
        })
        .collect();

    let villagers = (0..world.villagers.count())
        .map(|i| VillagerRow {
            id: world.villagers.ids[i],
            name: world.villagers.names[i].clone(),
            position: world.villagers.positions[i],
            needs: world.villagers.needs[i].clone(),
            state: world.villagers.work_states[i].clone(),
            carrying: world.villagers.carrying[i].clone(),
            path_failures: world.villagers.path_failures[i],
            spawned_tick: world.villagers.spawned_ticks[i],
        })
        .collect();

    let bindings = (0..world.villagers.count())
        .filter_map(|i| {
            let villager = world.villagers.ids[i];
            world.jobs.binding_of(villager).map(|binding| BindingRow {
                villager,
                building: binding.building,
                job: binding.job,
            })
        })
        .collect();

    SaveGame {
        version: SAVE_VERSION,
        tick: world.current_tick,
        grid_width: world.grid.width(),
        grid_height: world.grid.height(),
        resources,
        buildings,
        villagers,
        bindings,
    }
}

/// Rebuild a world from a snapshot against the given config and catalog.
///
/// Fails when the snapshot is internally inconsistent (overlapping
/// footprints, bindings to missing buildings) rather than loading a
/// corrupt city.
pub fn restore(save: &SaveGame, config: SimulationConfig, catalog: Catalog) -> Result<World> {
    if save.version != SAVE_VERSION {
        return Err(SimError::SaveVersion {
            found: save.version,
            expected: SAVE_VERSION,
        });
    }

    let mut world = World::new(config, catalog, save.grid_width, save.grid_height);
    world.current_tick = save.tick;

    for row in &save.resources {
        world.ledger.set_capacity(row.resource, row.capacity);
        world.ledger.set(row.resource, row.amount);
    }

    for row in &save.buildings {
        let def = world
            .catalog
            .building(row.kind)
            .ok_or(SimError::UnknownBuildingKind(row.kind))?;
        let footprint = footprint_cells(row.origin, def.size);
        world.grid.place(&footprint, row.id)?;
        world.buildings.spawn(row.id, row.kind, row.origin, row.placed_tick);
    }

    for row in &save.villagers {
        let index = world
            .villagers
            .spawn(row.id, row.name.clone(), row.position, row.spawned_tick);
        world.villagers.needs[index] = row.needs.clone();
        world.villagers.work_states[index] = row.state.clone();
        world.villagers.carrying[index] = row.carrying.clone();
        world.villagers.path_failures[index] = row.path_failures;
    }

    for row in &save.bindings {
        let b_index = world
            .buildings
            .index_of(row.building)
            .ok_or(SimError::UnknownBuilding(row.building))?;
        let kind = world.buildings.kinds[b_index];
        let def = world
            .catalog
            .building(kind)
            .ok_or(SimError::UnknownBuildingKind(kind))?;
        world.jobs.assign(row.villager, row.building, row.job, def)?;
    }

    Ok(world)
}

impl SaveGame {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_from_file(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::BuildingKind;

    fn seeded_world() -> World {
        let mut world = World::new(SimulationConfig::default(), Catalog::with_defaults(), 24, 24);
        world.ledger.set(ResourceKind::Wood, 150.0);
        world.ledger.set(ResourceKind::Food, 40.0);
        world
    }

    #[test]
    fn test_snapshot_roundtrips_through_json() {
        let world = seeded_world();
        let save = snapshot(&world);

        let json = save.to_json().unwrap();
        let parsed = SaveGame::from_json(&json).unwrap();
        assert_eq!(save, parsed);
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let world = seeded_world();
        let mut save = snapshot(&world);
        save.version = 99;

        let err = restore(&save, SimulationConfig::default(), Catalog::with_defaults())
            .unwrap_err();
        assert!(matches!(err, SimError::SaveVersion { found: 99, .. }));
    }

    #[test]
    fn test_restore_rebuilds_grid_from_footprints() {
        let mut world = seeded_world();
        world.request_place_building(BuildingKind::Stockpile, GridPos::new(3, 3));
        crate::simulation::tick::run_tick(&mut world);

        let save = snapshot(&world);
        let restored = restore(&save, SimulationConfig::default(), Catalog::with_defaults())
            .unwrap();

        assert!(!restored.grid.is_walkable(GridPos::new(3, 3)));
        assert!(!restored.grid.is_walkable(GridPos::new(4, 4)));
        assert!(restored.grid.is_walkable(GridPos::new(5, 5)));
        assert_eq!(restored.building_count(), 1);
        assert_eq!(restored.current_tick, world.current_tick);
    }

    #[test]
    fn test_restore_rejects_overlapping_buildings() {
        let world = seeded_world();
        let mut save = snapshot(&world);
        save.buildings.push(BuildingRow {
            id: BuildingId::new(),
            kind: BuildingKind::Stockpile,
            origin: GridPos::new(2, 2),
            placed_tick: 0,
        });
        save.buildings.push(BuildingRow {
            id: BuildingId::new(),
            kind: BuildingKind::Stockpile,
            origin: GridPos::new(3, 3),
            placed_tick: 0,
        });

        let err = restore(&save, SimulationConfig::default(), Catalog::with_defaults())
            .unwrap_err();
        assert!(matches!(err, SimError::Collision(_)));
    }

    #[test]
    fn test_restore_rejects_binding_to_missing_building() {
        let mut world = seeded_world();
        world.request_spawn_villager("Wren", GridPos::new(5, 5));
        crate::simulation::tick::run_tick(&mut world);

        let mut save = snapshot(&world);
        save.bindings.push(BindingRow {
            villager: save.villagers[0].id,
            building: BuildingId::new(),
            job: JobKind::Farmer,
        });

        let err = restore(&save, SimulationConfig::default(), Catalog::with_defaults())
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownBuilding(_)));
    }
}
