//! Job assignment table - villager/building bindings with capacity limits

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::city::catalog::BuildingDef;
use crate::core::error::{Result, SimError};
use crate::core::types::{BuildingId, JobKind, VillagerId};

/// A villager's live job binding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobBinding {
    pub building: BuildingId,
    pub job: JobKind,
}

/// Bindings between villagers and the buildings they work
#[derive(Debug, Clone, Default)]
pub struct JobBoard {
    by_villager: AHashMap<VillagerId, JobBinding>,
    /// Workers per building in assignment order
    by_building: AHashMap<BuildingId, Vec<VillagerId>>,
}

impl JobBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a villager to a building for `job`.
    ///
    /// An existing binding is released first, so re-assigning moves the
    /// villager rather than erroring. Fails without side effects when
    /// the building does not offer `job` or its slots are full.
    pub fn assign(
        &mut self,
        villager: VillagerId,
        building: BuildingId,
        job: JobKind,
        def: &BuildingDef,
    ) -> Result<()> {
        if def.job != Some(job) {
            return Err(SimError::JobMismatch { building, job });
        }

        // A villager moving within the same building does not count
        // against its own slot
        let occupancy = self
            .by_building
            .get(&building)
            .map_or(0, |workers| workers.iter().filter(|v| **v != villager).count());
        if occupancy as u32 >= def.worker_capacity {
            return Err(SimError::CapacityExceeded {
                building,
                capacity: def.worker_capacity,
            });
        }

        self.unassign(villager);
        self.by_villager.insert(villager, JobBinding { building, job });
        self.by_building.entry(building).or_default().push(villager);
        Ok(())
    }

    /// Release a villager's binding. No-op when unbound.
    pub fn unassign(&mut self, villager: VillagerId) {
        let Some(binding) = self.by_villager.remove(&villager) else {
            return;
        };
        if let Some(workers) = self.by_building.get_mut(&binding.building) {
            workers.retain(|v| *v != villager);
            if workers.is_empty() {
                self.by_building.remove(&binding.building);
            }
        }
    }

    /// Release every worker of a building, returned in assignment order.
    ///
    /// Runs before the grid frees the footprint so no binding can point
    /// at a removed building.
    pub fn release_building(&mut self, building: BuildingId) -> Vec<VillagerId> {
        let workers = self.by_building.remove(&building).unwrap_or_default();
        for villager in &workers {
            self.by_villager.remove(villager);
        }
        workers
    }

    pub fn binding_of(&self, villager: VillagerId) -> Option<JobBinding> {
        self.by_villager.get(&villager).copied()
    }

    pub fn workers_of(&self, building: BuildingId) -> &[VillagerId] {
        self.by_building
            .get(&building)
            .map_or(&[], |workers| workers.as_slice())
    }

    pub fn assigned_count(&self) -> usize {
        self.by_villager.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::BuildingKind;

    fn farm_def(capacity: u32) -> BuildingDef {
        BuildingDef {
            kind: BuildingKind::Farm,
            name: "Farm".into(),
            size: (3, 3),
            cost: vec![],
            job: Some(JobKind::Farmer),
            worker_capacity: capacity,
            recipe: None,
            depot: false,
        }
    }

    #[test]
    fn test_assign_and_query() {
        let mut board = JobBoard::new();
        let villager = VillagerId::new();
        let building = BuildingId::new();

        board
            .assign(villager, building, JobKind::Farmer, &farm_def(2))
            .unwrap();

        let binding = board.binding_of(villager).unwrap();
        assert_eq!(binding.building, building);
        assert_eq!(binding.job, JobKind::Farmer);
        assert_eq!(board.workers_of(building), &[villager]);
    }

    #[test]
    fn test_capacity_exceeded_leaves_state_unchanged() {
        let mut board = JobBoard::new();
        let building = BuildingId::new();
        let def = farm_def(1);

        let first = VillagerId::new();
        let second = VillagerId::new();
        board.assign(first, building, JobKind::Farmer, &def).unwrap();

        let err = board
            .assign(second, building, JobKind::Farmer, &def)
            .unwrap_err();
        assert!(matches!(err, SimError::CapacityExceeded { .. }));
        assert!(board.binding_of(second).is_none());
        assert_eq!(board.workers_of(building), &[first]);
    }

    #[test]
    fn test_job_mismatch() {
        let mut board = JobBoard::new();
        let building = BuildingId::new();

        let err = board
            .assign(VillagerId::new(), building, JobKind::Mason, &farm_def(2))
            .unwrap_err();
        assert!(matches!(err, SimError::JobMismatch { .. }));
    }

    #[test]
    fn test_unassign_is_idempotent() {
        let mut board = JobBoard::new();
        let villager = VillagerId::new();
        let building = BuildingId::new();
        board
            .assign(villager, building, JobKind::Farmer, &farm_def(2))
            .unwrap();

        board.unassign(villager);
        assert!(board.binding_of(villager).is_none());
        assert!(board.workers_of(building).is_empty());

        // Second unassign is a no-op, not an error
        board.unassign(villager);
        assert!(board.binding_of(villager).is_none());
    }

    #[test]
    fn test_reassign_moves_binding() {
        let mut board = JobBoard::new();
        let villager = VillagerId::new();
        let farm_a = BuildingId::new();
        let farm_b = BuildingId::new();
        let def = farm_def(2);

        board.assign(villager, farm_a, JobKind::Farmer, &def).unwrap();
        board.assign(villager, farm_b, JobKind::Farmer, &def).unwrap();

        assert_eq!(board.binding_of(villager).unwrap().building, farm_b);
        assert!(board.workers_of(farm_a).is_empty());
        assert_eq!(board.workers_of(farm_b), &[villager]);
    }

    #[test]
    fn test_rebind_same_building_does_not_count_own_slot() {
        let mut board = JobBoard::new();
        let villager = VillagerId::new();
        let building = BuildingId::new();
        let def = farm_def(1);

        board.assign(villager, building, JobKind::Farmer, &def).unwrap();
        // Re-assigning the sole worker to its own full building succeeds
        board.assign(villager, building, JobKind::Farmer, &def).unwrap();
        assert_eq!(board.workers_of(building), &[villager]);
    }

    #[test]
    fn test_release_building_clears_all_bindings() {
        let mut board = JobBoard::new();
        let building = BuildingId::new();
        let def = farm_def(3);
        let a = VillagerId::new();
        let b = VillagerId::new();
        board.assign(a, building, JobKind::Farmer, &def).unwrap();
        board.assign(b, building, JobKind::Farmer, &def).unwrap();

        let released = board.release_building(building);
        assert_eq!(released, vec![a, b]);
        assert!(board.binding_of(a).is_none());
        assert!(board.binding_of(b).is_none());
        assert_eq!(board.assigned_count(), 0);
    }
}
