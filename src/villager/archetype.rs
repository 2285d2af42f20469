//! Villager storage with SoA layout

use crate::core::types::{GridPos, ResourceKind, Tick, VillagerId};
use crate::villager::needs::Needs;
use crate::villager::work_cycle::WorkState;

/// Goods a villager carries home from a finished work cycle
pub type Carried = Vec<(ResourceKind, f32)>;

/// Structure of Arrays for villagers
#[derive(Debug, Clone, Default)]
pub struct VillagerArchetype {
    pub ids: Vec<VillagerId>,
    pub names: Vec<String>,
    pub positions: Vec<GridPos>,
    pub needs: Vec<Needs>,
    pub work_states: Vec<WorkState>,
    /// Output carried from a finished work cycle
    pub carrying: Vec<Carried>,
    /// Consecutive pathfinding failures feeding the retry backoff
    pub path_failures: Vec<u32>,
    pub spawned_ticks: Vec<Tick>,
}

impl VillagerArchetype {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn spawn(&mut self, id: VillagerId, name: String, position: GridPos, tick: Tick) -> usize {
        let index = self.ids.len();
        self.ids.push(id);
        self.names.push(name);
        self.positions.push(position);
        self.needs.push(Needs::default());
        self.work_states.push(WorkState::idle());
        self.carrying.push(Vec::new());
        self.path_failures.push(0);
        self.spawned_ticks.push(tick);
        index
    }

    pub fn index_of(&self, id: VillagerId) -> Option<usize> {
        self.ids.iter().position(|&v| v == id)
    }

    /// Remove a villager row; the last row takes its index.
    pub fn despawn(&mut self, id: VillagerId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.ids.swap_remove(index);
        self.names.swap_remove(index);
        self.positions.swap_remove(index);
        self.needs.swap_remove(index);
        self.work_states.swap_remove(index);
        self.carrying.swap_remove(index);
        self.path_failures.swap_remove(index);
        self.spawned_ticks.swap_remove(index);
        true
    }

    /// Force a villager back to idle, dropping its route, carried goods,
    /// and retry history. Used when a cycle is interrupted.
    pub fn force_idle(&mut self, index: usize) {
        self.work_states[index] = WorkState::idle();
        self.carrying[index].clear();
        self.path_failures[index] = 0;
    }
}
