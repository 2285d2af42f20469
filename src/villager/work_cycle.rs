//! Work-cycle state machine
//!
//! A villager with a job walks to its work site, works the recipe
//! duration, carries the output to the nearest depot, and hands it
//! over. Every multi-tick wait is explicit state resumed on later
//! ticks; nothing blocks inside a tick. The per-tick transition logic
//! lives in `simulation::tick`, which owns the phase ordering.

use serde::{Deserialize, Serialize};

use crate::core::types::GridPos;

/// A computed route being walked, one cell per tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub cells: Vec<GridPos>,
    pub cursor: usize,
}

impl Route {
    /// Wrap a pathfinder route (which includes the start cell) so the
    /// first step moves off it.
    pub fn from_path(cells: &[GridPos]) -> Self {
        Self {
            cells: cells.to_vec(),
            cursor: 1,
        }
    }

    pub fn next_cell(&self) -> Option<GridPos> {
        self.cells.get(self.cursor).copied()
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.cells.len()
    }

    /// Cells still ahead of the walker
    pub fn remaining(&self) -> usize {
        self.cells.len().saturating_sub(self.cursor)
    }
}

/// Per-villager work-cycle state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkState {
    /// Nothing to do; `cooldown` ticks must pass before the next attempt
    Idle { cooldown: u32 },
    /// Walking to the work site
    Pathing { route: Route },
    /// Working the recipe; counts down to zero
    Acting { remaining: u32 },
    /// Carrying output back to a depot
    Returning { route: Route },
    /// Handing the carried output to the ledger this tick
    Depositing,
}

impl WorkState {
    pub fn idle() -> Self {
        WorkState::Idle { cooldown: 0 }
    }

    pub fn idle_for(cooldown: u32) -> Self {
        WorkState::Idle { cooldown }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WorkState::Idle { .. } => "idle",
            WorkState::Pathing { .. } => "pathing",
            WorkState::Acting { .. } => "acting",
            WorkState::Returning { .. } => "returning",
            WorkState::Depositing => "depositing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, WorkState::Idle { .. })
    }
}

impl Default for WorkState {
    fn default() -> Self {
        Self::idle()
    }
}
