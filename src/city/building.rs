//! Building storage with SoA layout

use serde::{Deserialize, Serialize};

use crate::core::types::{BuildingId, GridPos, Tick};

/// Kinds of buildings the catalog defines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Stockpile,
    House,
    Farm,
    LumberCamp,
    Quarry,
    Workshop,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 6] = [
        BuildingKind::Stockpile,
        BuildingKind::House,
        BuildingKind::Farm,
        BuildingKind::LumberCamp,
        BuildingKind::Quarry,
        BuildingKind::Workshop,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuildingKind::Stockpile => "stockpile",
            BuildingKind::House => "house",
            BuildingKind::Farm => "farm",
            BuildingKind::LumberCamp => "lumber_camp",
            BuildingKind::Quarry => "quarry",
            BuildingKind::Workshop => "workshop",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stockpile" => Some(BuildingKind::Stockpile),
            "house" => Some(BuildingKind::House),
            "farm" => Some(BuildingKind::Farm),
            "lumber_camp" | "lumbercamp" => Some(BuildingKind::LumberCamp),
            "quarry" => Some(BuildingKind::Quarry),
            "workshop" => Some(BuildingKind::Workshop),
            _ => None,
        }
    }
}

/// Structure of Arrays for placed buildings
#[derive(Debug, Clone, Default)]
pub struct BuildingArchetype {
    pub ids: Vec<BuildingId>,
    pub kinds: Vec<BuildingKind>,
    /// North-west corner of the footprint
    pub origins: Vec<GridPos>,
    pub placed_ticks: Vec<Tick>,
}

impl BuildingArchetype {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn spawn(&mut self, id: BuildingId, kind: BuildingKind, origin: GridPos, tick: Tick) -> usize {
        let index = self.ids.len();
        self.ids.push(id);
        self.kinds.push(kind);
        self.origins.push(origin);
        self.placed_ticks.push(tick);
        index
    }

    pub fn index_of(&self, id: BuildingId) -> Option<usize> {
        self.ids.iter().position(|&b| b == id)
    }

    /// Remove a building row; the last row takes its index.
    pub fn despawn(&mut self, id: BuildingId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.ids.swap_remove(index);
        self.kinds.swap_remove(index);
        self.origins.swap_remove(index);
        self.placed_ticks.swap_remove(index);
        true
    }

    pub fn iter_kind(&self, kind: BuildingKind) -> impl Iterator<Item = usize> + '_ {
        self.kinds
            .iter()
            .enumerate()
            .filter(move |(_, k)| **k == kind)
            .map(|(i, _)| i)
    }
}

/// Cells covered by a `size`-sized footprint anchored at `origin`
pub fn footprint_cells(origin: GridPos, size: (i32, i32)) -> Vec<GridPos> {
    let mut cells = Vec::with_capacity((size.0 * size.1).max(0) as usize);
    for dy in 0..size.1 {
        for dx in 0..size.0 {
            cells.push(GridPos::new(origin.x + dx, origin.y + dy));
        }
    }
    cells
}

/// Cells bordering a footprint, edge by edge in N, E, S, W order.
///
/// Work-site selection scans this list; its fixed order is part of the
/// deterministic tie-break.
pub fn adjacent_cells(origin: GridPos, size: (i32, i32)) -> Vec<GridPos> {
    let (w, h) = size;
    let mut cells = Vec::with_capacity((2 * (w + h)) as usize);
    for dx in 0..w {
        cells.push(GridPos::new(origin.x + dx, origin.y - 1));
    }
    for dy in 0..h {
        cells.push(GridPos::new(origin.x + w, origin.y + dy));
    }
    for dx in 0..w {
        cells.push(GridPos::new(origin.x + dx, origin.y + h));
    }
    for dy in 0..h {
        cells.push(GridPos::new(origin.x - 1, origin.y + dy));
    }
    cells
}
