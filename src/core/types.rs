//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for villagers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VillagerId(pub Uuid);

impl VillagerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VillagerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for buildings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub Uuid);

impl BuildingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BuildingId {
    fn default() -> Self {
        Self::new()
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// A cell coordinate on the navigation grid
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, the movement metric on a 4-connected grid
    pub fn manhattan(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four cardinal neighbors in fixed N, E, S, W order.
    ///
    /// Pathfinding expands neighbors in this order; equal-cost routes
    /// resolve the same way on every run because of it.
    pub fn neighbors4(&self) -> [GridPos; 4] {
        [
            GridPos::new(self.x, self.y - 1),
            GridPos::new(self.x + 1, self.y),
            GridPos::new(self.x, self.y + 1),
            GridPos::new(self.x - 1, self.y),
        ]
    }
}

/// Resource vocabulary shared by the ledger, recipes, and building costs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wood,
    Stone,
    Food,
    Plank,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Food,
        ResourceKind::Plank,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Wood => "wood",
            ResourceKind::Stone => "stone",
            ResourceKind::Food => "food",
            ResourceKind::Plank => "plank",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wood" => Some(ResourceKind::Wood),
            "stone" => Some(ResourceKind::Stone),
            "food" => Some(ResourceKind::Food),
            "plank" => Some(ResourceKind::Plank),
            _ => None,
        }
    }
}

/// Job vocabulary offered by buildings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Farmer,
    Lumberjack,
    Mason,
    Crafter,
}

impl JobKind {
    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Farmer => "farmer",
            JobKind::Lumberjack => "lumberjack",
            JobKind::Mason => "mason",
            JobKind::Crafter => "crafter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "farmer" => Some(JobKind::Farmer),
            "lumberjack" => Some(JobKind::Lumberjack),
            "mason" => Some(JobKind::Mason),
            "crafter" => Some(JobKind::Crafter),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_villager_id_unique() {
        let a = VillagerId::new();
        let b = VillagerId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_building_id_hash() {
        use std::collections::HashMap;
        let id = BuildingId::new();
        let mut map: HashMap<BuildingId, &str> = HashMap::new();
        map.insert(id, "farm");
        assert_eq!(map.get(&id), Some(&"farm"));
    }

    #[test]
    fn test_manhattan_distance() {
        let a = GridPos::new(2, 3);
        let b = GridPos::new(5, 1);
        assert_eq!(a.manhattan(&b), 5);
        assert_eq!(b.manhattan(&a), 5);
        assert_eq!(a.manhattan(&a), 0);
    }

    #[test]
    fn test_neighbor_order_is_nesw() {
        let p = GridPos::new(4, 4);
        assert_eq!(
            p.neighbors4(),
            [
                GridPos::new(4, 3),
                GridPos::new(5, 4),
                GridPos::new(4, 5),
                GridPos::new(3, 4),
            ]
        );
    }

    #[test]
    fn test_resource_kind_parse_roundtrip() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::parse(kind.name()), Some(kind));
        }
        assert_eq!(ResourceKind::parse("gold"), None);
    }

    #[test]
    fn test_job_kind_parse() {
        assert_eq!(JobKind::parse("Farmer"), Some(JobKind::Farmer));
        assert_eq!(JobKind::parse("banker"), None);
    }
}
