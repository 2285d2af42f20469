//! Generation-stamped route cache
//!
//! Avoids recomputing shortest paths every tick. An entry is valid only
//! while its stored generation matches the grid's current one; a stale
//! entry is recomputed in place on the next lookup. Unreachable results
//! are cached too, so a walled-off target costs one search per grid
//! mutation instead of one per tick.

use ahash::AHashMap;

use crate::core::error::{Result, SimError};
use crate::core::types::GridPos;
use crate::nav::grid::NavGrid;
use crate::nav::pathfinding::find_path;

#[derive(Debug, Clone)]
struct CacheEntry {
    generation: u64,
    /// None records a failed search
    route: Option<Vec<GridPos>>,
}

/// Route cache keyed by (start, goal)
#[derive(Debug, Default)]
pub struct PathCache {
    entries: AHashMap<(GridPos, GridPos), CacheEntry>,
    hits: u64,
    misses: u64,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached route lookup, recomputing on generation mismatch.
    ///
    /// Fails with `Unreachable` when no route exists; the negative
    /// result is cached until the grid mutates again.
    pub fn get_or_compute(
        &mut self,
        grid: &NavGrid,
        start: GridPos,
        goal: GridPos,
    ) -> Result<&[GridPos]> {
        let key = (start, goal);
        let generation = grid.generation();

        let fresh = self
            .entries
            .get(&key)
            .map_or(false, |entry| entry.generation == generation);
        if fresh {
            self.hits += 1;
        } else {
            self.misses += 1;
            let route = find_path(grid, start, goal);
            self.entries.insert(key, CacheEntry { generation, route });
        }

        match self.entries.get(&key).and_then(|entry| entry.route.as_deref()) {
            Some(route) => Ok(route),
            None => Err(SimError::Unreachable {
                from: start,
                to: goal,
            }),
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry regardless of generation
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BuildingId;

    #[test]
    fn test_repeat_query_hits_cache() {
        let grid = NavGrid::new(10, 10);
        let mut cache = PathCache::new();
        let start = GridPos::new(0, 0);
        let goal = GridPos::new(5, 5);

        let first = cache.get_or_compute(&grid, start, goal).unwrap().to_vec();
        let second = cache.get_or_compute(&grid, start, goal).unwrap().to_vec();

        assert_eq!(first, second);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_grid_mutation_invalidates_route() {
        let mut grid = NavGrid::new(10, 10);
        let mut cache = PathCache::new();
        let start = GridPos::new(0, 2);
        let goal = GridPos::new(6, 2);

        let before = cache.get_or_compute(&grid, start, goal).unwrap().to_vec();
        assert!(before.contains(&GridPos::new(3, 2)));

        // Wall off the straight route; the cached path crosses it and
        // must never be served again
        for y in 0..9 {
            grid.place(&[GridPos::new(3, y)], BuildingId::new()).unwrap();
        }

        let after = cache.get_or_compute(&grid, start, goal).unwrap().to_vec();
        assert!(!after.iter().any(|p| p.x == 3 && p.y < 9));
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_unreachable_is_cached() {
        let mut grid = NavGrid::new(10, 10);
        let goal = GridPos::new(5, 5);
        for neighbor in goal.neighbors4() {
            grid.place(&[neighbor], BuildingId::new()).unwrap();
        }
        let mut cache = PathCache::new();
        let start = GridPos::new(0, 0);

        assert!(matches!(
            cache.get_or_compute(&grid, start, goal),
            Err(SimError::Unreachable { .. })
        ));
        assert!(matches!(
            cache.get_or_compute(&grid, start, goal),
            Err(SimError::Unreachable { .. })
        ));

        // Second failure came from the cache, not a new search
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_unreachable_retried_after_mutation() {
        let mut grid = NavGrid::new(10, 10);
        let goal = GridPos::new(5, 5);
        let blockers: Vec<BuildingId> = goal
            .neighbors4()
            .iter()
            .map(|pos| {
                let id = BuildingId::new();
                grid.place(&[*pos], id).unwrap();
                id
            })
            .collect();
        let mut cache = PathCache::new();
        let start = GridPos::new(0, 0);

        assert!(cache.get_or_compute(&grid, start, goal).is_err());

        grid.remove(blockers[0]);
        assert!(cache.get_or_compute(&grid, start, goal).is_ok());
    }

    #[test]
    fn test_clear() {
        let grid = NavGrid::new(4, 4);
        let mut cache = PathCache::new();
        cache
            .get_or_compute(&grid, GridPos::new(0, 0), GridPos::new(1, 1))
            .unwrap();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
