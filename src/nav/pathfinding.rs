//! A* pathfinding over the navigation grid
//!
//! Unit edge cost, 4-connected. Neighbor expansion follows the fixed
//! N, E, S, W order and heap ties resolve by position, so equal-cost
//! routes come out identical on every run.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::core::types::GridPos;
use crate::nav::grid::NavGrid;

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    pos: GridPos,
    g_cost: u32,
    f_cost: u32, // g_cost + heuristic
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.g_cost == other.g_cost && self.pos == other.pos
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; ties fall through to position so
        // the ordering is total
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a shortest path from `start` to `goal` over walkable cells.
///
/// The route includes both endpoints. `start` is not required to be
/// walkable (a building may have been placed under a standing villager);
/// `goal` is. Returns None when no route exists.
pub fn find_path(grid: &NavGrid, start: GridPos, goal: GridPos) -> Option<Vec<GridPos>> {
    if !grid.in_bounds(start) || !grid.is_walkable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<GridPos, GridPos> = AHashMap::new();
    let mut g_scores: AHashMap<GridPos, u32> = AHashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        pos: start,
        g_cost: 0,
        f_cost: start.manhattan(&goal),
    });

    while let Some(current) = open_set.pop() {
        if current.pos == goal {
            return Some(reconstruct_path(&came_from, current.pos));
        }

        let current_g = *g_scores.get(&current.pos).unwrap_or(&u32::MAX);
        if current.g_cost > current_g {
            continue; // stale heap entry
        }

        for neighbor in current.pos.neighbors4() {
            if !grid.is_walkable(neighbor) {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.pos);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    pos: neighbor,
                    g_cost: tentative_g,
                    f_cost: tentative_g + neighbor.manhattan(&goal),
                });
            }
        }
    }

    None // No path found
}

/// Reconstruct path from came_from map
fn reconstruct_path(came_from: &AHashMap<GridPos, GridPos>, mut current: GridPos) -> Vec<GridPos> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
