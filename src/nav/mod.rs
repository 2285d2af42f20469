//! Navigation layer - occupancy grid, pathfinding, and the route cache

pub mod grid;
pub mod path_cache;
pub mod pathfinding;

pub use grid::NavGrid;
pub use path_cache::PathCache;
pub use pathfinding::find_path;
