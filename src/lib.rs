//! Hearthstead - deterministic city-management simulation core
//!
//! The tick coordinator drives villager work cycles, resource
//! accounting, and cached pathfinding over a mutable occupancy grid.
//! UI and engine layers sit outside the core: they enqueue commands,
//! call [`simulation::run_tick`], and consume the returned events.

pub mod city;
pub mod core;
pub mod nav;
pub mod save;
pub mod simulation;
pub mod villager;
pub mod world;
