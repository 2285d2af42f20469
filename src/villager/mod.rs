//! Villager layer - storage, needs, and the work-cycle state machine

pub mod archetype;
pub mod needs;
pub mod work_cycle;

pub use archetype::VillagerArchetype;
pub use needs::Needs;
pub use work_cycle::{Route, WorkState};
