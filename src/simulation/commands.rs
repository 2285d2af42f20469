//! Queued world mutations
//!
//! Mutations coming from outside the tick (UI intents) are queued and
//! drained in tick phase 1. Villagers therefore always path against the
//! grid as it stands when their turn comes, never against a half-applied
//! edit.

use serde::{Deserialize, Serialize};

use crate::city::building::BuildingKind;
use crate::core::types::{BuildingId, GridPos, VillagerId};

/// A pending world mutation, applied at the start of the next tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    PlaceBuilding { kind: BuildingKind, origin: GridPos },
    RemoveBuilding { building: BuildingId },
    SpawnVillager { name: String, position: GridPos },
    RemoveVillager { villager: VillagerId },
}
