//! Simulation events
//!
//! These events are returned by `run_tick` for the UI layer, which is a
//! pure consumer: it reacts after the mutation happened, never during.

use serde::{Deserialize, Serialize};

use crate::city::building::BuildingKind;
use crate::core::types::{BuildingId, GridPos, ResourceKind, Tick, VillagerId};

/// Why a queued placement or spawn was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    Collision,
    Insufficient,
    UnknownKind,
    Unwalkable,
}

/// Events generated during a simulation tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulationEvent {
    /// A queued placement succeeded
    BuildingPlaced {
        building: BuildingId,
        kind: BuildingKind,
        origin: GridPos,
    },
    /// A queued placement was refused; the grid and ledger are untouched
    PlacementRejected {
        kind: BuildingKind,
        origin: GridPos,
        reason: RejectReason,
    },
    BuildingRemoved {
        building: BuildingId,
        kind: BuildingKind,
    },
    VillagerSpawned {
        villager: VillagerId,
        name: String,
    },
    SpawnRejected {
        name: String,
        position: GridPos,
        reason: RejectReason,
    },
    VillagerRemoved {
        villager: VillagerId,
    },
    VillagerDied {
        villager: VillagerId,
        name: String,
        tick: Tick,
    },
    /// A work cycle was cut short; route and carried goods were discarded
    CycleInterrupted {
        villager: VillagerId,
    },
    /// A villager set out for its work site
    WorkStarted {
        villager: VillagerId,
        building: BuildingId,
    },
    /// A queued deposit landed; `stored` may be less than `offered` when
    /// the ledger clamped at capacity
    DepositApplied {
        resource: ResourceKind,
        offered: f32,
        stored: f32,
    },
    /// A ledger amount changed; `amount` is the new level
    ResourceChanged {
        resource: ResourceKind,
        amount: f32,
    },
    /// A villager gave up pathfinding for a while
    PathRetryBackoff {
        villager: VillagerId,
        cooldown: u32,
    },
}
