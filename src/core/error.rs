use crate::city::building::BuildingKind;
use crate::core::types::{BuildingId, GridPos, JobKind, ResourceKind, VillagerId};
use thiserror::Error;

/// Simulation error taxonomy.
///
/// Every gameplay variant is recoverable: the tick coordinator receives
/// the value and applies a fallback inline (skip, retry, clamp, or
/// no-op). Nothing here crosses the core boundary as a panic.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("footprint collides at {0:?}")]
    Collision(GridPos),

    #[error("no route from {from:?} to {to:?}")]
    Unreachable { from: GridPos, to: GridPos },

    #[error("insufficient {}: need {needed}, have {available}", .resource.name())]
    Insufficient {
        resource: ResourceKind,
        needed: f32,
        available: f32,
    },

    #[error("building {building:?} is at worker capacity ({capacity})")]
    CapacityExceeded { building: BuildingId, capacity: u32 },

    #[error("building {building:?} does not offer {} work", .job.name())]
    JobMismatch { building: BuildingId, job: JobKind },

    #[error("unknown villager: {0:?}")]
    UnknownVillager(VillagerId),

    #[error("unknown building: {0:?}")]
    UnknownBuilding(BuildingId),

    #[error("no catalog entry for building kind {0:?}")]
    UnknownBuildingKind(BuildingKind),

    #[error("save format version {found} is not supported (expected {expected})")]
    SaveVersion { found: u32, expected: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
