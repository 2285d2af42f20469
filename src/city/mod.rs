//! City layer - buildings, data tables, jobs, and the resource ledger

pub mod building;
pub mod catalog;
pub mod jobs;
pub mod ledger;

pub use building::{adjacent_cells, footprint_cells, BuildingArchetype, BuildingKind};
pub use catalog::{BuildingDef, Catalog, CatalogError, Recipe, ResourceDef};
pub use jobs::{JobBinding, JobBoard};
pub use ledger::{LedgerEntry, ResourceLedger};
