//! Static data tables for buildings and resources
//!
//! Loaded once at startup; the simulation treats them as read-only.
//! Defaults live in code, and the same tables can be loaded from TOML
//! files.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::city::building::BuildingKind;
use crate::core::types::{JobKind, ResourceKind};

/// Production recipe: inputs consumed when a work cycle starts, outputs
/// carried to a depot when it finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub inputs: Vec<(ResourceKind, f32)>,
    pub outputs: Vec<(ResourceKind, f32)>,
    /// Work cycle length in ticks
    pub duration_ticks: u32,
}

/// Static definition of one building kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingDef {
    pub kind: BuildingKind,
    pub name: String,
    /// Footprint (width, height) in cells
    pub size: (i32, i32),
    pub cost: Vec<(ResourceKind, f32)>,
    /// Job offered to assigned villagers, if any
    pub job: Option<JobKind>,
    pub worker_capacity: u32,
    pub recipe: Option<Recipe>,
    /// Depots accept deposits from returning villagers
    pub depot: bool,
}

/// Static definition of one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDef {
    pub kind: ResourceKind,
    pub capacity: f32,
}

/// Error type for catalog loading
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unknown building kind: {0}")]
    UnknownBuildingKind(String),
    #[error("unknown job: {0}")]
    UnknownJob(String),
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

/// Catalog of building and resource definitions
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    buildings: Vec<BuildingDef>,
    resources: Vec<ResourceDef>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in data tables
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();

        catalog.add_resource(ResourceDef { kind: ResourceKind::Wood, capacity: 500.0 });
        catalog.add_resource(ResourceDef { kind: ResourceKind::Stone, capacity: 500.0 });
        catalog.add_resource(ResourceDef { kind: ResourceKind::Food, capacity: 300.0 });
        catalog.add_resource(ResourceDef { kind: ResourceKind::Plank, capacity: 200.0 });

        catalog.add_building(BuildingDef {
            kind: BuildingKind::Stockpile,
            name: "Stockpile".into(),
            size: (2, 2),
            cost: vec![],
            job: None,
            worker_capacity: 0,
            recipe: None,
            depot: true,
        });

        catalog.add_building(BuildingDef {
            kind: BuildingKind::House,
            name: "House".into(),
            size: (2, 2),
            cost: vec![(ResourceKind::Wood, 20.0), (ResourceKind::Stone, 10.0)],
            job: None,
            worker_capacity: 0,
            recipe: None,
            depot: false,
        });

        catalog.add_building(BuildingDef {
            kind: BuildingKind::Farm,
            name: "Farm".into(),
            size: (3, 3),
            cost: vec![(ResourceKind::Wood, 30.0)],
            job: Some(JobKind::Farmer),
            worker_capacity: 2,
            recipe: Some(Recipe {
                inputs: vec![],
                outputs: vec![(ResourceKind::Food, 5.0)],
                duration_ticks: 12,
            }),
            depot: false,
        });

        catalog.add_building(BuildingDef {
            kind: BuildingKind::LumberCamp,
            name: "Lumber Camp".into(),
            size: (2, 2),
            cost: vec![(ResourceKind::Wood, 10.0)],
            job: Some(JobKind::Lumberjack),
            worker_capacity: 3,
            recipe: Some(Recipe {
                inputs: vec![],
                outputs: vec![(ResourceKind::Wood, 4.0)],
                duration_ticks: 10,
            }),
            depot: false,
        });

        catalog.add_building(BuildingDef {
            kind: BuildingKind::Quarry,
            name: "Quarry".into(),
            size: (3, 3),
            cost: vec![(ResourceKind::Wood, 25.0)],
            job: Some(JobKind::Mason),
            worker_capacity: 3,
            recipe: Some(Recipe {
                inputs: vec![],
                outputs: vec![(ResourceKind::Stone, 3.0)],
                duration_ticks: 14,
            }),
            depot: false,
        });

        catalog.add_building(BuildingDef {
            kind: BuildingKind::Workshop,
            name: "Workshop".into(),
            size: (3, 3),
            cost: vec![(ResourceKind::Wood, 40.0), (ResourceKind::Stone, 20.0)],
            job: Some(JobKind::Crafter),
            worker_capacity: 2,
            recipe: Some(Recipe {
                inputs: vec![(ResourceKind::Wood, 2.0)],
                outputs: vec![(ResourceKind::Plank, 1.0)],
                duration_ticks: 8,
            }),
            depot: false,
        });

        catalog
    }

    pub fn add_building(&mut self, def: BuildingDef) {
        self.buildings.push(def);
    }

    pub fn add_resource(&mut self, def: ResourceDef) {
        self.resources.push(def);
    }

    pub fn building(&self, kind: BuildingKind) -> Option<&BuildingDef> {
        self.buildings.iter().find(|d| d.kind == kind)
    }

    pub fn buildings(&self) -> &[BuildingDef] {
        &self.buildings
    }

    pub fn resources(&self) -> &[ResourceDef] {
        &self.resources
    }

    /// Check cross-references and basic sanity
    pub fn validate(&self) -> Result<(), CatalogError> {
        for def in &self.resources {
            if def.capacity <= 0.0 {
                return Err(CatalogError::Invalid(format!(
                    "resource {} has non-positive capacity",
                    def.kind.name()
                )));
            }
        }
        let defined = |kind: ResourceKind| self.resources.iter().any(|r| r.kind == kind);
        for def in &self.buildings {
            if def.size.0 < 1 || def.size.1 < 1 {
                return Err(CatalogError::Invalid(format!(
                    "building {} has an empty footprint",
                    def.name
                )));
            }
            if def.job.is_some() && def.worker_capacity == 0 {
                return Err(CatalogError::Invalid(format!(
                    "building {} offers a job but no worker slots",
                    def.name
                )));
            }
            for (resource, _) in &def.cost {
                if !defined(*resource) {
                    return Err(CatalogError::UnknownResource(resource.name().into()));
                }
            }
            if let Some(recipe) = &def.recipe {
                if recipe.duration_ticks == 0 {
                    return Err(CatalogError::Invalid(format!(
                        "recipe of {} has zero duration",
                        def.name
                    )));
                }
                for (resource, _) in recipe.inputs.iter().chain(recipe.outputs.iter()) {
                    if !defined(*resource) {
                        return Err(CatalogError::UnknownResource(resource.name().into()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Load a catalog from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, CatalogError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse a catalog from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, CatalogError> {
        let toml_data: TomlCatalog =
            toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let mut catalog = Self::new();
        for resource in toml_data.resource {
            catalog.add_resource(resource.into_def()?);
        }
        for building in toml_data.building {
            catalog.add_building(building.into_def()?);
        }
        catalog.validate()?;
        Ok(catalog)
    }
}

/// TOML representation of a catalog file
#[derive(Debug, Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    resource: Vec<TomlResource>,
    #[serde(default)]
    building: Vec<TomlBuilding>,
}

#[derive(Debug, Deserialize)]
struct TomlResource {
    name: String,
    capacity: f32,
}

#[derive(Debug, Deserialize)]
struct TomlBuilding {
    kind: String,
    name: String,
    size: [i32; 2],
    #[serde(default)]
    cost: Vec<TomlAmount>,
    job: Option<String>,
    #[serde(default)]
    worker_capacity: u32,
    #[serde(default)]
    depot: bool,
    recipe: Option<TomlRecipe>,
}

#[derive(Debug, Deserialize)]
struct TomlRecipe {
    duration_ticks: u32,
    #[serde(default)]
    inputs: Vec<TomlAmount>,
    outputs: Vec<TomlAmount>,
}

#[derive(Debug, Deserialize)]
struct TomlAmount {
    resource: String,
    amount: f32,
}

impl TomlResource {
    fn into_def(self) -> Result<ResourceDef, CatalogError> {
        let kind = ResourceKind::parse(&self.name)
            .ok_or(CatalogError::UnknownResource(self.name))?;
        Ok(ResourceDef {
            kind,
            capacity: self.capacity,
        })
    }
}

impl TomlBuilding {
    fn into_def(self) -> Result<BuildingDef, CatalogError> {
        let kind = BuildingKind::parse(&self.kind)
            .ok_or(CatalogError::UnknownBuildingKind(self.kind))?;
        let job = match self.job {
            Some(name) => Some(JobKind::parse(&name).ok_or(CatalogError::UnknownJob(name))?),
            None => None,
        };
        let cost = self
            .cost
            .into_iter()
            .map(TomlAmount::into_amount)
            .collect::<Result<Vec<_>, _>>()?;
        let recipe = match self.recipe {
            Some(recipe) => Some(recipe.into_recipe()?),
            None => None,
        };
        Ok(BuildingDef {
            kind,
            name: self.name,
            size: (self.size[0], self.size[1]),
            cost,
            job,
            worker_capacity: self.worker_capacity,
            recipe,
            depot: self.depot,
        })
    }
}

impl TomlRecipe {
    fn into_recipe(self) -> Result<Recipe, CatalogError> {
        let inputs = self
            .inputs
            .into_iter()
            .map(TomlAmount::into_amount)
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = self
            .outputs
            .into_iter()
            .map(TomlAmount::into_amount)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Recipe {
            inputs,
            outputs,
            duration_ticks: self.duration_ticks,
        })
    }
}

impl TomlAmount {
    fn into_amount(self) -> Result<(ResourceKind, f32), CatalogError> {
        let resource = ResourceKind::parse(&self.resource)
            .ok_or(CatalogError::UnknownResource(self.resource))?;
        Ok((resource, self.amount))
    }
}
