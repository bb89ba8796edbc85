//! Scenario documents: prototypes, entities, and polygons declared in TOML.
//!
//! A scenario is applied in three passes: prototypes are registered first,
//! then entities are created in document order, and finally routes and areas
//! are built. Later entries may therefore refer to anything declared earlier
//! in the same pass or in an earlier pass.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::capability::{CapabilityDecl, CapabilitySpec};
use crate::database::PrototypeDecl;
use crate::engine::Engine;
use crate::entity::EntityOptions;
use crate::factory::FactoryError;
use crate::polygon::{AREA, COMPLEX_AREA, COMPLEX_AREA_STATIC, COMPOUND_AREA, Point, ROUTE};
use crate::prototype::PrototypeError;
use crate::simulation::Simulation;
use crate::value::{PropertyMap, Vec3};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Prototype(#[from] PrototypeError),

    #[error(transparent)]
    Factory(#[from] FactoryError),
}

/// An entity as declared in a scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityDecl {
    pub name: String,
    #[serde(default)]
    pub prototype: Option<String>,
    #[serde(default)]
    pub position: Option<Vec3>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
    /// Degrees.
    #[serde(default)]
    pub orientation: Option<f64>,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub capabilities: Vec<CapabilityDecl>,
}

impl From<EntityDecl> for EntityOptions {
    fn from(decl: EntityDecl) -> Self {
        EntityOptions {
            name: Some(decl.name),
            prototype: decl.prototype.map(Into::into),
            position: decl.position,
            x: decl.x,
            y: decl.y,
            z: decl.z,
            orientation: decl.orientation,
            properties: decl.properties,
            capabilities: decl
                .capabilities
                .into_iter()
                .map(CapabilitySpec::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolygonKind {
    Route,
    Area,
    ComplexArea,
    ComplexAreaStatic,
    CompoundArea,
}

impl PolygonKind {
    /// Prototype used when the declaration does not name one.
    pub fn prototype_id(self) -> &'static str {
        match self {
            Self::Route => ROUTE,
            Self::Area => AREA,
            Self::ComplexArea => COMPLEX_AREA,
            Self::ComplexAreaStatic => COMPLEX_AREA_STATIC,
            Self::CompoundArea => COMPOUND_AREA,
        }
    }
}

/// A polygon point: an entity name or an inline waypoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointDecl {
    Name(String),
    Inline(EntityDecl),
}

impl From<PointDecl> for Point {
    fn from(decl: PointDecl) -> Self {
        match decl {
            PointDecl::Name(name) => Point::Name(name),
            PointDecl::Inline(entity) => Point::Descriptor(entity.into()),
        }
    }
}

/// A route or area as declared in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonDecl {
    pub kind: PolygonKind,
    pub name: String,
    #[serde(default)]
    pub prototype: Option<String>,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub capabilities: Vec<CapabilityDecl>,
    /// Vertices, or sub-areas for a compound area.
    #[serde(default)]
    pub points: Vec<PointDecl>,
}

/// A scenario document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub prototype: Vec<PrototypeDecl>,
    #[serde(default)]
    pub entity: Vec<EntityDecl>,
    #[serde(default)]
    pub polygon: Vec<PolygonDecl>,
}

/// Names of everything a scenario created.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub prototypes: Vec<String>,
    pub entities: Vec<String>,
    pub polygons: Vec<String>,
}

impl Scenario {
    pub fn from_toml_str(source: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Register prototypes, create entities, then build polygons.
    ///
    /// Stops at the first failure. Prototypes and entities created before the
    /// failure stay registered.
    pub fn apply(
        self,
        engine: &mut Engine,
        simulation: &mut dyn Simulation,
    ) -> Result<ScenarioReport, ScenarioError> {
        let mut report = ScenarioReport::default();

        let prototypes = engine.prototypes_mut().load_decls(self.prototype)?;
        report.prototypes = prototypes.iter().map(|p| p.id().to_string()).collect();

        let mut factory = engine.factory(simulation);
        for decl in self.entity {
            let name = decl.name.clone();
            factory.create_entity(decl.into(), false)?;
            report.entities.push(name);
        }

        let mut polygons = factory.polygons();
        for decl in self.polygon {
            let mut options = EntityOptions::new(decl.name.clone());
            options.prototype = decl.prototype.map(Into::into);
            options.properties = decl.properties;
            options.capabilities = decl.capabilities.into_iter().map(CapabilitySpec::from).collect();

            let points = decl.points.into_iter().map(Point::from);
            match decl.kind {
                PolygonKind::CompoundArea => {
                    polygons.build_compound_area(decl.kind.prototype_id(), options, points)?
                }
                kind => polygons.build_polygon(kind.prototype_id(), options, points)?,
            };
            report.polygons.push(decl.name);
        }

        info!(
            prototypes = report.prototypes.len(),
            entities = report.entities.len(),
            polygons = report.polygons.len(),
            "applied scenario"
        );
        Ok(report)
    }
}
