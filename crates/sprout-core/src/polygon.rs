//! Routes, areas, and the capabilities that hold their vertices.

use std::any::Any;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::capability::{AttachContext, Capability, CapabilityError};
use crate::entity::{Entity, EntityHandle, EntityOptions, EntityRef};
use crate::factory::{EntityFactory, FactoryError};
use crate::value::{PropertyValue, Vec3};

/// Entity property read by [`Polygon`] when it is attached.
pub const CLOSED_PROPERTY: &str = "polygon.closed";

pub const ROUTE: &str = "route";
pub const AREA: &str = "area";
pub const COMPLEX_AREA: &str = "complex-area";
pub const COMPLEX_AREA_STATIC: &str = "complex-area-static";
pub const COMPOUND_AREA: &str = "compound-area";

fn entity_names(entities: &[EntityHandle]) -> Vec<String> {
    entities
        .iter()
        .map(|e| match e.try_borrow() {
            Ok(entity) => entity.name().to_string(),
            Err(_) => "<borrowed>".to_string(),
        })
        .collect()
}

fn not_a_polygon(entity: &EntityHandle) -> FactoryError {
    FactoryError::NotAPolygon(entity.borrow().name().to_string())
}

/// Ordered vertex list. Vertices are kept exactly as added: no dedup, no
/// reordering, and a closed polygon does not repeat its first point.
#[derive(Debug, Default)]
pub struct Polygon {
    points: Vec<EntityHandle>,
    closed: bool,
}

impl Polygon {
    pub const TYPE_NAME: &'static str = "polygon";

    pub fn points(&self) -> &[EntityHandle] {
        &self.points
    }

    pub fn point_names(&self) -> Vec<String> {
        entity_names(&self.points)
    }

    pub fn add_point(&mut self, point: EntityHandle) {
        self.points.push(point);
    }

    pub fn contains_point(&self, point: &EntityHandle) -> bool {
        self.points.iter().any(|p| Rc::ptr_eq(p, point))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Mean of the vertex positions.
    pub fn centroid(&self) -> Option<Vec3> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .fold(Vec3::ZERO, |acc, p| acc + p.borrow().position());
        Some(sum / self.points.len() as f64)
    }
}

impl Capability for Polygon {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn set_field(&mut self, field: &str, value: &PropertyValue) -> Result<(), CapabilityError> {
        match (field, value.as_bool()) {
            ("closed", Some(closed)) => {
                self.closed = closed;
                Ok(())
            }
            ("closed", None) => Err(CapabilityError::InvalidField {
                capability: Self::TYPE_NAME.to_string(),
                field: field.to_string(),
                reason: "expected a boolean".to_string(),
            }),
            _ => Err(CapabilityError::UnknownField {
                capability: Self::TYPE_NAME.to_string(),
                field: field.to_string(),
            }),
        }
    }

    fn attach(&mut self, entity: &mut Entity, _ctx: &AttachContext<'_>) -> Result<(), CapabilityError> {
        if let Some(closed) = entity.get_prop(CLOSED_PROPERTY).and_then(PropertyValue::as_bool) {
            self.closed = closed;
        }
        Ok(())
    }

    fn property_changed(&mut self, name: &str, value: &PropertyValue) {
        if let (CLOSED_PROPERTY, Some(closed)) = (name, value.as_bool()) {
            self.closed = closed;
        }
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({ "closed": self.closed, "points": self.point_names() })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A polygon made of other polygon entities.
#[derive(Debug, Default)]
pub struct CompoundPolygon {
    polygons: Vec<EntityHandle>,
}

impl CompoundPolygon {
    pub const TYPE_NAME: &'static str = "compound-polygon";

    pub fn polygons(&self) -> &[EntityHandle] {
        &self.polygons
    }

    pub fn polygon_names(&self) -> Vec<String> {
        entity_names(&self.polygons)
    }

    pub fn add_polygon(&mut self, polygon: EntityHandle) {
        self.polygons.push(polygon);
    }
}

impl Capability for CompoundPolygon {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({ "polygons": self.polygon_names() })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A point in a polygon's point list.
#[derive(Debug)]
pub enum Point {
    /// Used as-is.
    Entity(EntityHandle),
    /// Created as a waypoint.
    Descriptor(EntityOptions),
    /// Looked up in the simulation, or created as a default waypoint.
    Name(String),
}

impl From<EntityHandle> for Point {
    fn from(entity: EntityHandle) -> Self {
        Self::Entity(entity)
    }
}

impl From<&EntityHandle> for Point {
    fn from(entity: &EntityHandle) -> Self {
        Self::Entity(Rc::clone(entity))
    }
}

impl From<EntityOptions> for Point {
    fn from(options: EntityOptions) -> Self {
        Self::Descriptor(options)
    }
}

impl From<&str> for Point {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Point {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Builds waypoints, routes, and areas through an [`EntityFactory`].
pub struct PolygonBuilder<'f, 'a> {
    factory: &'f mut EntityFactory<'a>,
}

impl<'f, 'a> PolygonBuilder<'f, 'a> {
    pub fn new(factory: &'f mut EntityFactory<'a>) -> Self {
        Self { factory }
    }

    /// Create a waypoint. The configured waypoint prototype is used unless
    /// the options name one.
    pub fn waypoint(&mut self, options: impl Into<EntityOptions>) -> Result<EntityHandle, FactoryError> {
        let mut options = options.into();
        if options.prototype.is_none() {
            options.prototype = Some(self.factory.config().waypoint_prototype.clone().into());
        }
        self.factory.create_entity(options, false)
    }

    /// Resolve each point to an entity, preserving order.
    pub fn resolve_points<I, P>(&mut self, points: I) -> Result<Vec<EntityHandle>, FactoryError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        points
            .into_iter()
            .map(|point| self.resolve_point(point.into()))
            .collect()
    }

    fn resolve_point(&mut self, point: Point) -> Result<EntityHandle, FactoryError> {
        match point {
            Point::Entity(entity) => Ok(entity),
            Point::Descriptor(options) => self.waypoint(options),
            Point::Name(name) => {
                if let Some(entity) = self.factory.simulation().get_entity(&name) {
                    return Ok(entity);
                }
                if !self.factory.config().create_missing_waypoints {
                    return Err(FactoryError::EntityNotFound(name));
                }
                warn!(waypoint = %name, "no entity with this name, creating a default waypoint");
                self.waypoint(name)
            }
        }
    }

    /// Create a polygon entity and append the resolved points to its vertex list.
    pub fn build_polygon<I, P>(
        &mut self,
        prototype: &str,
        options: impl Into<EntityOptions>,
        points: I,
    ) -> Result<EntityHandle, FactoryError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        let polygon = self.create_container(prototype, options.into())?;
        self.add_points(&polygon, points)?;
        Ok(polygon)
    }

    /// Create a compound area and append the resolved entities as sub-polygons.
    pub fn build_compound_area<I, P>(
        &mut self,
        prototype: &str,
        options: impl Into<EntityOptions>,
        areas: I,
    ) -> Result<EntityHandle, FactoryError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        let compound = self.create_container(prototype, options.into())?;
        if compound.borrow().capability::<CompoundPolygon>().is_none() {
            return Err(not_a_polygon(&compound));
        }
        let areas = self.resolve_points(areas)?;
        {
            let mut entity = compound.borrow_mut();
            let name = entity.name().to_string();
            let capability = entity
                .capability_mut::<CompoundPolygon>()
                .ok_or(FactoryError::NotAPolygon(name))?;
            for area in areas {
                capability.add_polygon(area);
            }
        }
        Ok(compound)
    }

    fn create_container(
        &mut self,
        prototype: &str,
        mut options: EntityOptions,
    ) -> Result<EntityHandle, FactoryError> {
        if options.prototype.is_none() {
            options.prototype = Some(prototype.into());
        }
        let container = self.factory.create_entity(options, false)?;
        debug!(entity = %container.borrow().name(), "created polygon container");
        Ok(container)
    }

    /// Append points to an existing polygon, given by handle or name.
    pub fn add_points<I, P>(&mut self, container: impl Into<EntityRef>, points: I) -> Result<(), FactoryError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        let container = container.into();
        let polygon = container
            .resolve(self.factory.simulation())
            .ok_or_else(|| FactoryError::EntityNotFound(container.to_string()))?;
        if polygon.borrow().capability::<Polygon>().is_none() {
            return Err(not_a_polygon(&polygon));
        }

        let points = self.resolve_points(points)?;
        let mut entity = polygon.borrow_mut();
        let name = entity.name().to_string();
        let capability = entity
            .capability_mut::<Polygon>()
            .ok_or(FactoryError::NotAPolygon(name))?;
        for point in points {
            capability.add_point(point);
        }
        Ok(())
    }

    pub fn route<I, P>(&mut self, options: impl Into<EntityOptions>, points: I) -> Result<EntityHandle, FactoryError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        self.build_polygon(ROUTE, options, points)
    }

    pub fn area<I, P>(&mut self, options: impl Into<EntityOptions>, points: I) -> Result<EntityHandle, FactoryError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        self.build_polygon(AREA, options, points)
    }

    pub fn complex_area<I, P>(
        &mut self,
        options: impl Into<EntityOptions>,
        points: I,
    ) -> Result<EntityHandle, FactoryError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        self.build_polygon(COMPLEX_AREA, options, points)
    }

    pub fn complex_area_static<I, P>(
        &mut self,
        options: impl Into<EntityOptions>,
        points: I,
    ) -> Result<EntityHandle, FactoryError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        self.build_polygon(COMPLEX_AREA_STATIC, options, points)
    }

    pub fn compound_area<I, P>(
        &mut self,
        options: impl Into<EntityOptions>,
        areas: I,
    ) -> Result<EntityHandle, FactoryError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        self.build_compound_area(COMPOUND_AREA, options, areas)
    }
}
