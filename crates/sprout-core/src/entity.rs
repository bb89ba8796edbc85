//! Entities and the option records used to create them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::json;

use crate::capability::{AttachContext, Capability, CapabilityError, CapabilitySpec};
use crate::prototype::{Prototype, PrototypeRef};
use crate::simulation::Simulation;
use crate::value::{PropertyMap, PropertyValue, Vec3, properties_to_json};

/// Shared, single-threaded entity handle.
pub type EntityHandle = Rc<RefCell<Entity>>;

/// An entity instance.
pub struct Entity {
    name: String,
    prototype: Rc<Prototype>,
    position: Vec3,
    /// Radians.
    orientation: f64,
    properties: PropertyMap,
    capabilities: Vec<Box<dyn Capability>>,
}

impl Entity {
    /// Bare entity seeded with the prototype's resolved properties.
    pub fn new(name: impl Into<String>, prototype: &Rc<Prototype>) -> Self {
        Self {
            name: name.into(),
            prototype: Rc::clone(prototype),
            position: Vec3::ZERO,
            orientation: 0.0,
            properties: prototype.resolved_properties(),
            capabilities: Vec::new(),
        }
    }

    pub fn into_handle(self) -> EntityHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prototype(&self) -> &Rc<Prototype> {
        &self.prototype
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Heading in radians.
    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    pub fn set_orientation(&mut self, radians: f64) {
        self.orientation = radians;
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn get_prop(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Set a property and let attached capabilities observe the change.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        let key = key.into();
        let value = value.into();
        for capability in &mut self.capabilities {
            capability.property_changed(&key, &value);
        }
        self.properties.insert(key, value);
    }

    /// Attached capabilities in attachment order.
    pub fn capabilities(&self) -> &[Box<dyn Capability>] {
        &self.capabilities
    }

    /// First attached capability of type `T`.
    pub fn capability<T: Capability>(&self) -> Option<&T> {
        self.capabilities.iter().find_map(|c| c.downcast_ref::<T>())
    }

    pub fn capability_mut<T: Capability>(&mut self) -> Option<&mut T> {
        self.capabilities
            .iter_mut()
            .find_map(|c| c.downcast_mut::<T>())
    }

    pub fn has_capability(&self, type_name: &str) -> bool {
        self.capabilities.iter().any(|c| c.type_name() == type_name)
    }

    /// Run the capability's attach hook and append it. Returns its index.
    pub fn attach_capability(
        &mut self,
        mut capability: Box<dyn Capability>,
        ctx: &AttachContext<'_>,
    ) -> Result<usize, CapabilityError> {
        capability.attach(self, ctx)?;
        self.capabilities.push(capability);
        Ok(self.capabilities.len() - 1)
    }

    /// JSON view of the entity.
    pub fn snapshot(&self) -> serde_json::Value {
        let capabilities: Vec<serde_json::Value> = self
            .capabilities
            .iter()
            .map(|c| json!({ "type": c.type_name(), "state": c.describe() }))
            .collect();
        json!({
            "name": self.name,
            "prototype": self.prototype.id(),
            "position": self.position,
            "orientation": self.orientation,
            "properties": properties_to_json(&self.properties),
            "capabilities": capabilities,
        })
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("prototype", &self.prototype.id())
            .field("position", &self.position)
            .field("orientation", &self.orientation)
            .field("properties", &self.properties)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// An entity given by handle or by name.
#[derive(Debug, Clone)]
pub enum EntityRef {
    Handle(EntityHandle),
    Name(String),
}

impl EntityRef {
    /// Handles pass through; names are looked up in the simulation.
    pub fn resolve(&self, simulation: &dyn Simulation) -> Option<EntityHandle> {
        match self {
            Self::Handle(handle) => Some(Rc::clone(handle)),
            Self::Name(name) => simulation.get_entity(name),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle(handle) => match handle.try_borrow() {
                Ok(entity) => f.write_str(entity.name()),
                Err(_) => f.write_str("<borrowed entity>"),
            },
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for EntityRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for EntityRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<EntityHandle> for EntityRef {
    fn from(handle: EntityHandle) -> Self {
        Self::Handle(handle)
    }
}

impl From<&EntityHandle> for EntityRef {
    fn from(handle: &EntityHandle) -> Self {
        Self::Handle(Rc::clone(handle))
    }
}

/// Options for creating an entity.
///
/// Position is given either as `position` or as any subset of `x`, `y`, `z`
/// (missing components are 0.0), never both. `orientation` is in degrees.
#[derive(Debug, Default)]
pub struct EntityOptions {
    pub name: Option<String>,
    pub prototype: Option<PrototypeRef>,
    pub position: Option<Vec3>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub orientation: Option<f64>,
    pub properties: PropertyMap,
    pub capabilities: Vec<CapabilitySpec>,
}

impl EntityOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn prototype(mut self, prototype: impl Into<PrototypeRef>) -> Self {
        self.prototype = Some(prototype.into());
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    /// Heading in degrees.
    pub fn orientation(mut self, degrees: f64) -> Self {
        self.orientation = Some(degrees);
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn capability(mut self, spec: impl Into<CapabilitySpec>) -> Self {
        self.capabilities.push(spec.into());
        self
    }

    /// Position implied by the options, if any was given.
    pub(crate) fn resolved_position(&self) -> Result<Option<Vec3>, String> {
        let components = [self.x, self.y, self.z];
        match self.position {
            Some(_) if components.iter().any(Option::is_some) => {
                Err("give either position or x/y/z, not both".to_string())
            }
            Some(position) => Ok(Some(position)),
            None if components.iter().all(Option::is_none) => Ok(None),
            None => Ok(Some(Vec3::new(
                self.x.unwrap_or(0.0),
                self.y.unwrap_or(0.0),
                self.z.unwrap_or(0.0),
            ))),
        }
    }
}

impl From<&str> for EntityOptions {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EntityOptions {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Label;
    use crate::simulation::World;

    fn prototype() -> Rc<Prototype> {
        Rc::new(
            Prototype::builder("truck")
                .property("force", "friendly")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_new_seeds_prototype_properties() {
        let mut entity = Entity::new("t1", &prototype());
        assert_eq!(entity.get_prop("force").and_then(PropertyValue::as_str), Some("friendly"));

        entity.set_property("force", "opposing");
        assert_eq!(entity.get_prop("force").and_then(PropertyValue::as_str), Some("opposing"));
        assert_eq!(
            entity.prototype().property("force"),
            Some(PropertyValue::from("friendly"))
        );
    }

    #[test]
    fn test_attach_and_find_capability() {
        let world = World::new();
        let ctx = AttachContext {
            simulation: &world,
            registered: false,
        };
        let mut entity = Entity::new("t1", &prototype());

        let index = entity
            .attach_capability(Box::new(Label::default()), &ctx)
            .unwrap();
        assert_eq!(index, 0);
        assert!(entity.has_capability("label"));
        assert_eq!(entity.capability::<Label>().unwrap().text.as_deref(), Some("t1"));

        entity.capability_mut::<Label>().unwrap().visible = false;
        assert!(!entity.capability::<Label>().unwrap().visible);
    }

    #[test]
    fn test_resolved_position() {
        assert_eq!(EntityOptions::new("a").resolved_position().unwrap(), None);
        assert_eq!(
            EntityOptions::new("a").x(-100.0).resolved_position().unwrap(),
            Some(Vec3::new(-100.0, 0.0, 0.0))
        );
        assert!(
            EntityOptions::new("a")
                .position(Vec3::ZERO)
                .z(1.0)
                .resolved_position()
                .is_err()
        );
    }

    #[test]
    fn test_snapshot_shape() {
        let mut entity = Entity::new("t1", &prototype());
        entity.set_position(Vec3::new(1.0, 2.0, 3.0));

        let snapshot = entity.snapshot();
        assert_eq!(snapshot["name"], "t1");
        assert_eq!(snapshot["prototype"], "truck");
        assert_eq!(snapshot["position"], json!({"x": 1.0, "y": 2.0, "z": 3.0}));
        assert_eq!(snapshot["properties"]["force"], "friendly");
    }
}
