//! Capabilities: pluggable behavior modules attached to entities.
//!
//! A capability can be named in several equivalent ways (a registered type
//! name, a constructor function, or a prebuilt instance), optionally paired
//! with a configuration that is applied after construction and before the
//! capability is attached.

use std::any::Any;
use std::cell::Ref;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::entity::{Entity, EntityHandle, EntityRef};
use crate::simulation::Simulation;
use crate::value::{PropertyMap, PropertyValue};

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("unknown capability type: {0}")]
    UnknownCapabilityType(String),

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("capability '{capability}' has no field '{field}'")]
    UnknownField { capability: String, field: String },

    #[error("invalid value for field '{field}' of capability '{capability}': {reason}")]
    InvalidField {
        capability: String,
        field: String,
        reason: String,
    },

    #[error("initializer expected capability {expected}, got '{actual}'")]
    TypeMismatch { expected: String, actual: String },

    #[error("capability '{capability}' failed to attach: {reason}")]
    Attach { capability: String, reason: String },
}

/// What a capability can see while it is being attached.
pub struct AttachContext<'a> {
    pub simulation: &'a dyn Simulation,
    /// Whether the entity is already part of the simulation.
    pub registered: bool,
}

/// A behavior module attached to an entity.
///
/// During [`Capability::attach`] the entity is mutably borrowed, so a
/// capability must not look its own entity up through the simulation.
pub trait Capability: Any + fmt::Debug {
    /// Registered type name of this capability.
    fn type_name(&self) -> &str;

    /// Assign a single configuration field.
    fn set_field(&mut self, field: &str, _value: &PropertyValue) -> Result<(), CapabilityError> {
        Err(CapabilityError::UnknownField {
            capability: self.type_name().to_string(),
            field: field.to_string(),
        })
    }

    /// Called once when the capability is added to an entity.
    fn attach(&mut self, _entity: &mut Entity, _ctx: &AttachContext<'_>) -> Result<(), CapabilityError> {
        Ok(())
    }

    /// Called after a property of the owning entity is set.
    fn property_changed(&mut self, _name: &str, _value: &PropertyValue) {}

    /// JSON summary used in entity snapshots.
    fn describe(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<'a> dyn Capability + 'a {
    pub fn downcast_ref<T: Capability>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Capability>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Assign `field` on a serde-backed capability by round-tripping it through JSON.
///
/// Fields that are not part of the serialized form are rejected, as are values
/// that do not deserialize into the field's type.
pub fn assign_field<T>(
    target: &mut T,
    capability: &str,
    field: &str,
    value: &PropertyValue,
) -> Result<(), CapabilityError>
where
    T: Serialize + DeserializeOwned,
{
    let invalid = |reason: String| CapabilityError::InvalidField {
        capability: capability.to_string(),
        field: field.to_string(),
        reason,
    };

    let mut json = serde_json::to_value(&*target).map_err(|e| invalid(e.to_string()))?;
    let Some(object) = json.as_object_mut() else {
        return Err(invalid("capability does not serialize to an object".to_string()));
    };
    if !object.contains_key(field) {
        return Err(CapabilityError::UnknownField {
            capability: capability.to_string(),
            field: field.to_string(),
        });
    }
    object.insert(field.to_string(), value.to_json());
    *target = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
    Ok(())
}

/// Constructs a fresh capability with no arguments.
pub type CapabilityConstructor = Rc<dyn Fn() -> Box<dyn Capability>>;

/// One-shot initializer run against a freshly constructed capability.
pub type CapabilityInitializer = Box<dyn FnOnce(&mut dyn Capability) -> Result<(), CapabilityError>>;

/// Configuration applied to a capability after construction.
pub enum CapabilityConfig {
    /// Assign each key as a field.
    Fields(PropertyMap),
    /// Run a procedure with the capability.
    Init(CapabilityInitializer),
}

impl CapabilityConfig {
    pub fn fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        Self::Fields(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Initializer over the untyped capability.
    pub fn init<F>(f: F) -> Self
    where
        F: FnOnce(&mut dyn Capability) + 'static,
    {
        Self::Init(Box::new(move |cap: &mut dyn Capability| -> Result<(), CapabilityError> {
            f(cap);
            Ok(())
        }))
    }

    /// Initializer over a concrete capability type.
    pub fn init_as<C, F>(f: F) -> Self
    where
        C: Capability,
        F: FnOnce(&mut C) + 'static,
    {
        Self::Init(Box::new(move |cap: &mut dyn Capability| -> Result<(), CapabilityError> {
            let actual = cap.type_name().to_string();
            let typed = cap
                .downcast_mut::<C>()
                .ok_or_else(|| CapabilityError::TypeMismatch {
                    expected: std::any::type_name::<C>().to_string(),
                    actual,
                })?;
            f(typed);
            Ok(())
        }))
    }

    fn apply(self, capability: &mut dyn Capability) -> Result<(), CapabilityError> {
        match self {
            Self::Fields(fields) => {
                for (field, value) in &fields {
                    debug!(capability = capability.type_name(), field = %field, "assigning capability field");
                    capability.set_field(field, value)?;
                }
                Ok(())
            }
            Self::Init(init) => init(capability),
        }
    }
}

impl fmt::Debug for CapabilityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
            Self::Init(_) => f.write_str("Init(..)"),
        }
    }
}

/// Every way a capability can be requested.
pub enum CapabilitySpec {
    /// Called with no arguments to produce the instance.
    Factory(CapabilityConstructor),
    /// Resolved through a [`TypeResolver`].
    TypeName(String),
    /// Used as-is.
    Prebuilt(Box<dyn Capability>),
    /// A spec paired with a configuration.
    Configured(Box<CapabilitySpec>, CapabilityConfig),
}

impl CapabilitySpec {
    pub fn named(type_name: impl Into<String>) -> Self {
        Self::TypeName(type_name.into())
    }

    pub fn factory<C, F>(f: F) -> Self
    where
        C: Capability,
        F: Fn() -> C + 'static,
    {
        Self::Factory(Rc::new(move || Box::new(f()) as Box<dyn Capability>))
    }

    pub fn prebuilt<C: Capability>(capability: C) -> Self {
        Self::Prebuilt(Box::new(capability))
    }

    pub fn with_config(self, config: CapabilityConfig) -> Self {
        Self::Configured(Box::new(self), config)
    }

    pub fn with_fields<I, K, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        self.with_config(CapabilityConfig::fields(fields))
    }

    pub fn with_init<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut dyn Capability) + 'static,
    {
        self.with_config(CapabilityConfig::init(f))
    }

    pub fn with_init_as<C, F>(self, f: F) -> Self
    where
        C: Capability,
        F: FnOnce(&mut C) + 'static,
    {
        self.with_config(CapabilityConfig::init_as(f))
    }
}

impl From<&str> for CapabilitySpec {
    fn from(type_name: &str) -> Self {
        Self::named(type_name)
    }
}

impl From<String> for CapabilitySpec {
    fn from(type_name: String) -> Self {
        Self::TypeName(type_name)
    }
}

impl fmt::Debug for CapabilitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::TypeName(name) => f.debug_tuple("TypeName").field(name).finish(),
            Self::Prebuilt(cap) => f.debug_tuple("Prebuilt").field(cap).finish(),
            Self::Configured(spec, config) => {
                f.debug_tuple("Configured").field(spec).field(config).finish()
            }
        }
    }
}

/// Reusable capability spec stored on prototypes.
///
/// Prototypes instantiate their default capabilities once per entity, so
/// unlike [`CapabilitySpec`] a template cannot hold a prebuilt instance or a
/// one-shot initializer.
#[derive(Clone)]
pub enum CapabilityTemplate {
    TypeName(String),
    Factory(CapabilityConstructor),
    Configured(Box<CapabilityTemplate>, PropertyMap),
}

impl CapabilityTemplate {
    pub fn named(type_name: impl Into<String>) -> Self {
        Self::TypeName(type_name.into())
    }

    pub fn factory<C, F>(f: F) -> Self
    where
        C: Capability,
        F: Fn() -> C + 'static,
    {
        Self::Factory(Rc::new(move || Box::new(f()) as Box<dyn Capability>))
    }

    pub fn with_fields<I, K, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        Self::Configured(
            Box::new(self),
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Type name if known without instantiating.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::TypeName(name) => Some(name),
            Self::Factory(_) => None,
            Self::Configured(inner, _) => inner.type_name(),
        }
    }
}

impl From<CapabilityTemplate> for CapabilitySpec {
    fn from(template: CapabilityTemplate) -> Self {
        match template {
            CapabilityTemplate::TypeName(name) => Self::TypeName(name),
            CapabilityTemplate::Factory(ctor) => Self::Factory(ctor),
            CapabilityTemplate::Configured(inner, fields) => Self::Configured(
                Box::new(Self::from(*inner)),
                CapabilityConfig::Fields(fields),
            ),
        }
    }
}

impl fmt::Debug for CapabilityTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeName(name) => f.debug_tuple("TypeName").field(name).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Configured(inner, fields) => {
                f.debug_tuple("Configured").field(inner).field(fields).finish()
            }
        }
    }
}

/// Capability entry as written in prototype and scenario documents.
///
/// Either a bare type name (`"label"`) or a table
/// (`{ type = "label", config = { text = "HQ" } }`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityDecl {
    Name(String),
    Configured {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        config: PropertyMap,
    },
}

impl From<CapabilityDecl> for CapabilityTemplate {
    fn from(decl: CapabilityDecl) -> Self {
        match decl {
            CapabilityDecl::Name(name) => Self::TypeName(name),
            CapabilityDecl::Configured { type_name, config } if config.is_empty() => {
                Self::TypeName(type_name)
            }
            CapabilityDecl::Configured { type_name, config } => {
                Self::Configured(Box::new(Self::TypeName(type_name)), config)
            }
        }
    }
}

impl From<CapabilityDecl> for CapabilitySpec {
    fn from(decl: CapabilityDecl) -> Self {
        CapabilityTemplate::from(decl).into()
    }
}

/// Resolves qualified capability type names to constructors.
pub trait TypeResolver {
    fn resolve_type(&self, type_name: &str) -> Option<CapabilityConstructor>;
}

/// Name → constructor table for capability types.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    types: HashMap<String, CapabilityConstructor>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `polygon`, `compound-polygon`, and `label` types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(crate::polygon::Polygon::TYPE_NAME, crate::polygon::Polygon::default);
        registry.register(
            crate::polygon::CompoundPolygon::TYPE_NAME,
            crate::polygon::CompoundPolygon::default,
        );
        registry.register(Label::TYPE_NAME, Label::default);
        registry
    }

    /// Register a capability type. An existing registration under the same
    /// name is replaced.
    pub fn register<C, F>(&mut self, type_name: impl Into<String>, constructor: F)
    where
        C: Capability,
        F: Fn() -> C + 'static,
    {
        self.types.insert(
            type_name.into(),
            Rc::new(move || Box::new(constructor()) as Box<dyn Capability>),
        );
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl TypeResolver for CapabilityRegistry {
    fn resolve_type(&self, type_name: &str) -> Option<CapabilityConstructor> {
        self.types.get(type_name).cloned()
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

/// A capability that has been attached to an entity.
#[derive(Debug, Clone)]
pub struct AttachedCapability {
    entity: EntityHandle,
    index: usize,
}

impl AttachedCapability {
    pub fn entity(&self) -> &EntityHandle {
        &self.entity
    }

    /// Position in the entity's capability list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn type_name(&self) -> String {
        self.entity.borrow().capabilities()[self.index]
            .type_name()
            .to_string()
    }

    /// Borrow the capability as its concrete type.
    pub fn downcast<T: Capability>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.entity.borrow(), |entity| {
            entity
                .capabilities()
                .get(self.index)
                .and_then(|cap| cap.downcast_ref::<T>())
        })
        .ok()
    }
}

/// Creates capabilities from specs and attaches them to entities.
#[derive(Clone, Copy)]
pub struct CapabilityFactory<'a> {
    resolver: &'a dyn TypeResolver,
}

impl<'a> CapabilityFactory<'a> {
    pub fn new(resolver: &'a dyn TypeResolver) -> Self {
        Self { resolver }
    }

    /// Instantiate a capability and apply any configuration carried by the spec.
    pub fn create(&self, spec: CapabilitySpec) -> Result<Box<dyn Capability>, CapabilityError> {
        match spec {
            CapabilitySpec::Factory(constructor) => Ok(constructor()),
            CapabilitySpec::TypeName(type_name) => {
                let constructor = self
                    .resolver
                    .resolve_type(&type_name)
                    .ok_or(CapabilityError::UnknownCapabilityType(type_name))?;
                Ok(constructor())
            }
            CapabilitySpec::Prebuilt(capability) => Ok(capability),
            CapabilitySpec::Configured(inner, config) => {
                let mut capability = self.create(*inner)?;
                config.apply(capability.as_mut())?;
                Ok(capability)
            }
        }
    }

    /// Instantiate `spec`, then apply `config` if given.
    pub fn create_with(
        &self,
        spec: CapabilitySpec,
        config: Option<CapabilityConfig>,
    ) -> Result<Box<dyn Capability>, CapabilityError> {
        match config {
            Some(config) => self.create(spec.with_config(config)),
            None => self.create(spec),
        }
    }

    /// Create a capability and attach it to `target`, resolving names through
    /// the simulation.
    pub fn add(
        &self,
        simulation: &dyn Simulation,
        target: impl Into<EntityRef>,
        spec: CapabilitySpec,
        config: Option<CapabilityConfig>,
    ) -> Result<AttachedCapability, CapabilityError> {
        let target = target.into();
        let entity = target
            .resolve(simulation)
            .ok_or_else(|| CapabilityError::EntityNotFound(target.to_string()))?;
        let capability = self.create_with(spec, config)?;

        let name = entity.borrow().name().to_string();
        let registered = simulation
            .get_entity(&name)
            .is_some_and(|live| Rc::ptr_eq(&live, &entity));
        let ctx = AttachContext {
            simulation,
            registered,
        };
        let index = entity.borrow_mut().attach_capability(capability, &ctx)?;
        Ok(AttachedCapability { entity, index })
    }
}

/// Display label shown next to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: Option<String>,
    pub visible: bool,
}

impl Label {
    pub const TYPE_NAME: &'static str = "label";
    pub const VISIBLE_PROPERTY: &'static str = "shape.label.visible";
}

impl Default for Label {
    fn default() -> Self {
        Self {
            text: None,
            visible: true,
        }
    }
}

impl Capability for Label {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn set_field(&mut self, field: &str, value: &PropertyValue) -> Result<(), CapabilityError> {
        assign_field(self, Self::TYPE_NAME, field, value)
    }

    fn attach(&mut self, entity: &mut Entity, _ctx: &AttachContext<'_>) -> Result<(), CapabilityError> {
        if self.text.is_none() {
            self.text = Some(entity.name().to_string());
        }
        if let Some(visible) = entity
            .get_prop(Self::VISIBLE_PROPERTY)
            .and_then(PropertyValue::as_bool)
        {
            self.visible = visible;
        }
        Ok(())
    }

    fn property_changed(&mut self, name: &str, value: &PropertyValue) {
        if let (Self::VISIBLE_PROPERTY, Some(visible)) = (name, value.as_bool()) {
            self.visible = visible;
        }
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({ "text": self.text, "visible": self.visible })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prototype::Prototype;
    use crate::simulation::World;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Counter {
        a: f64,
        b: f64,
    }

    impl Capability for Counter {
        fn type_name(&self) -> &str {
            "test.counter"
        }

        fn set_field(&mut self, field: &str, value: &PropertyValue) -> Result<(), CapabilityError> {
            assign_field(self, "test.counter", field, value)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::with_builtins();
        registry.register("test.counter", Counter::default);
        registry
    }

    fn counter(cap: &dyn Capability) -> &Counter {
        cap.downcast_ref::<Counter>().expect("not a counter")
    }

    #[test]
    fn test_create_by_type_name() {
        let registry = registry();
        let factory = CapabilityFactory::new(&registry);

        let cap = factory.create("test.counter".into()).unwrap();
        assert_eq!(cap.type_name(), "test.counter");
    }

    #[test]
    fn test_create_from_factory_function() {
        let registry = CapabilityRegistry::new();
        let factory = CapabilityFactory::new(&registry);

        let cap = factory
            .create(CapabilitySpec::factory(|| Counter { a: 7.0, b: 0.0 }))
            .unwrap();
        assert_eq!(counter(cap.as_ref()).a, 7.0);
    }

    #[test]
    fn test_prebuilt_is_used_directly() {
        let registry = CapabilityRegistry::new();
        let factory = CapabilityFactory::new(&registry);

        let cap = factory
            .create(CapabilitySpec::prebuilt(Counter { a: 1.5, b: 2.5 }))
            .unwrap();
        let c = counter(cap.as_ref());
        assert_eq!((c.a, c.b), (1.5, 2.5));
    }

    #[test]
    fn test_field_config_sets_every_key() {
        let registry = registry();
        let factory = CapabilityFactory::new(&registry);

        let forward = factory
            .create_with(
                "test.counter".into(),
                Some(CapabilityConfig::fields([("a", 1), ("b", 2)])),
            )
            .unwrap();
        let backward = factory
            .create_with(
                "test.counter".into(),
                Some(CapabilityConfig::fields([("b", 2), ("a", 1)])),
            )
            .unwrap();

        for cap in [forward, backward] {
            let c = counter(cap.as_ref());
            assert_eq!((c.a, c.b), (1.0, 2.0));
        }
    }

    #[test]
    fn test_initializer_runs_once_with_instance() {
        let registry = registry();
        let factory = CapabilityFactory::new(&registry);

        let cap = factory
            .create(CapabilitySpec::named("test.counter").with_init_as(|c: &mut Counter| {
                c.a += 10.0;
            }))
            .unwrap();
        assert_eq!(counter(cap.as_ref()).a, 10.0);
    }

    #[test]
    fn test_initializer_type_mismatch() {
        let registry = registry();
        let factory = CapabilityFactory::new(&registry);

        let err = factory
            .create(CapabilitySpec::named("label").with_init_as(|_: &mut Counter| {}))
            .unwrap_err();
        assert!(matches!(err, CapabilityError::TypeMismatch { .. }));
    }

    #[test]
    fn test_unknown_type_name() {
        let registry = registry();
        let factory = CapabilityFactory::new(&registry);

        let err = factory.create("com.example.Missing".into()).unwrap_err();
        assert!(matches!(err, CapabilityError::UnknownCapabilityType(name) if name == "com.example.Missing"));
    }

    #[test]
    fn test_unknown_and_invalid_fields() {
        let registry = registry();
        let factory = CapabilityFactory::new(&registry);

        let err = factory
            .create(CapabilitySpec::named("test.counter").with_fields([("c", 1)]))
            .unwrap_err();
        assert!(matches!(err, CapabilityError::UnknownField { ref field, .. } if field == "c"));

        let err = factory
            .create(CapabilitySpec::named("test.counter").with_fields([("a", "many")]))
            .unwrap_err();
        assert!(matches!(err, CapabilityError::InvalidField { .. }));
    }

    #[test]
    fn test_template_from_decl() {
        let decl: CapabilityDecl = serde_json::from_value(serde_json::json!({
            "type": "label",
            "config": { "text": "HQ" }
        }))
        .unwrap();
        let template = CapabilityTemplate::from(decl);
        assert_eq!(template.type_name(), Some("label"));

        let registry = registry();
        let cap = CapabilityFactory::new(&registry)
            .create(template.into())
            .unwrap();
        assert_eq!(
            cap.downcast_ref::<Label>().unwrap().text.as_deref(),
            Some("HQ")
        );
    }

    #[test]
    fn test_add_by_name() {
        let registry = registry();
        let factory = CapabilityFactory::new(&registry);
        let mut world = World::new();
        let proto = Rc::new(Prototype::builder("thing").build().unwrap());
        let entity = Entity::new("alpha", &proto).into_handle();
        world.add_entity(Rc::clone(&entity)).unwrap();

        let attached = factory
            .add(&world, "alpha", "label".into(), None)
            .unwrap();
        assert_eq!(attached.type_name(), "label");
        assert_eq!(
            attached.downcast::<Label>().unwrap().text.as_deref(),
            Some("alpha")
        );
        assert_eq!(entity.borrow().capabilities().len(), 1);
    }

    #[test]
    fn test_add_to_missing_entity() {
        let registry = registry();
        let factory = CapabilityFactory::new(&registry);
        let world = World::new();

        let err = factory
            .add(&world, "ghost", "label".into(), None)
            .unwrap_err();
        assert!(matches!(err, CapabilityError::EntityNotFound(name) if name == "ghost"));
    }
}
