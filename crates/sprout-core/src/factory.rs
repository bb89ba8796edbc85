//! Entity factory: turns option records into registered entities.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::capability::{
    AttachContext, AttachedCapability, Capability, CapabilityConfig, CapabilityError,
    CapabilityFactory, CapabilitySpec, TypeResolver,
};
use crate::config::EngineConfig;
use crate::database::PrototypeDatabase;
use crate::entity::{Entity, EntityHandle, EntityOptions, EntityRef};
use crate::polygon::PolygonBuilder;
use crate::prototype::{Prototype, PrototypeError, PrototypeRef};
use crate::simulation::{Simulation, SimulationError};

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error(transparent)]
    Prototype(#[from] PrototypeError),

    #[error("invalid entity options: {0}")]
    InvalidOptions(String),

    #[error("unknown entity factory tag: {0}")]
    UnknownFactory(String),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("default capability {index} of prototype '{prototype}' failed: {source}")]
    DefaultCapability {
        prototype: String,
        index: usize,
        #[source]
        source: CapabilityError,
    },

    /// The entity exists but one of the requested capabilities failed.
    #[error(
        "entity '{name}' was created (registered: {registered}) but capability {index} failed: {source}"
    )]
    CapabilityAttach {
        name: String,
        entity: EntityHandle,
        index: usize,
        registered: bool,
        #[source]
        source: CapabilityError,
    },

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("entity '{0}' has no polygon capability")]
    NotAPolygon(String),
}

impl FactoryError {
    /// The partially set-up entity, when creation got far enough to make one.
    pub fn created_entity(&self) -> Option<&EntityHandle> {
        match self {
            Self::CapabilityAttach { entity, .. } => Some(entity),
            _ => None,
        }
    }
}

/// Builds a bare entity for a prototype.
pub type EntityConstructor = Rc<dyn Fn(&str, &Rc<Prototype>) -> Entity>;

/// Entity construction primitives keyed by factory tag.
#[derive(Clone, Default)]
pub struct EntityConstructors {
    constructors: HashMap<String, EntityConstructor>,
}

impl EntityConstructors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the plain `entity` constructor.
    pub fn with_defaults() -> Self {
        let mut constructors = Self::new();
        constructors.register("entity", |name, prototype| Entity::new(name, prototype));
        constructors
    }

    pub fn register<F>(&mut self, tag: impl Into<String>, constructor: F)
    where
        F: Fn(&str, &Rc<Prototype>) -> Entity + 'static,
    {
        self.constructors.insert(tag.into(), Rc::new(constructor));
    }

    pub fn get(&self, tag: &str) -> Option<EntityConstructor> {
        self.constructors.get(tag).cloned()
    }
}

impl fmt::Debug for EntityConstructors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("EntityConstructors").field("tags", &tags).finish()
    }
}

/// Creates entities against one simulation.
pub struct EntityFactory<'a> {
    prototypes: &'a PrototypeDatabase,
    capabilities: CapabilityFactory<'a>,
    constructors: &'a EntityConstructors,
    config: &'a EngineConfig,
    simulation: &'a mut dyn Simulation,
}

impl<'a> EntityFactory<'a> {
    pub fn new(
        prototypes: &'a PrototypeDatabase,
        resolver: &'a dyn TypeResolver,
        constructors: &'a EntityConstructors,
        config: &'a EngineConfig,
        simulation: &'a mut dyn Simulation,
    ) -> Self {
        Self {
            prototypes,
            capabilities: CapabilityFactory::new(resolver),
            constructors,
            config,
            simulation,
        }
    }

    pub fn prototypes(&self) -> &PrototypeDatabase {
        self.prototypes
    }

    pub fn capability_factory(&self) -> CapabilityFactory<'a> {
        self.capabilities
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    pub fn simulation(&self) -> &dyn Simulation {
        &*self.simulation
    }

    /// Route, area, and waypoint construction on top of this factory.
    pub fn polygons(&mut self) -> PolygonBuilder<'_, 'a> {
        PolygonBuilder::new(self)
    }

    /// Create an entity from `options`.
    ///
    /// The prototype is resolved and the bare entity constructed with the
    /// prototype's default capabilities. Position, orientation, and property
    /// overrides are then applied, the entity is registered unless
    /// `do_not_add`, and finally each requested capability is created and
    /// attached in order.
    pub fn create_entity(
        &mut self,
        options: EntityOptions,
        do_not_add: bool,
    ) -> Result<EntityHandle, FactoryError> {
        let position = options
            .resolved_position()
            .map_err(FactoryError::InvalidOptions)?;
        let EntityOptions {
            name,
            prototype,
            orientation,
            properties,
            capabilities,
            ..
        } = options;

        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(FactoryError::InvalidOptions("entity name is required".to_string())),
        };
        let prototype = prototype.ok_or_else(|| {
            FactoryError::InvalidOptions(format!("entity '{name}' has no prototype"))
        })?;
        let prototype = self.prototypes.lookup(prototype)?;
        if prototype.is_abstract() {
            return Err(FactoryError::InvalidOptions(format!(
                "prototype '{}' is abstract",
                prototype.id()
            )));
        }
        if !do_not_add && self.simulation.get_entity(&name).is_some() {
            return Err(SimulationError::DuplicateEntityName(name).into());
        }

        let mut entity = self.instantiate(&name, &prototype)?;
        if let Some(position) = position {
            entity.set_position(position);
        }
        if let Some(degrees) = orientation {
            entity.set_orientation(degrees.to_radians());
        }
        for (key, value) in properties {
            entity.set_property(key, value);
        }

        let handle = entity.into_handle();
        if !do_not_add {
            self.simulation.add_entity(Rc::clone(&handle))?;
        }

        for (index, spec) in capabilities.into_iter().enumerate() {
            let ctx = AttachContext {
                simulation: &*self.simulation,
                registered: !do_not_add,
            };
            let attached = self
                .capabilities
                .create(spec)
                .and_then(|capability| handle.borrow_mut().attach_capability(capability, &ctx));
            if let Err(source) = attached {
                return Err(FactoryError::CapabilityAttach {
                    name,
                    entity: handle,
                    index,
                    registered: !do_not_add,
                    source,
                });
            }
        }

        debug!(
            entity = %name,
            prototype = prototype.id(),
            registered = !do_not_add,
            "created entity"
        );
        Ok(handle)
    }

    fn instantiate(&self, name: &str, prototype: &Rc<Prototype>) -> Result<Entity, FactoryError> {
        let tag = prototype
            .factory()
            .unwrap_or(self.config.default_factory.as_str());
        let constructor = self
            .constructors
            .get(tag)
            .ok_or_else(|| FactoryError::UnknownFactory(tag.to_string()))?;
        let mut entity = constructor(name, prototype);

        let ctx = AttachContext {
            simulation: &*self.simulation,
            registered: false,
        };
        for (index, template) in prototype.capabilities().iter().enumerate() {
            let default_capability = |source: CapabilityError| FactoryError::DefaultCapability {
                prototype: prototype.id().to_string(),
                index,
                source,
            };
            let capability = self
                .capabilities
                .create(template.clone().into())
                .map_err(default_capability)?;
            entity
                .attach_capability(capability, &ctx)
                .map_err(default_capability)?;
        }
        Ok(entity)
    }

    /// Create a capability without attaching it.
    pub fn create_capability(
        &self,
        spec: CapabilitySpec,
        config: Option<CapabilityConfig>,
    ) -> Result<Box<dyn Capability>, FactoryError> {
        Ok(self.capabilities.create_with(spec, config)?)
    }

    /// Create a capability and attach it to an entity given by handle or name.
    pub fn add_capability(
        &self,
        target: impl Into<EntityRef>,
        spec: CapabilitySpec,
        config: Option<CapabilityConfig>,
    ) -> Result<AttachedCapability, FactoryError> {
        Ok(self
            .capabilities
            .add(&*self.simulation, target, spec, config)?)
    }
}

/// Creates entities of one prototype.
#[derive(Debug, Clone)]
pub struct PrototypeFactory {
    prototype: PrototypeRef,
}

impl PrototypeFactory {
    pub fn prototype(&self) -> &PrototypeRef {
        &self.prototype
    }

    /// Create from a bare name or an options record. The factory's prototype
    /// is used unless the options name one.
    pub fn create(
        &self,
        factory: &mut EntityFactory<'_>,
        options: impl Into<EntityOptions>,
    ) -> Result<EntityHandle, FactoryError> {
        let mut options = options.into();
        if options.prototype.is_none() {
            options.prototype = Some(self.prototype.clone());
        }
        factory.create_entity(options, false)
    }
}

pub fn factory_for_prototype(prototype: impl Into<PrototypeRef>) -> PrototypeFactory {
    PrototypeFactory {
        prototype: prototype.into(),
    }
}
