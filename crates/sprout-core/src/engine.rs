//! The engine bundles prototypes, capability types, and entity constructors.

use std::rc::Rc;

use crate::capability::CapabilityRegistry;
use crate::config::EngineConfig;
use crate::database::PrototypeDatabase;
use crate::factory::{EntityConstructors, EntityFactory};
use crate::prototype::PrototypeError;
use crate::segment::{Segment, SegmentPoint, segments_with_speed};
use crate::simulation::Simulation;

/// Everything needed to create entities, independent of any one simulation.
#[derive(Debug)]
pub struct Engine {
    prototypes: PrototypeDatabase,
    capabilities: CapabilityRegistry,
    constructors: EntityConstructors,
    config: EngineConfig,
}

impl Engine {
    /// Engine with the built-in prototypes and capability types.
    pub fn new(config: EngineConfig) -> Result<Self, PrototypeError> {
        Ok(Self {
            prototypes: PrototypeDatabase::with_defaults()?,
            capabilities: CapabilityRegistry::with_builtins(),
            constructors: EntityConstructors::with_defaults(),
            config,
        })
    }

    /// Engine with no prototypes and no capability types. Only the plain
    /// `entity` constructor is registered.
    pub fn empty(config: EngineConfig) -> Self {
        Self {
            prototypes: PrototypeDatabase::new(),
            capabilities: CapabilityRegistry::new(),
            constructors: EntityConstructors::with_defaults(),
            config,
        }
    }

    pub fn prototypes(&self) -> &PrototypeDatabase {
        &self.prototypes
    }

    pub fn prototypes_mut(&mut self) -> &mut PrototypeDatabase {
        &mut self.prototypes
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    pub fn capabilities_mut(&mut self) -> &mut CapabilityRegistry {
        &mut self.capabilities
    }

    pub fn constructors_mut(&mut self) -> &mut EntityConstructors {
        &mut self.constructors
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Entity factory bound to `simulation`.
    pub fn factory<'s>(&'s self, simulation: &'s mut dyn Simulation) -> EntityFactory<'s> {
        EntityFactory::new(
            &self.prototypes,
            &self.capabilities,
            &self.constructors,
            &self.config,
            simulation,
        )
    }

    /// Segment list using the configured default speed.
    pub fn segments<I, P>(&self, points: I) -> Option<Rc<Segment>>
    where
        I: IntoIterator<Item = P>,
        I::IntoIter: DoubleEndedIterator,
        P: Into<SegmentPoint>,
    {
        segments_with_speed(points, self.config.default_segment_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityOptions;
    use crate::simulation::World;

    #[test]
    fn test_new_has_builtins() {
        let engine = Engine::new(EngineConfig::default()).unwrap();

        assert!(engine.prototypes().contains("route"));
        assert_eq!(engine.capabilities().type_names(), vec!["compound-polygon", "label", "polygon"]);
    }

    #[test]
    fn test_factory_registers_into_simulation() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let mut world = World::new();

        engine
            .factory(&mut world)
            .create_entity(EntityOptions::new("t1").prototype("truck"), false)
            .unwrap();
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_segments_use_configured_speed() {
        let config = EngineConfig {
            default_segment_speed: 3.0,
            ..Default::default()
        };
        let engine = Engine::empty(config);

        let head = engine.segments(["a"]).unwrap();
        assert_eq!(head.speed, 3.0);
        assert!(engine.prototypes().is_empty());
    }
}
