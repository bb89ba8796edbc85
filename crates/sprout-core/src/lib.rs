//! Prototype-driven entity creation, capability composition, and route/area
//! construction for simulations.

pub mod capability;
pub mod config;
pub mod database;
pub mod engine;
pub mod entity;
pub mod factory;
pub mod polygon;
pub mod prototype;
pub mod scenario;
pub mod segment;
pub mod simulation;
pub mod value;

pub use capability::{
    AttachContext, AttachedCapability, Capability, CapabilityConfig, CapabilityDecl,
    CapabilityError, CapabilityFactory, CapabilityRegistry, CapabilitySpec, CapabilityTemplate,
    Label, TypeResolver, assign_field,
};
pub use config::{ConfigError, EngineConfig};
pub use database::{PrototypeDatabase, PrototypeDecl};
pub use engine::Engine;
pub use entity::{Entity, EntityHandle, EntityOptions, EntityRef};
pub use factory::{
    EntityConstructors, EntityFactory, FactoryError, PrototypeFactory, factory_for_prototype,
};
pub use polygon::{CompoundPolygon, Point, Polygon, PolygonBuilder};
pub use prototype::{Prototype, PrototypeError, PrototypeRef, Specialization};
pub use scenario::{Scenario, ScenarioError, ScenarioReport};
pub use segment::{Segment, SegmentPoint, segments, segments_with_speed};
pub use simulation::{Simulation, SimulationError, World};
pub use value::{PropertyMap, PropertyValue, Vec3};
