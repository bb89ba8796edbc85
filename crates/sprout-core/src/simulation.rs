//! The host simulation as seen by the factories.

use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::entity::EntityHandle;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("duplicate entity name: {0}")]
    DuplicateEntityName(String),
}

/// Entity registry owned by the host simulation.
pub trait Simulation {
    /// Register an entity. Names are unique within a simulation.
    fn add_entity(&mut self, entity: EntityHandle) -> Result<(), SimulationError>;

    fn get_entity(&self, name: &str) -> Option<EntityHandle>;
}

/// In-memory simulation keeping entities in insertion order.
#[derive(Debug, Default)]
pub struct World {
    entities: Vec<EntityHandle>,
    by_name: HashMap<String, usize>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &[EntityHandle] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// JSON array of entity snapshots in insertion order.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.entities
                .iter()
                .map(|entity| entity.borrow().snapshot())
                .collect(),
        )
    }
}

impl Simulation for World {
    fn add_entity(&mut self, entity: EntityHandle) -> Result<(), SimulationError> {
        let name = entity.borrow().name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(SimulationError::DuplicateEntityName(name));
        }
        debug!(entity = %name, "entity added to world");
        self.by_name.insert(name, self.entities.len());
        self.entities.push(entity);
        Ok(())
    }

    fn get_entity(&self, name: &str) -> Option<EntityHandle> {
        self.by_name
            .get(name)
            .map(|&index| Rc::clone(&self.entities[index]))
    }
}
