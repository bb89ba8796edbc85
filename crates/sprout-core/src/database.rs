//! Prototype database and TOML prototype documents.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::capability::{CapabilityDecl, CapabilityTemplate};
use crate::prototype::{Prototype, PrototypeError, PrototypeRef, Specialization};
use crate::value::PropertyMap;


/// Built-in prototype catalogue.
pub const DEFAULT_PROTOTYPES: &str = include_str!("../prototypes/default.toml");

/// A prototype as declared in a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrototypeDecl {
    pub id: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub factory: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub properties: PropertyMap,
    /// Replaces the inherited default capabilities when present.
    #[serde(default)]
    pub capabilities: Option<Vec<CapabilityDecl>>,
}

/// A `[[prototype]]` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrototypeDocument {
    #[serde(default)]
    pub prototype: Vec<PrototypeDecl>,
}

/// Extra own properties for an already-registered prototype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentDecl {
    pub prototype: String,
    #[serde(default)]
    pub properties: PropertyMap,
}

/// A `[[fragment]]` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FragmentDocument {
    #[serde(default)]
    pub fragment: Vec<FragmentDecl>,
}

/// Registry of prototypes keyed by id.
#[derive(Debug, Default)]
pub struct PrototypeDatabase {
    prototypes: Vec<Rc<Prototype>>,
    index: HashMap<String, usize>,
}

impl PrototypeDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Database preloaded with the built-in catalogue.
    pub fn with_defaults() -> Result<Self, PrototypeError> {
        let mut db = Self::new();
        db.load_str(DEFAULT_PROTOTYPES)?;
        Ok(db)
    }

    /// Register a prototype. Ids are unique; a collision is an error.
    pub fn register(&mut self, prototype: Prototype) -> Result<Rc<Prototype>, PrototypeError> {
        if self.index.contains_key(prototype.id()) {
            return Err(PrototypeError::DuplicatePrototypeId(prototype.id().to_string()));
        }
        let prototype = Rc::new(prototype);
        debug!(id = prototype.id(), parent = ?prototype.parent().map(|p| p.id()), "registered prototype");
        self.index.insert(prototype.id().to_string(), self.prototypes.len());
        self.prototypes.push(Rc::clone(&prototype));
        Ok(prototype)
    }

    /// Resolve a prototype. Instances pass through unchanged.
    pub fn lookup(&self, prototype: impl Into<PrototypeRef>) -> Result<Rc<Prototype>, PrototypeError> {
        match prototype.into() {
            PrototypeRef::Instance(prototype) => Ok(prototype),
            PrototypeRef::Id(id) => self.get(&id).ok_or(PrototypeError::UnknownPrototype(id)),
        }
    }

    pub fn get(&self, id: &str) -> Option<Rc<Prototype>> {
        self.index.get(id).map(|&i| Rc::clone(&self.prototypes[i]))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Create and register a child of `parent`.
    pub fn specialize(
        &mut self,
        parent: impl Into<PrototypeRef>,
        overrides: Specialization,
    ) -> Result<Rc<Prototype>, PrototypeError> {
        let parent = self.lookup(parent)?;
        let prototype = overrides.into_builder(parent)?.build()?;
        self.register(prototype)
    }

    /// Prototypes in registration order.
    pub fn prototypes(&self) -> impl Iterator<Item = &Rc<Prototype>> {
        self.prototypes.iter()
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Load a prototype document. Nothing is registered if any entry fails.
    pub fn load_str(&mut self, source: &str) -> Result<Vec<Rc<Prototype>>, PrototypeError> {
        let document: PrototypeDocument = toml::from_str(source)?;
        self.load_decls(document.prototype)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<Rc<Prototype>>, PrototypeError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let loaded = self.load_str(&source)?;
        info!(path = %path.display(), count = loaded.len(), "loaded prototypes");
        Ok(loaded)
    }

    /// Register a batch of declarations.
    ///
    /// Parents may be registered already or declared anywhere in the batch.
    /// Declarations are registered in dependency order and the whole batch is
    /// validated before anything is registered.
    pub fn load_decls(&mut self, decls: Vec<PrototypeDecl>) -> Result<Vec<Rc<Prototype>>, PrototypeError> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (i, decl) in decls.iter().enumerate() {
            if self.contains(&decl.id) || positions.insert(decl.id.as_str(), i).is_some() {
                return Err(PrototypeError::DuplicatePrototypeId(decl.id.clone()));
            }
        }

        let order = self.dependency_order(&decls, &positions)?;

        let mut built: HashMap<String, Rc<Prototype>> = HashMap::new();
        let mut staged = Vec::with_capacity(decls.len());
        for i in order {
            let decl = &decls[i];
            let mut builder = Prototype::builder(decl.id.clone())
                .is_abstract(decl.is_abstract)
                .properties(decl.properties.clone());
            if let Some(parent) = &decl.parent {
                let parent = match built.get(parent) {
                    Some(parent) => Rc::clone(parent),
                    None => self.lookup(parent.as_str())?,
                };
                builder = builder.parent(parent);
            }
            if let Some(domain) = &decl.domain {
                builder = builder.domain(domain.clone());
            }
            if let Some(category) = &decl.category {
                builder = builder.category(category.clone());
            }
            if let Some(subcategory) = &decl.subcategory {
                builder = builder.subcategory(subcategory.clone());
            }
            if let Some(factory) = &decl.factory {
                builder = builder.factory(factory.clone());
            }
            if let Some(capabilities) = &decl.capabilities {
                builder = builder.capabilities(
                    capabilities
                        .iter()
                        .cloned()
                        .map(CapabilityTemplate::from)
                        .collect(),
                );
            }
            let prototype = Rc::new(builder.build()?);
            built.insert(decl.id.clone(), Rc::clone(&prototype));
            staged.push(prototype);
        }

        for prototype in &staged {
            self.index.insert(prototype.id().to_string(), self.prototypes.len());
            self.prototypes.push(Rc::clone(prototype));
        }
        debug!(count = staged.len(), "registered prototype batch");
        Ok(staged)
    }

    fn dependency_order(
        &self,
        decls: &[PrototypeDecl],
        positions: &HashMap<&str, usize>,
    ) -> Result<Vec<usize>, PrototypeError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Visiting,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; decls.len()];
        let mut order = Vec::with_capacity(decls.len());

        for start in 0..decls.len() {
            let mut path: Vec<usize> = Vec::new();
            let mut current = Some(start);
            // Walk up the parent chain until reaching something already placed.
            while let Some(i) = current {
                match marks[i] {
                    Mark::Done => break,
                    Mark::Visiting => {
                        let from = path.iter().position(|&p| p == i).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            path[from..].iter().map(|&p| decls[p].id.clone()).collect();
                        cycle.push(decls[i].id.clone());
                        return Err(PrototypeError::Cycle(cycle));
                    }
                    Mark::Unvisited => {}
                }
                marks[i] = Mark::Visiting;
                path.push(i);
                current = match &decls[i].parent {
                    None => None,
                    Some(parent) => match positions.get(parent.as_str()) {
                        Some(&p) => Some(p),
                        None if self.contains(parent) => None,
                        None => return Err(PrototypeError::UnknownPrototype(parent.clone())),
                    },
                };
            }
            for &i in path.iter().rev() {
                marks[i] = Mark::Done;
                order.push(i);
            }
        }
        Ok(order)
    }

    /// Merge fragment properties into existing prototypes.
    ///
    /// Every target is checked before any prototype is touched.
    pub fn load_fragments_str(&mut self, source: &str) -> Result<usize, PrototypeError> {
        let document: FragmentDocument = toml::from_str(source)?;
        let targets = document
            .fragment
            .iter()
            .map(|f| self.lookup(f.prototype.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        for (target, fragment) in targets.iter().zip(document.fragment) {
            debug!(prototype = target.id(), count = fragment.properties.len(), "applying fragment");
            target.extend_properties(fragment.properties);
        }
        Ok(targets.len())
    }

    pub fn load_fragments_file(&mut self, path: impl AsRef<Path>) -> Result<usize, PrototypeError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let applied = self.load_fragments_str(&source)?;
        info!(path = %path.display(), count = applied, "loaded prototype fragments");
        Ok(applied)
    }
}
