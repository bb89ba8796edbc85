//! Prototypes: named entity templates with single-parent inheritance.
//!
//! Inherited values are never copied into a child. Properties, tags, the
//! factory tag, and default capabilities are resolved on demand by walking the
//! parent chain, so a child always sees its parent's current values and a
//! parent is never affected by its children.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::capability::CapabilityTemplate;
use crate::value::{PropertyMap, PropertyValue};

#[derive(Debug, Error)]
pub enum PrototypeError {
    #[error("unknown prototype: {0}")]
    UnknownPrototype(String),

    #[error("duplicate prototype id: {0}")]
    DuplicatePrototypeId(String),

    #[error("invalid prototype options: {0}")]
    InvalidOptions(String),

    #[error("prototype parent cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("invalid prototype document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An entity template.
pub struct Prototype {
    id: String,
    parent: Option<Rc<Prototype>>,
    domain: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
    factory: Option<String>,
    is_abstract: bool,
    properties: RefCell<PropertyMap>,
    capabilities: Option<Vec<CapabilityTemplate>>,
}

impl Prototype {
    pub fn builder(id: impl Into<String>) -> PrototypeBuilder {
        PrototypeBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<&Rc<Prototype>> {
        self.parent.as_ref()
    }

    /// This prototype followed by its ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Prototype> {
        std::iter::successors(Some(self), |p| p.parent.as_deref())
    }

    /// Whether `id` names this prototype or one of its ancestors.
    pub fn is_a(&self, id: &str) -> bool {
        self.ancestors().any(|p| p.id == id)
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn domain(&self) -> Option<&str> {
        self.ancestors().find_map(|p| p.domain.as_deref())
    }

    pub fn category(&self) -> Option<&str> {
        self.ancestors().find_map(|p| p.category.as_deref())
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.ancestors().find_map(|p| p.subcategory.as_deref())
    }

    /// Whether any prototype in the chain declares `subcategory`, not only
    /// the nearest one.
    pub fn has_subcategory(&self, subcategory: &str) -> bool {
        self.ancestors()
            .any(|p| p.subcategory.as_deref() == Some(subcategory))
    }

    /// Entity construction tag, inherited if unset.
    pub fn factory(&self) -> Option<&str> {
        self.ancestors().find_map(|p| p.factory.as_deref())
    }

    /// Resolve a single property, nearest definition first.
    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        self.ancestors()
            .find_map(|p| p.properties.borrow().get(name).cloned())
    }

    /// Properties defined on this prototype only.
    pub fn own_properties(&self) -> PropertyMap {
        self.properties.borrow().clone()
    }

    /// Flattened view of the whole chain; the nearest definition wins.
    pub fn resolved_properties(&self) -> PropertyMap {
        let chain: Vec<&Prototype> = self.ancestors().collect();
        let mut resolved = PropertyMap::new();
        for proto in chain.into_iter().rev() {
            for (key, value) in proto.properties.borrow().iter() {
                resolved.insert(key.clone(), value.clone());
            }
        }
        resolved
    }

    /// Default capabilities: the nearest prototype that declares a list wins
    /// outright, lists are never merged.
    pub fn capabilities(&self) -> &[CapabilityTemplate] {
        self.ancestors()
            .find_map(|p| p.capabilities.as_deref())
            .unwrap_or(&[])
    }

    pub(crate) fn extend_properties(&self, properties: PropertyMap) {
        self.properties.borrow_mut().extend(properties);
    }
}

impl fmt::Debug for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prototype")
            .field("id", &self.id)
            .field("parent", &self.parent.as_ref().map(|p| p.id()))
            .field("factory", &self.factory)
            .field("is_abstract", &self.is_abstract)
            .field("properties", &self.properties.borrow())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Builder for [`Prototype`].
#[derive(Debug)]
pub struct PrototypeBuilder {
    id: String,
    parent: Option<Rc<Prototype>>,
    domain: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
    factory: Option<String>,
    is_abstract: bool,
    properties: PropertyMap,
    capabilities: Option<Vec<CapabilityTemplate>>,
}

impl PrototypeBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            domain: None,
            category: None,
            subcategory: None,
            factory: None,
            is_abstract: false,
            properties: PropertyMap::new(),
            capabilities: None,
        }
    }

    pub fn parent(mut self, parent: Rc<Prototype>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn factory(mut self, factory: impl Into<String>) -> Self {
        self.factory = Some(factory.into());
        self
    }

    pub fn is_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn properties(mut self, properties: PropertyMap) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn capabilities(mut self, capabilities: Vec<CapabilityTemplate>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    pub fn build(self) -> Result<Prototype, PrototypeError> {
        if self.id.is_empty() {
            return Err(PrototypeError::InvalidOptions(
                "prototype id must not be empty".to_string(),
            ));
        }
        Ok(Prototype {
            id: self.id,
            parent: self.parent,
            domain: self.domain,
            category: self.category,
            subcategory: self.subcategory,
            factory: self.factory,
            is_abstract: self.is_abstract,
            properties: RefCell::new(self.properties),
            capabilities: self.capabilities,
        })
    }
}

/// Overrides applied when specializing a prototype.
///
/// Tags and the factory tag left unset are inherited from the parent.
/// `capabilities`, when set, replaces the inherited list entirely.
#[derive(Debug, Clone, Default)]
pub struct Specialization {
    pub id: Option<String>,
    pub domain: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub factory: Option<String>,
    pub is_abstract: bool,
    pub properties: PropertyMap,
    pub capabilities: Option<Vec<CapabilityTemplate>>,
}

impl Specialization {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn factory(mut self, factory: impl Into<String>) -> Self {
        self.factory = Some(factory.into());
        self
    }

    pub fn abstract_prototype(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn capabilities(mut self, capabilities: Vec<CapabilityTemplate>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    pub(crate) fn into_builder(self, parent: Rc<Prototype>) -> Result<PrototypeBuilder, PrototypeError> {
        let id = self.id.ok_or_else(|| {
            PrototypeError::InvalidOptions(format!(
                "specialization of '{}' requires an id",
                parent.id()
            ))
        })?;
        Ok(PrototypeBuilder {
            id,
            parent: Some(parent),
            domain: self.domain,
            category: self.category,
            subcategory: self.subcategory,
            factory: self.factory,
            is_abstract: self.is_abstract,
            properties: self.properties,
            capabilities: self.capabilities,
        })
    }
}

/// A prototype given either by id or as an already-resolved instance.
#[derive(Debug, Clone)]
pub enum PrototypeRef {
    Id(String),
    Instance(Rc<Prototype>),
}

impl From<&str> for PrototypeRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for PrototypeRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Rc<Prototype>> for PrototypeRef {
    fn from(prototype: Rc<Prototype>) -> Self {
        Self::Instance(prototype)
    }
}

impl From<&Rc<Prototype>> for PrototypeRef {
    fn from(prototype: &Rc<Prototype>) -> Self {
        Self::Instance(Rc::clone(prototype))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (Rc<Prototype>, Rc<Prototype>) {
        let parent = Rc::new(
            Prototype::builder("vehicle")
                .domain("ground")
                .factory("entity")
                .property("p", 1)
                .property("wheels", 4)
                .capabilities(vec![CapabilityTemplate::named("label")])
                .build()
                .unwrap(),
        );
        let child = Rc::new(
            Prototype::builder("truck")
                .parent(Rc::clone(&parent))
                .category("transport")
                .property("p", 2)
                .build()
                .unwrap(),
        );
        (parent, child)
    }

    #[test]
    fn test_child_shadows_parent() {
        let (parent, child) = chain();

        assert_eq!(child.property("p"), Some(PropertyValue::Number(2.0)));
        assert_eq!(parent.property("p"), Some(PropertyValue::Number(1.0)));
        assert_eq!(child.property("wheels"), Some(PropertyValue::Number(4.0)));
        assert_eq!(child.property("missing"), None);
    }

    #[test]
    fn test_resolved_properties_flatten_chain() {
        let (_, child) = chain();
        let resolved = child.resolved_properties();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved["p"], PropertyValue::Number(2.0));
        assert!(child.own_properties().get("wheels").is_none());
    }

    #[test]
    fn test_tags_resolve_through_chain() {
        let (_, child) = chain();

        assert_eq!(child.domain(), Some("ground"));
        assert_eq!(child.category(), Some("transport"));
        assert_eq!(child.subcategory(), None);
        assert_eq!(child.factory(), Some("entity"));
        assert!(child.is_a("vehicle"));
        assert!(!child.is_a("aircraft"));
    }

    #[test]
    fn test_has_subcategory_checks_whole_chain() {
        let base = Rc::new(
            Prototype::builder("vehicle")
                .subcategory("wheeled")
                .build()
                .unwrap(),
        );
        let tanker = Prototype::builder("tanker")
            .parent(Rc::clone(&base))
            .subcategory("fuel")
            .build()
            .unwrap();

        assert_eq!(tanker.subcategory(), Some("fuel"));
        assert!(tanker.has_subcategory("fuel"));
        assert!(tanker.has_subcategory("wheeled"));
        assert!(!tanker.has_subcategory("tracked"));
        assert!(!base.has_subcategory("fuel"));
    }

    #[test]
    fn test_capabilities_inherited_until_replaced() {
        let (parent, child) = chain();
        assert_eq!(child.capabilities().len(), 1);

        let bare = Prototype::builder("bare")
            .parent(parent)
            .capabilities(Vec::new())
            .build()
            .unwrap();
        assert!(bare.capabilities().is_empty());
    }

    #[test]
    fn test_parent_sees_later_changes() {
        let (parent, child) = chain();
        parent.extend_properties(PropertyMap::from([(
            "colour".to_string(),
            PropertyValue::from("red"),
        )]));

        assert_eq!(child.property("colour"), Some(PropertyValue::from("red")));
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = Prototype::builder("").build().unwrap_err();
        assert!(matches!(err, PrototypeError::InvalidOptions(_)));
    }
}
