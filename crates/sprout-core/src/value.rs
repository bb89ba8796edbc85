//! Property values shared by prototypes, entities, and capability configs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Property bag keyed by property name.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// 3D position vector. Missing components deserialize as 0.0.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

/// A single property value.
///
/// Documents and JSON map onto this as follows:
/// - numbers, strings, and booleans map directly
/// - `{ x, y, z }` tables with only numeric members become [`PropertyValue::Vector`]
/// - `{ entity = "name" }` becomes [`PropertyValue::Entity`]
/// - arrays become [`PropertyValue::List`]
/// - anything else is kept as [`PropertyValue::Opaque`]
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    String(String),
    Bool(bool),
    Vector(Vec3),
    /// Reference to another entity by name.
    Entity(String),
    List(Vec<PropertyValue>),
    Opaque(serde_json::Value),
}

impl PropertyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }

    /// Name of the referenced entity, if this is an entity reference.
    pub fn as_entity(&self) -> Option<&str> {
        match self {
            Self::Entity(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to the JSON shape described on the type.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{Value, json};
        match self {
            Self::Number(n) => json!(n),
            Self::String(s) => Value::String(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Vector(v) => json!({ "x": v.x, "y": v.y, "z": v.z }),
            Self::Entity(name) => json!({ "entity": name }),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Opaque(value) => value.clone(),
        }
    }
}

fn vector_from_object(map: &serde_json::Map<String, serde_json::Value>) -> Option<Vec3> {
    if map.is_empty() || !map.keys().all(|k| matches!(k.as_str(), "x" | "y" | "z")) {
        return None;
    }
    let component = |key: &str| match map.get(key) {
        Some(v) => v.as_f64(),
        None => Some(0.0),
    };
    Some(Vec3::new(component("x")?, component("y")?, component("z")?))
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Bool(b) => Self::Bool(b),
            Value::Number(ref n) => match n.as_f64() {
                Some(f) => Self::Number(f),
                None => Self::Opaque(value),
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(ref map) => {
                if let Some(v) = vector_from_object(map) {
                    return Self::Vector(v);
                }
                if map.len() == 1 {
                    if let Some(Value::String(name)) = map.get("entity") {
                        return Self::Entity(name.clone());
                    }
                }
                Self::Opaque(value)
            }
            Value::Null => Self::Opaque(Value::Null),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for PropertyValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec3> for PropertyValue {
    fn from(v: Vec3) -> Self {
        Self::Vector(v)
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

/// Convert a property map into a JSON object.
pub fn properties_to_json(properties: &PropertyMap) -> serde_json::Value {
    serde_json::Value::Object(
        properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}
