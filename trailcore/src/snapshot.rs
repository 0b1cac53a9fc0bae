//! Captured object state.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::EnumIs;
use trailmeta::property::PropertyDescriptor;

use crate::ids::GlobalId;

/// The value of one property inside a [`Snapshot`].
///
/// Decimals are kept in their textual form so that snapshots stay `Eq` and `Hash`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIs)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Integer(i64),
    Decimal(String),
    Text(String),
    /// A reference to another tracked object.
    Reference(GlobalId),
    List(Vec<PropertyValue>),
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<GlobalId> for PropertyValue {
    fn from(value: GlobalId) -> Self {
        PropertyValue::Reference(value)
    }
}

/// A domain object whose state can be captured.
///
/// This is the per-type capability standing in for reflective field access:
/// the property names come from discovery, the values from the object itself.
pub trait Tracked {
    fn global_id(&self) -> GlobalId;

    /// Current value of the property called `property`, `None` if the object has no such property.
    fn property_value(&self, property: &str) -> Option<PropertyValue>;
}

/// State of an object at some point in time, keyed by property name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    properties: BTreeMap<String, PropertyValue>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the value of every discovered property of `object`.
    ///
    /// Properties the object cannot provide are recorded as [`PropertyValue::Null`].
    pub fn capture<T: Tracked + ?Sized>(object: &T, properties: &[PropertyDescriptor]) -> Self {
        Self {
            properties: properties
                .iter()
                .map(|p| {
                    let value = object.property_value(p.name()).unwrap_or(PropertyValue::Null);
                    (p.name().to_string(), value)
                })
                .collect(),
        }
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    pub fn get(&self, property: &str) -> Option<&PropertyValue> {
        self.properties.get(property)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
